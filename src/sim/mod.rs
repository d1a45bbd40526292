//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - Explicit input snapshot passed into each frame
//! - Wall-clock work goes through an owned [`deferred::Scheduler`]
//! - No rendering, audio or platform dependencies

pub mod asteroid;
pub mod deferred;
pub mod input;
pub mod particle;
pub mod player;
pub mod powerup;
pub mod state;
pub mod tick;

pub use asteroid::{Asteroid, AsteroidSize};
pub use deferred::{Scheduler, TaskId};
pub use input::{Action, ControlScheme, InputState, key_binding};
pub use particle::{Particle, ParticleSystem};
pub use player::{Player, PlayerSlot};
pub use powerup::{PowerUp, PowerUpKind, Symbol};
pub use state::{Deferred, GameEvent, GameMode, GamePhase, GameState, Outcome};
pub use tick::tick;
