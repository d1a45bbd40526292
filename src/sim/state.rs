//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives in [`GameState`]. The simulation
//! never talks to audio, storage or UI directly; it records [`GameEvent`]s
//! that the session controller drains after each frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::asteroid::{Asteroid, AsteroidSize};
use super::deferred::Scheduler;
use super::input::ControlScheme;
use super::particle::{CELEBRATION_COLOR, EXPLOSION_COLOR, ParticleSystem};
use super::player::{Player, PlayerSlot, spawn_positions};
use super::powerup::{PowerUp, PowerUpKind};
use crate::consts::*;
use crate::random_between;

/// Screen-level state of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    Menu,
    PlayerCount,
    ModeSelection,
    /// The only phase in which the simulation advances
    Playing,
    GameOver,
    Winner,
}

/// Rule set for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    Single,
    Vs,
    Coop,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Single, GameMode::Vs, GameMode::Coop];

    /// Namespace used for per-mode storage keys
    pub fn key(self) -> &'static str {
        match self {
            GameMode::Single => "single",
            GameMode::Vs => "vs",
            GameMode::Coop => "coop",
        }
    }

    pub fn player_count(self) -> usize {
        match self {
            GameMode::Single => 1,
            GameMode::Vs | GameMode::Coop => 2,
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Single player destroyed or team lives exhausted
    Loss,
    /// Versus mode: the surviving player
    Winner(PlayerSlot),
}

/// Wall-clock tasks owned by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    RevertSpeedBoost { slot: PlayerSlot },
}

/// Things that happened during a frame, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    LevelUp { level: u32 },
    /// A hit that did not end the session
    PlayerHit { slot: PlayerSlot },
    /// A hit that ended the session
    FatalHit { slot: PlayerSlot },
    /// An asteroid was removed by a collision
    AsteroidHit,
    PowerUpCollected { kind: PowerUpKind },
    ShieldActivated,
    SessionEnded { outcome: Outcome, score: u64 },
}

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Play area in pixels
    pub width: f32,
    pub height: f32,
    pub phase: GamePhase,
    pub mode: GameMode,
    /// Chosen on the player-count screen
    pub player_count: usize,
    pub score: u64,
    pub level: u32,
    /// Co-op team pool
    pub shared_lives: u32,
    /// One ship in single mode, two otherwise (slot order)
    pub players: Vec<Player>,
    pub asteroids: Vec<Asteroid>,
    pub powerups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub asteroid_timer: f32,
    pub powerup_timer: f32,
    pub background_timer: f32,
    pub difficulty_timer: f32,
    /// Current seconds between asteroid spawns
    pub spawn_interval: f32,
    pub deferred: Scheduler<Deferred>,
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state on the menu screen
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            width,
            height,
            phase: GamePhase::Menu,
            mode: GameMode::Single,
            player_count: 1,
            score: 0,
            level: 1,
            shared_lives: SHARED_LIVES,
            players: Vec::new(),
            asteroids: Vec::new(),
            powerups: Vec::new(),
            particles: ParticleSystem::new(),
            asteroid_timer: 0.0,
            powerup_timer: 0.0,
            background_timer: 0.0,
            difficulty_timer: 0.0,
            spawn_interval: INITIAL_SPAWN_INTERVAL,
            deferred: Scheduler::new(),
            events: Vec::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn show_menu(&mut self) {
        self.phase = GamePhase::Menu;
    }

    pub fn show_player_count(&mut self) {
        self.phase = GamePhase::PlayerCount;
    }

    pub fn show_mode_selection(&mut self, player_count: usize) {
        debug_assert!((1..=2).contains(&player_count), "bad player count {player_count}");
        self.player_count = player_count.clamp(1, 2);
        self.phase = GamePhase::ModeSelection;
    }

    /// Begin a session. `scheme` binds the single player; two-player modes
    /// always use WASD for player 1 and arrows for player 2.
    pub fn start(&mut self, mode: GameMode, scheme: ControlScheme) {
        self.deferred.cancel_all();
        self.events.clear();

        self.phase = GamePhase::Playing;
        self.mode = mode;
        self.player_count = mode.player_count();
        self.score = 0;
        self.level = 1;
        self.shared_lives = SHARED_LIVES;

        let positions = spawn_positions(mode.player_count(), self.width, self.height);
        self.players = match mode {
            GameMode::Single => vec![Player::new(positions[0], scheme, PlayerSlot::One)],
            GameMode::Vs | GameMode::Coop => vec![
                Player::new(positions[0], ControlScheme::Wasd, PlayerSlot::One),
                Player::new(positions[1], ControlScheme::Arrows, PlayerSlot::Two),
            ],
        };

        self.asteroids.clear();
        self.powerups.clear();
        self.particles.clear();
        self.asteroid_timer = 0.0;
        self.powerup_timer = 0.0;
        self.background_timer = 0.0;
        self.difficulty_timer = 0.0;
        self.spawn_interval = INITIAL_SPAWN_INTERVAL;

        for _ in 0..INITIAL_ASTEROIDS {
            self.spawn_asteroid();
        }

        log::info!("Session started: mode={:?} seed={}", mode, self.seed);
    }

    pub fn spawn_asteroid(&mut self) {
        let x = random_between(&mut self.rng, 0.0, self.width);
        let asteroid = Asteroid::new(&mut self.rng, Vec2::new(x, ASTEROID_SPAWN_Y), AsteroidSize::Large);
        log::debug!("Spawned asteroid at x={x:.0}");
        self.asteroids.push(asteroid);
    }

    pub fn spawn_powerup(&mut self) {
        let x = random_between(
            &mut self.rng,
            POWERUP_SPAWN_MARGIN,
            self.width - POWERUP_SPAWN_MARGIN,
        );
        let kind = PowerUpKind::random(&mut self.rng);
        let powerup = PowerUp::new(&mut self.rng, Vec2::new(x, POWERUP_SPAWN_Y), kind);
        log::debug!("Spawned {kind:?} power-up at x={x:.0}");
        self.powerups.push(powerup);
    }

    pub fn spawn_star(&mut self) {
        let x = random_between(&mut self.rng, 0.0, self.width);
        self.particles.star(&mut self.rng, Vec2::new(x, STAR_SPAWN_Y));
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&Player> {
        self.players.iter().find(|p| p.slot == slot)
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.slot == slot)
    }

    /// End the session: freeze the simulation, cancel game tasks and emit
    /// the closing effects
    pub fn finish(&mut self, outcome: Outcome) {
        self.deferred.cancel_all();

        match outcome {
            Outcome::Loss => {
                self.phase = GamePhase::GameOver;
                for player in self.players.iter().filter(|p| p.health == 0) {
                    self.particles.explosion(&mut self.rng, player.pos, 30, EXPLOSION_COLOR);
                }
            }
            Outcome::Winner(slot) => {
                self.phase = GamePhase::Winner;
                if let Some(pos) = self.player(slot).map(|p| p.pos) {
                    self.particles.explosion(&mut self.rng, pos, 50, CELEBRATION_COLOR);
                }
            }
        }

        log::info!(
            "Session ended: mode={:?} outcome={:?} score={} level={}",
            self.mode,
            outcome,
            self.score,
            self.level
        );
        self.events.push(GameEvent::SessionEnded {
            outcome,
            score: self.score,
        });
    }

    /// Feed wall-clock time (seconds) to the game's deferred tasks
    pub fn pump(&mut self, now: f64) {
        for task in self.deferred.advance_to(now) {
            match task {
                Deferred::RevertSpeedBoost { slot } => {
                    if let Some(player) = self.player_mut(slot) {
                        player.revert_speed_boost();
                    }
                }
            }
        }
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resize the play area; entities are clamped on their next update
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}
