//! Space Explorer - an asteroid-dodging arcade game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, spawning, collisions, game rules)
//! - `audio`: Procedural sound effects and level-scaled music
//! - `renderer`: Abstract canvas, entity drawing and the WebGPU backend
//! - `session`: Session controller tying simulation, audio, scores and UI together
//! - `highscores`: Per-mode best scores
//! - `settings`: Player preferences

pub mod audio;
pub mod highscores;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{HighScores, MemoryStore, ScoreStore};
pub use session::{Hud, Session, Ui};
pub use settings::{QualityPreset, Settings};

use rand::Rng;

/// Game configuration constants
///
/// Velocities are in pixels per frame and rotations in radians per frame;
/// timers are in seconds.
pub mod consts {
    /// Upper bound on a frame's delta time (~60 fps)
    pub const MAX_FRAME_DT: f32 = 0.016;

    /// Player ship
    pub const PLAYER_SIZE: f32 = 12.0;
    pub const PLAYER_ACCELERATION: f32 = 0.3;
    pub const PLAYER_FRICTION: f32 = 0.95;
    pub const PLAYER_BASE_MAX_SPEED: f32 = 5.0;
    /// Speed boost ceiling and revert floor
    pub const PLAYER_BOOSTED_MAX_SPEED: f32 = 8.0;
    pub const PLAYER_MAX_HEALTH: u32 = 3;
    pub const PLAYER_SPAWN_OFFSET_Y: f32 = 100.0;
    pub const INVULNERABILITY_SECS: f32 = 1.5;
    pub const SHIELD_SECS: f32 = 5.0;
    pub const TRAIL_INTERVAL_SECS: f32 = 0.05;
    /// Wall-clock delay before a speed boost wears off
    pub const SPEED_BOOST_SECS: f64 = 5.0;

    /// Spawning
    pub const INITIAL_ASTEROIDS: usize = 3;
    pub const ASTEROID_SPAWN_Y: f32 = -50.0;
    pub const INITIAL_SPAWN_INTERVAL: f32 = 2.0;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;
    pub const SPAWN_INTERVAL_STEP: f32 = 0.1;
    pub const POWERUP_SPAWN_INTERVAL: f32 = 8.0;
    pub const POWERUP_SPAWN_Y: f32 = -20.0;
    pub const POWERUP_SPAWN_MARGIN: f32 = 50.0;
    pub const STAR_INTERVAL: f32 = 0.1;
    pub const STAR_SPAWN_Y: f32 = -5.0;
    pub const DIFFICULTY_INTERVAL: f32 = 30.0;

    /// Power-ups
    pub const POWERUP_SIZE: f32 = 8.0;
    pub const POWERUP_LIFETIME: f32 = 10.0;
    pub const POWERUP_ROTATION_SPEED: f32 = 0.1;
    pub const SCORE_BONUS: u64 = 250;
    pub const SHIELD_CHIME_DELAY: f64 = 0.1;

    /// Scoring
    pub const BASE_POINTS_PER_SEC: f32 = 25.0;
    pub const POINTS_PER_LEVEL: f32 = 10.0;

    /// Co-op shared lives (starting value and pick-up ceiling)
    pub const SHARED_LIVES: u32 = 5;

    /// Delay before the winner fanfare
    pub const WINNER_FANFARE_DELAY: f64 = 0.5;
}

/// Uniform random float in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_between<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Uniform random integer in `[min, max]`
#[inline]
pub fn random_int<R: Rng>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Linear interpolation between `start` and `end`
#[inline]
pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}

/// Strict circle/circle overlap test
#[inline]
pub fn circles_overlap(a: glam::Vec2, ra: f32, b: glam::Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Convert a `0xRRGGBB` literal to an RGBA color
pub const fn hex_color(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_between_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_between(&mut rng, -2.0, 3.0);
            assert!((-2.0..3.0).contains(&v));
        }
        assert_eq!(random_between(&mut rng, 4.0, 4.0), 4.0);
    }

    #[test]
    fn test_random_int_is_inclusive() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut seen = [false; 3];
        for _ in 0..500 {
            let v = random_int(&mut rng, 2, 4);
            assert!((2..=4).contains(&v));
            seen[(v - 2) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    }

    #[test]
    fn test_circles_overlap_is_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circles_overlap(a, 5.0, Vec2::new(9.0, 0.0), 5.0));
        // Touching exactly is not an overlap
        assert!(!circles_overlap(a, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex_color(0x000000), [0.0, 0.0, 0.0, 1.0]);
    }
}
