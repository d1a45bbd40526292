//! Timed pick-ups that drift down the play area

use glam::Vec2;
use rand::Rng;

use super::deferred::Scheduler;
use super::particle::ParticleSystem;
use super::player::Player;
use super::state::{Deferred, GameEvent, GameMode};
use crate::consts::*;
use crate::{circles_overlap, hex_color, random_between, random_int};

/// Symbol drawn on a pick-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Plus,
    Diamond,
    Triangle,
    Star,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Health,
    Shield,
    Speed,
    Score,
}

/// Fixed presentation of a power-up type
#[derive(Debug, Clone, Copy)]
pub struct PowerUpStyle {
    pub color: [f32; 4],
    pub symbol: Symbol,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Health,
        PowerUpKind::Shield,
        PowerUpKind::Speed,
        PowerUpKind::Score,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[random_int(rng, 0, Self::ALL.len() as u32 - 1) as usize]
    }

    pub fn style(self) -> PowerUpStyle {
        match self {
            PowerUpKind::Health => PowerUpStyle {
                color: hex_color(0xff6b6b),
                symbol: Symbol::Plus,
            },
            PowerUpKind::Shield => PowerUpStyle {
                color: hex_color(0xffeaa7),
                symbol: Symbol::Diamond,
            },
            PowerUpKind::Speed => PowerUpStyle {
                color: hex_color(0x4ecdc4),
                symbol: Symbol::Triangle,
            },
            PowerUpKind::Score => PowerUpStyle {
                color: hex_color(0x96ceb4),
                symbol: Symbol::Star,
            },
        }
    }
}

/// Session state a power-up effect may touch
pub struct SessionEffects<'a> {
    pub mode: GameMode,
    pub score: &'a mut u64,
    pub shared_lives: &'a mut u32,
    pub particles: &'a mut ParticleSystem,
    pub deferred: &'a mut Scheduler<Deferred>,
    pub events: &'a mut Vec<GameEvent>,
}

/// A pick-up entity
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: PowerUpKind,
    pub style: PowerUpStyle,
    pub size: f32,
    pub rotation: f32,
    pub pulse: f32,
    /// Seconds until it disappears
    pub lifetime: f32,
    pub collected: bool,
}

impl PowerUp {
    pub fn new<R: Rng>(rng: &mut R, pos: Vec2, kind: PowerUpKind) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, random_between(rng, 1.0, 2.0)),
            kind,
            style: kind.style(),
            size: POWERUP_SIZE,
            rotation: 0.0,
            pulse: 0.0,
            lifetime: POWERUP_LIFETIME,
            collected: false,
        }
    }

    /// Advance one frame. Returns false when it should be removed.
    pub fn update(&mut self, dt: f32, _width: f32, height: f32) -> bool {
        self.pos += self.vel;
        self.rotation += POWERUP_ROTATION_SPEED;
        self.pulse += dt * 3.0;
        self.lifetime -= dt;

        !(self.pos.y > height + self.size || self.lifetime <= 0.0)
    }

    /// Circle overlap against a body (never matches once collected)
    pub fn hits(&self, pos: Vec2, radius: f32) -> bool {
        !self.collected && circles_overlap(self.pos, self.size, pos, radius)
    }

    /// Apply this pick-up's effect to `player` and the session
    pub fn apply_effect(&mut self, player: &mut Player, session: SessionEffects<'_>) {
        debug_assert!(!self.collected, "power-up applied twice");
        self.collected = true;

        match self.kind {
            PowerUpKind::Health => {
                if session.mode == GameMode::Coop {
                    *session.shared_lives = (*session.shared_lives + 1).min(SHARED_LIVES);
                } else {
                    player.heal();
                }
            }
            PowerUpKind::Shield => {
                player.activate_shield();
                session.events.push(GameEvent::ShieldActivated);
            }
            PowerUpKind::Speed => {
                player.grant_speed_boost();
                session.deferred.schedule_in(
                    SPEED_BOOST_SECS,
                    Deferred::RevertSpeedBoost { slot: player.slot },
                );
            }
            PowerUpKind::Score => {
                *session.score += SCORE_BONUS;
            }
        }

        session.particles.collection(self.pos, self.style.color);
    }
}
