//! Player ship: input-driven motion and the damage state machine

use glam::Vec2;
use rand::Rng;

use super::input::{Action, ControlScheme, InputState};
use super::particle::{EXPLOSION_COLOR, ParticleSystem, TRAIL_COLOR};
use crate::consts::*;
use crate::hex_color;

pub const SHIELD_COLOR: [f32; 4] = hex_color(0xffeaa7);

/// Which player a ship belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    /// Display name
    pub fn label(self) -> &'static str {
        match self {
            PlayerSlot::One => "Player 1",
            PlayerSlot::Two => "Player 2",
        }
    }
}

/// A player-controlled ship
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub friction: f32,
    /// Heading in radians, follows velocity while moving
    pub rotation: f32,
    pub health: u32,
    pub max_health: u32,
    pub invulnerable: bool,
    pub invulnerability_time: f32,
    pub shield: bool,
    pub shield_time: f32,
    trail_timer: f32,
    pub scheme: ControlScheme,
    pub slot: PlayerSlot,
}

impl Player {
    pub fn new(pos: Vec2, scheme: ControlScheme, slot: PlayerSlot) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: PLAYER_SIZE,
            max_speed: PLAYER_BASE_MAX_SPEED,
            acceleration: PLAYER_ACCELERATION,
            friction: PLAYER_FRICTION,
            rotation: 0.0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            invulnerable: false,
            invulnerability_time: 0.0,
            shield: false,
            shield_time: 0.0,
            trail_timer: 0.0,
            scheme,
            slot,
        }
    }

    /// Advance one frame within a `width` x `height` play area
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        width: f32,
        height: f32,
        input: &InputState,
        rng: &mut R,
        particles: &mut ParticleSystem,
    ) {
        self.handle_input(input);

        self.vel *= self.friction;
        self.pos += self.vel;

        // Hard stop at the walls
        self.pos.x = self.pos.x.clamp(self.size, (width - self.size).max(self.size));
        self.pos.y = self.pos.y.clamp(self.size, (height - self.size).max(self.size));

        if self.invulnerable {
            self.invulnerability_time -= dt;
            if self.invulnerability_time <= 0.0 {
                self.invulnerable = false;
            }
        }

        if self.shield {
            self.shield_time -= dt;
            if self.shield_time <= 0.0 {
                self.shield = false;
            }
        }

        self.trail_timer += dt;
        if self.trail_timer > TRAIL_INTERVAL_SECS {
            let heading = Vec2::from_angle(self.rotation);
            let color = if self.shield { SHIELD_COLOR } else { TRAIL_COLOR };
            particles.trail(rng, self.pos - heading * self.size, color);
            self.trail_timer = 0.0;
        }

        if self.vel.length() > 0.1 {
            self.rotation = self.vel.y.atan2(self.vel.x);
        }
    }

    /// Accelerate per held direction, then rescale to the speed cap.
    /// Diagonals get both additions before the cap applies.
    fn handle_input(&mut self, input: &InputState) {
        let scheme = self.scheme;
        let held = |action| input.is_held(scheme, action);

        if held(Action::Up) {
            self.vel.y -= self.acceleration;
        }
        if held(Action::Down) {
            self.vel.y += self.acceleration;
        }
        if held(Action::Left) {
            self.vel.x -= self.acceleration;
        }
        if held(Action::Right) {
            self.vel.x += self.acceleration;
        }

        if self.vel.length() > self.max_speed {
            self.vel = self.vel.normalize_or_zero() * self.max_speed;
        }
    }

    /// Shield or invulnerability active
    pub fn is_protected(&self) -> bool {
        self.invulnerable || self.shield
    }

    pub fn hit_radius(&self) -> f32 {
        self.size
    }

    /// Take one hit. Returns true when the ship is destroyed.
    pub fn take_damage<R: Rng>(&mut self, rng: &mut R, particles: &mut ParticleSystem) -> bool {
        if self.is_protected() {
            return false;
        }

        debug_assert!(self.health > 0, "damaging a destroyed player");
        if self.health == 0 {
            log::warn!("{} damaged with no health left", self.slot.label());
        }
        self.health = self.health.saturating_sub(1);
        self.mark_hit(rng, particles);

        self.health == 0
    }

    /// Start the post-hit invulnerability window and emit the hit burst
    /// without touching health (co-op hits drain the shared pool instead)
    pub fn mark_hit<R: Rng>(&mut self, rng: &mut R, particles: &mut ParticleSystem) {
        self.invulnerable = true;
        self.invulnerability_time = INVULNERABILITY_SECS;
        particles.explosion(rng, self.pos, 15, EXPLOSION_COLOR);
    }

    pub fn heal(&mut self) {
        self.health = (self.health + 1).min(self.max_health);
    }

    pub fn activate_shield(&mut self) {
        self.shield = true;
        self.shield_time = SHIELD_SECS;
    }

    /// Raise the speed cap by one, up to the boosted ceiling
    pub fn grant_speed_boost(&mut self) {
        self.max_speed = (self.max_speed + 1.0).min(PLAYER_BOOSTED_MAX_SPEED);
    }

    /// Lower the speed cap by one, down to the base speed
    pub fn revert_speed_boost(&mut self) {
        self.max_speed = (self.max_speed - 1.0).max(PLAYER_BASE_MAX_SPEED);
    }
}

/// Starting positions for one or two ships in a `width` x `height` area
pub fn spawn_positions(count: usize, width: f32, height: f32) -> Vec<Vec2> {
    let y = height - PLAYER_SPAWN_OFFSET_Y;
    match count {
        1 => vec![Vec2::new(width / 2.0, y)],
        _ => vec![Vec2::new(width / 3.0, y), Vec2::new(width * 2.0 / 3.0, y)],
    }
}
