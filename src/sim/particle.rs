//! Visual-effect particles
//!
//! Particles never affect gameplay. They drift by velocity each frame, decay
//! by friction, and fade out as their life runs down.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::{hex_color, random_between};

/// Default cap on live particles
pub const MAX_PARTICLES: usize = 500;

pub const EXPLOSION_COLOR: [f32; 4] = hex_color(0xff6b6b);
pub const TRAIL_COLOR: [f32; 4] = hex_color(0x4ecdc4);
pub const STAR_COLOR: [f32; 4] = hex_color(0xffffff);
pub const CELEBRATION_COLOR: [f32; 4] = hex_color(0xffd700);

/// A single particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: [f32; 4],
    pub size: f32,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
    /// Velocity multiplier applied every frame
    pub friction: f32,
    /// Added to vertical velocity every frame
    pub gravity: f32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: [f32; 4], size: f32, life: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            size,
            life,
            max_life: life,
            friction: 0.98,
            gravity: 0.0,
        }
    }

    /// Opacity derived from remaining life
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }

    /// Advance one frame. Returns false once expired.
    pub fn update(&mut self, dt: f32) -> bool {
        self.pos += self.vel;
        self.vel *= self.friction;
        self.vel.y += self.gravity;
        self.life -= dt;
        self.life > 0.0
    }
}

/// Owner of all live particles
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    cap: usize,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::with_cap(MAX_PARTICLES)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            particles: VecDeque::new(),
            cap,
        }
    }

    /// Change the cap, dropping the oldest particles if over it
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        while self.particles.len() > cap {
            self.particles.pop_front();
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    fn push(&mut self, particle: Particle) {
        if self.cap == 0 {
            return;
        }
        if self.particles.len() >= self.cap {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }

    /// Burst of `count` fast particles
    pub fn explosion<R: Rng>(&mut self, rng: &mut R, pos: Vec2, count: usize, color: [f32; 4]) {
        for _ in 0..count {
            let vel = Vec2::new(random_between(rng, -5.0, 5.0), random_between(rng, -5.0, 5.0));
            let mut p = Particle::new(
                pos,
                vel,
                color,
                random_between(rng, 2.0, 5.0),
                random_between(rng, 0.5, 1.5),
            );
            p.friction = 0.95;
            self.push(p);
        }
    }

    /// Single short-lived engine trail puff
    pub fn trail<R: Rng>(&mut self, rng: &mut R, pos: Vec2, color: [f32; 4]) {
        let vel = Vec2::new(random_between(rng, -1.0, 1.0), random_between(rng, -1.0, 1.0));
        self.push(Particle::new(
            pos,
            vel,
            color,
            random_between(rng, 1.0, 3.0),
            random_between(rng, 0.3, 0.8),
        ));
    }

    /// Ring of eight particles for a pick-up
    pub fn collection(&mut self, pos: Vec2, color: [f32; 4]) {
        for i in 0..8 {
            let angle = (i as f32 / 8.0) * TAU;
            let mut p = Particle::new(pos, Vec2::new(angle.cos(), angle.sin()) * 3.0, color, 3.0, 1.0);
            p.friction = 0.92;
            self.push(p);
        }
    }

    /// Slow falling background star
    pub fn star<R: Rng>(&mut self, rng: &mut R, pos: Vec2) {
        let mut p = Particle::new(
            pos,
            Vec2::new(0.0, random_between(rng, 0.5, 2.0)),
            STAR_COLOR,
            random_between(rng, 0.5, 2.0),
            random_between(rng, 5.0, 10.0),
        );
        p.friction = 1.0;
        self.push(p);
    }

    /// Advance every particle and drop the expired ones
    pub fn update(&mut self, dt: f32) {
        self.particles.retain_mut(|p| p.update(dt));
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_particle_expires() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), STAR_COLOR, 1.0, 0.05);
        assert!(p.update(0.016));
        assert!(p.alpha() < 1.0);
        assert!(p.update(0.016));
        assert!(p.update(0.016));
        assert!(!p.update(0.016));
    }

    #[test]
    fn test_friction_and_gravity() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(10.0, 0.0), STAR_COLOR, 1.0, 1.0);
        p.friction = 0.5;
        p.gravity = 1.0;
        p.update(0.01);
        assert_eq!(p.pos, Vec2::new(10.0, 0.0));
        assert_eq!(p.vel, Vec2::new(5.0, 1.0));
    }

    #[test]
    fn test_system_drops_expired() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut system = ParticleSystem::new();
        system.explosion(&mut rng, Vec2::ZERO, 10, EXPLOSION_COLOR);
        system.collection(Vec2::ZERO, TRAIL_COLOR);
        assert_eq!(system.len(), 18);

        // Every explosion/collection particle lives at most 1.5s
        for _ in 0..100 {
            system.update(0.016);
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut system = ParticleSystem::with_cap(4);
        system.star(&mut rng, Vec2::new(1.0, 0.0));
        system.collection(Vec2::ZERO, TRAIL_COLOR);
        assert_eq!(system.len(), 4);
        assert!(system.iter().all(|p| p.color == TRAIL_COLOR));

        system.set_cap(0);
        system.star(&mut rng, Vec2::ZERO);
        assert!(system.is_empty());
    }
}
