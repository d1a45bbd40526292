//! Asteroids: drifting obstacles that fragment when destroyed

use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;

use super::particle::ParticleSystem;
use crate::{circles_overlap, hex_color, random_between, random_int};

/// Asteroid color palette
pub const PALETTE: [[f32; 4]; 8] = [
    hex_color(0xff6b6b),
    hex_color(0x4ecdc4),
    hex_color(0x45b7d1),
    hex_color(0x96ceb4),
    hex_color(0xffeaa7),
    hex_color(0xdda0dd),
    hex_color(0x98d8c8),
    hex_color(0xf7dc6f),
];

/// Asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

/// Fixed parameters of a size class
#[derive(Debug, Clone, Copy)]
pub struct SizeParams {
    pub min_radius: f32,
    pub max_radius: f32,
    pub health: u32,
}

/// How a destroyed asteroid fragments
#[derive(Debug, Clone)]
pub struct Fragmentation {
    pub child: AsteroidSize,
    pub count: RangeInclusive<u32>,
    /// Max spawn offset from the parent on each axis
    pub spread: f32,
    pub vel_x: (f32, f32),
    pub vel_y: (f32, f32),
}

impl AsteroidSize {
    pub fn params(self) -> SizeParams {
        match self {
            AsteroidSize::Large => SizeParams {
                min_radius: 20.0,
                max_radius: 30.0,
                health: 3,
            },
            AsteroidSize::Medium => SizeParams {
                min_radius: 12.0,
                max_radius: 18.0,
                health: 2,
            },
            AsteroidSize::Small => SizeParams {
                min_radius: 6.0,
                max_radius: 10.0,
                health: 1,
            },
        }
    }

    pub fn fragmentation(self) -> Option<Fragmentation> {
        match self {
            AsteroidSize::Large => Some(Fragmentation {
                child: AsteroidSize::Medium,
                count: 2..=3,
                spread: 20.0,
                vel_x: (-3.0, 3.0),
                vel_y: (-1.0, 2.0),
            }),
            AsteroidSize::Medium => Some(Fragmentation {
                child: AsteroidSize::Small,
                count: 2..=4,
                spread: 15.0,
                vel_x: (-4.0, 4.0),
                vel_y: (-2.0, 3.0),
            }),
            AsteroidSize::Small => None,
        }
    }
}

/// A drifting asteroid
#[derive(Debug, Clone)]
pub struct Asteroid {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub size: AsteroidSize,
    pub radius: f32,
    pub health: u32,
    pub color: [f32; 4],
    pub glow: f32,
    /// Outline offsets from the center, fixed at creation
    vertices: Vec<Vec2>,
    /// Interior detail chords (vertex index pairs)
    details: [(usize, usize); 3],
}

impl Asteroid {
    pub fn new<R: Rng>(rng: &mut R, pos: Vec2, size: AsteroidSize) -> Self {
        let params = size.params();
        let radius = random_between(rng, params.min_radius, params.max_radius);
        let vertices = generate_outline(rng, radius);
        let n = vertices.len() as u32 - 1;
        let chord = |rng: &mut R| (random_int(rng, 0, n) as usize, random_int(rng, 0, n) as usize);
        let details = [chord(rng), chord(rng), chord(rng)];

        Self {
            pos,
            vel: Vec2::new(random_between(rng, -2.0, 2.0), random_between(rng, 1.0, 3.0)),
            rotation: 0.0,
            rotation_speed: random_between(rng, -0.05, 0.05),
            size,
            radius,
            health: params.health,
            color: PALETTE[random_int(rng, 0, PALETTE.len() as u32 - 1) as usize],
            glow: random_between(rng, 0.5, 1.0),
            vertices,
            details,
        }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn details(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.details
            .iter()
            .map(|&(a, b)| (self.vertices[a], self.vertices[b]))
    }

    /// Advance one frame within a `width` x `height` play area
    pub fn update<R: Rng>(&mut self, rng: &mut R, width: f32, height: f32) {
        self.pos += self.vel;
        self.rotation += self.rotation_speed;

        // Horizontal wrap
        if self.pos.x < -self.radius {
            self.pos.x = width + self.radius;
        } else if self.pos.x > width + self.radius {
            self.pos.x = -self.radius;
        }

        // Recycle to the top once fully past the bottom edge
        if self.pos.y > height + self.radius {
            self.pos.y = -self.radius;
            self.pos.x = random_between(rng, 0.0, width);
        }
    }

    /// Apply one point of damage. Returns true when destroyed.
    pub fn take_damage<R: Rng>(&mut self, rng: &mut R, particles: &mut ParticleSystem) -> bool {
        debug_assert!(self.health > 0, "damaging a destroyed asteroid");
        if self.health == 0 {
            log::warn!("asteroid damaged with no health left");
        }
        self.health = self.health.saturating_sub(1);
        particles.explosion(rng, self.pos, 8, self.color);
        self.health == 0
    }

    /// Fragment into smaller asteroids, emitting the destruction burst
    pub fn split<R: Rng>(&self, rng: &mut R, particles: &mut ParticleSystem) -> Vec<Asteroid> {
        let mut children = Vec::new();
        if let Some(frag) = self.size.fragmentation() {
            let count = random_int(rng, *frag.count.start(), *frag.count.end());
            for _ in 0..count {
                let offset = Vec2::new(
                    random_between(rng, -frag.spread, frag.spread),
                    random_between(rng, -frag.spread, frag.spread),
                );
                let mut child = Asteroid::new(rng, self.pos + offset, frag.child);
                child.vel = Vec2::new(
                    random_between(rng, frag.vel_x.0, frag.vel_x.1),
                    random_between(rng, frag.vel_y.0, frag.vel_y.1),
                );
                children.push(child);
            }
        }
        particles.explosion(rng, self.pos, 20, self.color);
        children
    }

    /// Circle overlap against another body
    pub fn hits(&self, pos: Vec2, radius: f32) -> bool {
        circles_overlap(self.pos, self.radius, pos, radius)
    }
}

/// Jagged outline of 6-10 vertices around `radius`
fn generate_outline<R: Rng>(rng: &mut R, radius: f32) -> Vec<Vec2> {
    let sides = random_int(rng, 6, 10);
    (0..sides)
        .map(|i| {
            let angle = (i as f32 / sides as f32) * TAU;
            let r = radius + random_between(rng, -radius * 0.3, radius * 0.3);
            Vec2::new(angle.cos() * r, angle.sin() * r)
        })
        .collect()
}
