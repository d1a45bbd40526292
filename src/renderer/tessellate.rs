//! Canvas backend that turns draw calls into colored triangles

use glam::{Affine2, Vec2};
use std::f32::consts::PI;

use super::Canvas;
use super::vertex::Vertex;

/// Segments in a full circle
const CIRCLE_SEGMENTS: u32 = 24;

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Affine2,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// Collects a frame's triangles in pixel space
#[derive(Debug, Default)]
pub struct Tessellator {
    vertices: Vec<Vertex>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Tessellator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Start a new frame, keeping the allocation
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.state = DrawState::default();
        self.stack.clear();
    }

    fn push(&mut self, p: Vec2, mut color: [f32; 4]) {
        let p = self.state.transform.transform_point2(p);
        color[3] *= self.state.alpha;
        self.vertices.push(Vertex::new(p.x, p.y, color));
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        self.push(a, color);
        self.push(b, color);
        self.push(c, color);
    }

    /// Quad from two edge pairs: (a1, b1) at one end, (a2, b2) at the other
    fn quad(&mut self, a1: Vec2, b1: Vec2, a2: Vec2, b2: Vec2, color: [f32; 4]) {
        self.triangle(a1, b1, a2, color);
        self.triangle(a2, b1, b2, color);
    }

    fn segment(&mut self, from: Vec2, to: Vec2, color: [f32; 4], width: f32) {
        let dir = (to - from).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let perp = dir.perp() * (width * 0.5);
        self.quad(from + perp, from - perp, to + perp, to - perp, color);
    }

    fn circle_point(center: Vec2, radius: f32, i: u32) -> Vec2 {
        let theta = (i as f32 / CIRCLE_SEGMENTS as f32) * 2.0 * PI;
        center + Vec2::from_angle(theta) * radius
    }
}

impl Canvas for Tessellator {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("Canvas restore without matching save"),
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.transform = self.state.transform * Affine2::from_translation(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(angle);
    }

    fn scale(&mut self, factor: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::splat(factor));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: [f32; 4]) {
        if points.len() < 3 {
            return;
        }
        let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.triangle(centroid, a, b, color);
        }
    }

    fn stroke_polygon(&mut self, points: &[Vec2], color: [f32; 4], width: f32) {
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.segment(a, b, color, width);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        for i in 0..CIRCLE_SEGMENTS {
            let p1 = Self::circle_point(center, radius, i);
            let p2 = Self::circle_point(center, radius, i + 1);
            self.triangle(center, p1, p2, color);
        }
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4], width: f32) {
        let inner_radius = (radius - width * 0.5).max(0.0);
        let outer_radius = radius + width * 0.5;
        for i in 0..CIRCLE_SEGMENTS {
            let inner1 = Self::circle_point(center, inner_radius, i);
            let outer1 = Self::circle_point(center, outer_radius, i);
            let inner2 = Self::circle_point(center, inner_radius, i + 1);
            let outer2 = Self::circle_point(center, outer_radius, i + 1);
            self.quad(inner1, outer1, inner2, outer2, color);
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: [f32; 4], width: f32) {
        self.segment(from, to, color, width);
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let edge = [color[0], color[1], color[2], 0.0];
        for i in 0..CIRCLE_SEGMENTS {
            let p1 = Self::circle_point(center, radius, i);
            let p2 = Self::circle_point(center, radius, i + 1);
            self.push(center, color);
            self.push(p1, edge);
            self.push(p2, edge);
        }
    }
}
