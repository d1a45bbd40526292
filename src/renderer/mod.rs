//! Rendering
//!
//! Scene code draws through the [`Canvas`] trait in pixel space. The wgpu
//! backend tessellates those calls into colored triangles
//! ([`Tessellator`]) and uploads them once per frame ([`RenderState`]).

pub mod pipeline;
pub mod scene;
pub mod tessellate;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::draw_scene;
pub use tessellate::Tessellator;
pub use vertex::Vertex;

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::sim::Symbol;

/// Immediate-mode 2D drawing surface with a transform and alpha stack
pub trait Canvas {
    /// Push the current transform and alpha
    fn save(&mut self);
    /// Pop back to the last `save`
    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, factor: f32);

    /// Multiplier applied to every color drawn until the next `restore`
    fn set_alpha(&mut self, alpha: f32);

    /// Fill a polygon that is star-shaped around its vertex centroid
    fn fill_polygon(&mut self, points: &[Vec2], color: [f32; 4]);
    /// Closed outline
    fn stroke_polygon(&mut self, points: &[Vec2], color: [f32; 4], width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4], width: f32);
    fn line(&mut self, from: Vec2, to: Vec2, color: [f32; 4], width: f32);

    /// Disc fading from `color` at the center to transparent at `radius`
    fn radial_glow(&mut self, center: Vec2, radius: f32, color: [f32; 4]);

    /// Power-up symbol roughly `size` pixels tall
    fn glyph(&mut self, symbol: Symbol, center: Vec2, size: f32, color: [f32; 4]) {
        let h = size * 0.4;
        match symbol {
            Symbol::Plus => {
                let w = size * 0.2;
                self.line(center - Vec2::X * h, center + Vec2::X * h, color, w);
                self.line(center - Vec2::Y * h, center + Vec2::Y * h, color, w);
            }
            Symbol::Diamond => {
                let points = [
                    Vec2::new(0.0, -h),
                    Vec2::new(h * 0.75, 0.0),
                    Vec2::new(0.0, h),
                    Vec2::new(-h * 0.75, 0.0),
                ];
                self.fill_polygon(&points.map(|p| center + p), color);
            }
            Symbol::Triangle => {
                let points = [
                    Vec2::new(0.0, -h),
                    Vec2::new(h, h * 0.8),
                    Vec2::new(-h, h * 0.8),
                ];
                self.fill_polygon(&points.map(|p| center + p), color);
            }
            Symbol::Star => {
                let points: Vec<Vec2> = (0..10)
                    .map(|i| {
                        let r = if i % 2 == 0 { h } else { h * 0.4 };
                        let angle = -FRAC_PI_2 + i as f32 * PI / 5.0;
                        center + Vec2::from_angle(angle) * r
                    })
                    .collect();
                self.fill_polygon(&points, color);
            }
        }
    }
}

/// Points of a regular polygon centered on the origin, first vertex on +x
pub fn regular_polygon(sides: usize, radius: f32) -> Vec<Vec2> {
    (0..sides)
        .map(|i| Vec2::from_angle(i as f32 / sides as f32 * 2.0 * PI) * radius)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_polygon() {
        let hex = regular_polygon(6, 10.0);
        assert_eq!(hex.len(), 6);
        assert!((hex[0] - Vec2::new(10.0, 0.0)).length() < 1e-5);
        assert!(hex.iter().all(|p| (p.length() - 10.0).abs() < 1e-4));
    }
}
