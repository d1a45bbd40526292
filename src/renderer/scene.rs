//! Per-entity draw routines
//!
//! Everything is drawn in play-area pixels, back to front: particles,
//! asteroids, power-ups, then ships.

use glam::Vec2;

use super::vertex::colors;
use super::{Canvas, regular_polygon};
use crate::lerp;
use crate::sim::{Asteroid, GameState, Particle, Player, PowerUp};

/// Peak opacity of an asteroid glow
const ASTEROID_GLOW_ALPHA: f32 = 0x30 as f32 / 255.0;
/// Peak opacity of a power-up glow
const POWERUP_GLOW_ALPHA: f32 = 0x80 as f32 / 255.0;
/// Power-ups flash this many seconds before expiring
const EXPIRY_WARNING_SECS: f32 = 2.0;

/// Per-frame presentation inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInfo {
    /// Wall-clock seconds, drives flicker and pulse effects
    pub time: f64,
    /// Skip flicker and pulsing
    pub reduced_motion: bool,
}

fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Draw the live session. Nothing is drawn outside of play.
pub fn draw_scene(canvas: &mut impl Canvas, state: &GameState, frame: FrameInfo) {
    if !state.is_playing() {
        return;
    }

    for particle in state.particles.iter() {
        draw_particle(canvas, particle);
    }
    for asteroid in &state.asteroids {
        draw_asteroid(canvas, asteroid);
    }
    for powerup in &state.powerups {
        draw_powerup(canvas, powerup, frame);
    }
    for player in &state.players {
        draw_player(canvas, player, frame);
    }
}

pub fn draw_particle(canvas: &mut impl Canvas, particle: &Particle) {
    canvas.save();
    canvas.set_alpha(particle.alpha());
    canvas.fill_circle(particle.pos, particle.size, particle.color);
    canvas.restore();
}

pub fn draw_asteroid(canvas: &mut impl Canvas, asteroid: &Asteroid) {
    canvas.save();
    canvas.translate(asteroid.pos);
    canvas.rotate(asteroid.rotation);

    canvas.radial_glow(
        Vec2::ZERO,
        asteroid.radius * 1.5,
        with_alpha(asteroid.color, ASTEROID_GLOW_ALPHA * asteroid.glow),
    );

    let outline = asteroid.vertices();
    canvas.fill_polygon(outline, asteroid.color);
    canvas.stroke_polygon(outline, colors::OUTLINE, 1.0);

    for (from, to) in asteroid.details() {
        canvas.line(from * 0.5, to * 0.5, asteroid.color, 0.5);
    }

    canvas.restore();
}

/// Collected power-ups are skipped
pub fn draw_powerup(canvas: &mut impl Canvas, powerup: &PowerUp, frame: FrameInfo) {
    if powerup.collected {
        return;
    }
    let color = powerup.style.color;
    let size = powerup.size;

    canvas.save();
    canvas.translate(powerup.pos);
    canvas.rotate(powerup.rotation);
    if !frame.reduced_motion {
        canvas.scale(1.0 + powerup.pulse.sin() * 0.3);
    }

    canvas.radial_glow(Vec2::ZERO, size * 2.0, with_alpha(color, POWERUP_GLOW_ALPHA));

    let hexagon = regular_polygon(6, size);
    canvas.fill_polygon(&hexagon, color);
    canvas.stroke_polygon(&hexagon, colors::OUTLINE, 2.0);
    canvas.glyph(powerup.style.symbol, Vec2::ZERO, size, colors::OUTLINE);

    if powerup.lifetime < EXPIRY_WARNING_SECS {
        canvas.fill_circle(Vec2::ZERO, size * 1.5, colors::EXPIRY_WARNING);
    }

    canvas.restore();
}

pub fn draw_player(canvas: &mut impl Canvas, player: &Player, frame: FrameInfo) {
    let size = player.size;

    canvas.save();
    canvas.translate(player.pos);
    canvas.rotate(player.rotation);

    if player.invulnerable {
        let pulse = if frame.reduced_motion {
            0.5
        } else {
            if (frame.time * 12.5).floor() as i64 % 2 == 1 {
                canvas.set_alpha(0.3);
            }
            ((frame.time * 10.0).sin() as f32 + 1.0) * 0.5
        };

        canvas.stroke_circle(
            Vec2::ZERO,
            size + lerp(8.0, 12.0, pulse),
            with_alpha(colors::DAMAGE_RING, lerp(0.5, 1.0, pulse)),
            4.0,
        );
        canvas.stroke_circle(
            Vec2::ZERO,
            size + 6.0,
            with_alpha(colors::OUTLINE, lerp(0.3, 0.7, pulse)),
            2.0,
        );
    }

    if player.shield {
        canvas.stroke_circle(Vec2::ZERO, size + 5.0, crate::sim::player::SHIELD_COLOR, 3.0);
    }

    let hull = [
        Vec2::new(size, 0.0),
        Vec2::new(-size / 2.0, -size / 2.0),
        Vec2::new(-size / 4.0, 0.0),
        Vec2::new(-size / 2.0, size / 2.0),
    ];
    canvas.fill_polygon(&hull, colors::SHIP_BODY);
    canvas.stroke_polygon(&hull, colors::OUTLINE, 2.0);

    let engine = [
        Vec2::new(-size / 2.0, -size / 4.0),
        Vec2::new(-size, 0.0),
        Vec2::new(-size / 2.0, size / 4.0),
    ];
    canvas.fill_polygon(&engine, colors::ENGINE);

    canvas.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Tessellator;
    use crate::sim::{ControlScheme, GameMode, PlayerSlot, PowerUpKind, Symbol};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Canvas that records which primitives were drawn
    #[derive(Default)]
    struct CallLog {
        calls: Vec<&'static str>,
        alphas: Vec<f32>,
        glyphs: Vec<Symbol>,
        depth: i32,
    }

    impl Canvas for CallLog {
        fn save(&mut self) {
            self.depth += 1;
        }
        fn restore(&mut self) {
            self.depth -= 1;
        }
        fn translate(&mut self, _: Vec2) {}
        fn rotate(&mut self, _: f32) {}
        fn scale(&mut self, _: f32) {
            self.calls.push("scale");
        }
        fn set_alpha(&mut self, alpha: f32) {
            self.alphas.push(alpha);
        }
        fn fill_polygon(&mut self, _: &[Vec2], _: [f32; 4]) {
            self.calls.push("fill_polygon");
        }
        fn stroke_polygon(&mut self, _: &[Vec2], _: [f32; 4], _: f32) {
            self.calls.push("stroke_polygon");
        }
        fn fill_circle(&mut self, _: Vec2, _: f32, _: [f32; 4]) {
            self.calls.push("fill_circle");
        }
        fn stroke_circle(&mut self, _: Vec2, _: f32, _: [f32; 4], _: f32) {
            self.calls.push("stroke_circle");
        }
        fn line(&mut self, _: Vec2, _: Vec2, _: [f32; 4], _: f32) {
            self.calls.push("line");
        }
        fn radial_glow(&mut self, _: Vec2, _: f32, _: [f32; 4]) {
            self.calls.push("radial_glow");
        }
        fn glyph(&mut self, symbol: Symbol, _: Vec2, _: f32, _: [f32; 4]) {
            self.glyphs.push(symbol);
        }
    }

    fn count(log: &CallLog, name: &str) -> usize {
        log.calls.iter().filter(|c| **c == name).count()
    }

    fn player() -> Player {
        Player::new(Vec2::new(100.0, 100.0), ControlScheme::Wasd, PlayerSlot::One)
    }

    #[test]
    fn test_nothing_drawn_outside_play() {
        let state = GameState::new(1, 800.0, 600.0);
        let mut log = CallLog::default();
        draw_scene(&mut log, &state, FrameInfo::default());
        assert!(log.calls.is_empty());
    }

    #[test]
    fn test_scene_is_balanced() {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.start(GameMode::Vs, ControlScheme::Wasd);
        state.spawn_powerup();
        let mut log = CallLog::default();
        draw_scene(&mut log, &state, FrameInfo::default());
        assert_eq!(log.depth, 0);
        assert_eq!(count(&log, "radial_glow"), 3 + 1);
    }

    #[test]
    fn test_asteroid_details() {
        let mut rng = Pcg32::seed_from_u64(3);
        let asteroid = Asteroid::new(&mut rng, Vec2::ZERO, crate::sim::AsteroidSize::Large);
        let mut log = CallLog::default();
        draw_asteroid(&mut log, &asteroid);
        assert_eq!(count(&log, "line"), 3);
        assert_eq!(count(&log, "fill_polygon"), 1);
    }

    #[test]
    fn test_collected_powerup_is_hidden() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut powerup = PowerUp::new(&mut rng, Vec2::ZERO, PowerUpKind::Score);
        let mut log = CallLog::default();
        draw_powerup(&mut log, &powerup, FrameInfo::default());
        assert_eq!(log.glyphs, vec![Symbol::Star]);
        assert_eq!(count(&log, "scale"), 1);

        powerup.collected = true;
        let mut log = CallLog::default();
        draw_powerup(&mut log, &powerup, FrameInfo::default());
        assert!(log.calls.is_empty());
    }

    #[test]
    fn test_expiring_powerup_flashes() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut powerup = PowerUp::new(&mut rng, Vec2::ZERO, PowerUpKind::Health);
        powerup.lifetime = 1.0;
        let mut log = CallLog::default();
        draw_powerup(&mut log, &powerup, FrameInfo { time: 0.0, reduced_motion: true });
        assert_eq!(count(&log, "fill_circle"), 1);
        assert_eq!(count(&log, "scale"), 0);
    }

    #[test]
    fn test_invulnerable_ship_flickers() {
        let mut p = player();
        p.invulnerable = true;

        // 0.1 s falls in an odd 80 ms window
        let mut log = CallLog::default();
        draw_player(&mut log, &p, FrameInfo { time: 0.1, reduced_motion: false });
        assert_eq!(log.alphas, vec![0.3]);
        assert_eq!(count(&log, "stroke_circle"), 2);

        let mut log = CallLog::default();
        draw_player(&mut log, &p, FrameInfo { time: 0.1, reduced_motion: true });
        assert!(log.alphas.is_empty());
        assert_eq!(count(&log, "stroke_circle"), 2);
    }

    #[test]
    fn test_shield_ring() {
        let mut p = player();
        p.activate_shield();
        let mut log = CallLog::default();
        draw_player(&mut log, &p, FrameInfo::default());
        assert_eq!(count(&log, "stroke_circle"), 1);
        assert_eq!(count(&log, "fill_polygon"), 2);
    }

    #[test]
    fn test_scene_tessellates() {
        let mut state = GameState::new(9, 800.0, 600.0);
        state.start(GameMode::Single, ControlScheme::Wasd);
        let mut t = Tessellator::new();
        draw_scene(&mut t, &state, FrameInfo::default());
        assert!(t.triangle_count() > 0);
        assert_eq!(t.vertices().len() % 3, 0);
    }
}
