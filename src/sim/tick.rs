//! Per-frame simulation update
//!
//! Core game loop: timers, spawning, difficulty, entity motion, collision
//! resolution and score accrual.

use super::input::InputState;
use super::powerup::SessionEffects;
use super::state::{GameEvent, GameMode, GameState, Outcome};
use crate::consts::*;

/// Advance the game by one display frame.
///
/// `dt` is in seconds and is clamped to [`MAX_FRAME_DT`]. Does nothing
/// unless the game is playing.
pub fn tick(state: &mut GameState, input: &InputState, dt: f32) {
    if !state.is_playing() {
        return;
    }
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    let (width, height) = (state.width, state.height);

    // Timers
    state.asteroid_timer += dt;
    state.powerup_timer += dt;
    state.background_timer += dt;
    state.difficulty_timer += dt;

    if state.asteroid_timer >= state.spawn_interval {
        state.spawn_asteroid();
        state.asteroid_timer = 0.0;
    }

    if state.powerup_timer >= POWERUP_SPAWN_INTERVAL {
        state.spawn_powerup();
        state.powerup_timer = 0.0;
    }

    if state.background_timer >= STAR_INTERVAL {
        state.spawn_star();
        state.background_timer = 0.0;
    }

    if state.difficulty_timer >= DIFFICULTY_INTERVAL {
        state.level += 1;
        state.spawn_interval = (state.spawn_interval - SPAWN_INTERVAL_STEP).max(MIN_SPAWN_INTERVAL);
        state.difficulty_timer = 0.0;
        log::info!(
            "Level {} (spawn interval {:.1}s)",
            state.level,
            state.spawn_interval
        );
        state.events.push(GameEvent::LevelUp { level: state.level });
    }

    for player in &mut state.players {
        player.update(dt, width, height, input, &mut state.rng, &mut state.particles);
    }

    // Asteroids, newest first so removal keeps pending indices valid
    for i in (0..state.asteroids.len()).rev() {
        state.asteroids[i].update(&mut state.rng, width, height);

        // At most one player is credited with a given asteroid
        let asteroid = &state.asteroids[i];
        let Some(j) = state
            .players
            .iter()
            .position(|p| asteroid.hits(p.pos, p.hit_radius()))
        else {
            continue;
        };

        if let Some(outcome) = resolve_asteroid_hit(state, j) {
            state.finish(outcome);
            return;
        }

        // Any hit removes this asteroid; fragments are new instances
        state.events.push(GameEvent::AsteroidHit);
        let asteroid = state.asteroids.remove(i);
        let fragments = asteroid.split(&mut state.rng, &mut state.particles);
        state.asteroids.extend(fragments);
    }

    // Power-ups
    for i in (0..state.powerups.len()).rev() {
        if !state.powerups[i].update(dt, width, height) {
            state.powerups.remove(i);
            continue;
        }

        let powerup = &state.powerups[i];
        let Some(j) = state
            .players
            .iter()
            .position(|p| powerup.hits(p.pos, p.hit_radius()))
        else {
            continue;
        };

        let mut powerup = state.powerups.remove(i);
        state.events.push(GameEvent::PowerUpCollected { kind: powerup.kind });
        powerup.apply_effect(
            &mut state.players[j],
            SessionEffects {
                mode: state.mode,
                score: &mut state.score,
                shared_lives: &mut state.shared_lives,
                particles: &mut state.particles,
                deferred: &mut state.deferred,
                events: &mut state.events,
            },
        );
    }

    state.particles.update(dt);

    // Survival score
    if dt > 0.0 {
        let points_per_sec = BASE_POINTS_PER_SEC + (state.level - 1) as f32 * POINTS_PER_LEVEL;
        state.score += (dt * points_per_sec).ceil() as u64;
    }
}

/// Apply the mode's damage rule for an asteroid hitting player `j`.
/// Returns the outcome when the hit ends the session.
fn resolve_asteroid_hit(state: &mut GameState, j: usize) -> Option<Outcome> {
    let player = &mut state.players[j];
    let slot = player.slot;

    match state.mode {
        GameMode::Coop => {
            if player.is_protected() {
                return None;
            }
            player.mark_hit(&mut state.rng, &mut state.particles);
            debug_assert!(state.shared_lives > 0, "team hit with no lives left");
            if state.shared_lives == 0 {
                log::warn!("Team hit with no shared lives left");
            }
            state.shared_lives = state.shared_lives.saturating_sub(1);

            if state.shared_lives == 0 {
                state.events.push(GameEvent::FatalHit { slot });
                Some(Outcome::Loss)
            } else {
                state.events.push(GameEvent::PlayerHit { slot });
                None
            }
        }
        GameMode::Single | GameMode::Vs => {
            if player.take_damage(&mut state.rng, &mut state.particles) {
                state.events.push(GameEvent::FatalHit { slot });
                Some(match state.mode {
                    GameMode::Vs => Outcome::Winner(slot.other()),
                    _ => Outcome::Loss,
                })
            } else {
                state.events.push(GameEvent::PlayerHit { slot });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::asteroid::{Asteroid, AsteroidSize};
    use crate::sim::input::{Action, ControlScheme};
    use crate::sim::player::PlayerSlot;
    use crate::sim::powerup::{PowerUp, PowerUpKind};
    use crate::sim::state::GamePhase;
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = 0.016;

    fn playing(mode: GameMode) -> GameState {
        let mut state = GameState::new(12345, 800.0, 600.0);
        state.start(mode, ControlScheme::Wasd);
        // Keep the field clear unless a test places something
        state.asteroids.clear();
        state
    }

    /// Drop a small asteroid right on top of a player
    fn asteroid_on(state: &mut GameState, slot: PlayerSlot) {
        let pos = state.player(slot).map(|p| p.pos).unwrap_or_default();
        let mut a = Asteroid::new(&mut state.rng, pos, AsteroidSize::Small);
        a.vel = Vec2::ZERO;
        state.asteroids.push(a);
    }

    fn clear_protection(state: &mut GameState) {
        for p in &mut state.players {
            p.invulnerable = false;
            p.shield = false;
        }
    }

    #[test]
    fn test_tick_only_while_playing() {
        let mut state = GameState::new(1, 800.0, 600.0);
        tick(&mut state, &InputState::new(), DT);
        assert_eq!(state.score, 0);
        assert_eq!(state.asteroid_timer, 0.0);

        state.start(GameMode::Single, ControlScheme::Wasd);
        state.finish(Outcome::Loss);
        let score = state.score;
        tick(&mut state, &InputState::new(), DT);
        assert_eq!(state.score, score);
    }

    #[test]
    fn test_score_rate_by_level() {
        let mut state = playing(GameMode::Single);
        tick(&mut state, &InputState::new(), DT);
        // ceil(0.016 * 25) = 1
        assert_eq!(state.score, 1);

        state.level = 3;
        let before = state.score;
        tick(&mut state, &InputState::new(), 0.1);
        // dt clamps to 0.016: ceil(0.016 * 45) = 1
        assert_eq!(state.score - before, 1);
    }

    #[test]
    fn test_asteroid_spawn_cadence() {
        let mut state = playing(GameMode::Single);
        state.asteroid_timer = INITIAL_SPAWN_INTERVAL - 0.01;
        tick(&mut state, &InputState::new(), DT);
        assert_eq!(state.asteroids.len(), 1);
        assert_eq!(state.asteroid_timer, 0.0);
    }

    #[test]
    fn test_powerup_spawn_cadence() {
        let mut state = playing(GameMode::Single);
        state.powerup_timer = POWERUP_SPAWN_INTERVAL - 0.01;
        tick(&mut state, &InputState::new(), DT);
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn test_difficulty_ramp() {
        let mut state = playing(GameMode::Single);
        for level in 2..30 {
            state.difficulty_timer = DIFFICULTY_INTERVAL;
            tick(&mut state, &InputState::new(), 0.0);
            assert_eq!(state.level, level);
        }
        assert_eq!(state.spawn_interval, MIN_SPAWN_INTERVAL);
        assert!(state.drain_events().contains(&GameEvent::LevelUp { level: 29 }));
    }

    #[test]
    fn test_player_moves_with_input() {
        let mut state = playing(GameMode::Single);
        let mut input = InputState::new();
        input.set(ControlScheme::Wasd, Action::Up, true);
        let start = state.players[0].pos;
        tick(&mut state, &input, DT);
        assert!(state.players[0].pos.y < start.y);
    }

    #[test]
    fn test_single_three_hits_game_over() {
        let mut state = playing(GameMode::Single);
        for hit in 1..=3 {
            clear_protection(&mut state);
            asteroid_on(&mut state, PlayerSlot::One);
            tick(&mut state, &InputState::new(), DT);
            assert_eq!(state.players[0].health, 3 - hit);
        }
        assert_eq!(state.phase, GamePhase::GameOver);

        let events = state.drain_events();
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::PlayerHit { .. })).count(),
            2
        );
        assert!(events.contains(&GameEvent::FatalHit { slot: PlayerSlot::One }));
        assert!(matches!(
            events.last(),
            Some(GameEvent::SessionEnded { outcome: Outcome::Loss, .. })
        ));
    }

    #[test]
    fn test_hit_always_removes_asteroid() {
        let mut state = playing(GameMode::Single);
        state.players[0].activate_shield();
        asteroid_on(&mut state, PlayerSlot::One);
        tick(&mut state, &InputState::new(), DT);

        // Shielded, but the small asteroid is still gone (no fragments)
        assert!(state.asteroids.is_empty());
        assert_eq!(state.players[0].health, PLAYER_MAX_HEALTH);
        assert!(state.drain_events().contains(&GameEvent::AsteroidHit));
    }

    #[test]
    fn test_large_hit_fragments() {
        let mut state = playing(GameMode::Single);
        let pos = state.players[0].pos;
        let mut a = Asteroid::new(&mut state.rng, pos, AsteroidSize::Large);
        a.vel = Vec2::ZERO;
        state.asteroids.push(a);

        tick(&mut state, &InputState::new(), DT);
        assert!((2..=3).contains(&state.asteroids.len()));
        assert!(state.asteroids.iter().all(|a| a.size == AsteroidSize::Medium));
    }

    #[test]
    fn test_one_player_credited_per_asteroid() {
        let mut state = playing(GameMode::Vs);
        // Stack both ships on the same spot
        state.players[1].pos = state.players[0].pos;
        asteroid_on(&mut state, PlayerSlot::One);
        tick(&mut state, &InputState::new(), DT);

        assert_eq!(state.players[0].health, 2);
        assert_eq!(state.players[1].health, 3);
    }

    #[test]
    fn test_vs_winner_is_other_player() {
        let mut state = playing(GameMode::Vs);
        state.players[0].health = 1;
        asteroid_on(&mut state, PlayerSlot::One);
        tick(&mut state, &InputState::new(), DT);

        assert_eq!(state.phase, GamePhase::Winner);
        assert!(state.drain_events().contains(&GameEvent::SessionEnded {
            outcome: Outcome::Winner(PlayerSlot::Two),
            score: 0,
        }));
    }

    #[test]
    fn test_coop_shared_lives() {
        let mut state = playing(GameMode::Coop);
        for hit in 1..=5u32 {
            clear_protection(&mut state);
            let slot = if hit % 2 == 0 { PlayerSlot::Two } else { PlayerSlot::One };
            asteroid_on(&mut state, slot);
            tick(&mut state, &InputState::new(), DT);
            assert_eq!(state.shared_lives, SHARED_LIVES - hit);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        // Individual health is untouched in co-op
        assert!(state.players.iter().all(|p| p.health == PLAYER_MAX_HEALTH));
    }

    #[test]
    fn test_coop_protected_hit_is_free() {
        let mut state = playing(GameMode::Coop);
        state.players[0].invulnerable = true;
        state.players[0].invulnerability_time = 1.0;
        asteroid_on(&mut state, PlayerSlot::One);
        tick(&mut state, &InputState::new(), DT);
        assert_eq!(state.shared_lives, SHARED_LIVES);
        assert!(state.asteroids.is_empty());
    }

    #[test]
    fn test_score_powerup_collected_once() {
        let mut state = playing(GameMode::Single);
        let pos = state.players[0].pos;
        let mut pu = PowerUp::new(&mut state.rng, pos, PowerUpKind::Score);
        pu.vel = Vec2::ZERO;
        state.powerups.push(pu);

        tick(&mut state, &InputState::new(), DT);
        assert!(state.powerups.is_empty());
        // Bonus plus one frame of survival score
        assert_eq!(state.score, SCORE_BONUS + 1);
        assert!(state.drain_events().contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::Score
        }));
    }

    #[test]
    fn test_expired_powerup_never_applies() {
        let mut state = playing(GameMode::Single);
        let pos = state.players[0].pos;
        let mut pu = PowerUp::new(&mut state.rng, pos, PowerUpKind::Score);
        pu.vel = Vec2::ZERO;
        pu.lifetime = 0.01;
        state.powerups.push(pu);

        tick(&mut state, &InputState::new(), DT);
        assert!(state.powerups.is_empty());
        assert_eq!(state.score, 1);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99, 800.0, 600.0);
        let mut b = GameState::new(99, 800.0, 600.0);
        a.start(GameMode::Coop, ControlScheme::Wasd);
        b.start(GameMode::Coop, ControlScheme::Wasd);

        let mut input = InputState::new();
        input.set(ControlScheme::Arrows, Action::Left, true);
        for _ in 0..600 {
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.asteroids.len(), b.asteroids.len());
        assert_eq!(a.players[1].pos, b.players[1].pos);
    }

    proptest! {
        #[test]
        fn prop_score_monotonic_while_playing(
            seed in any::<u64>(),
            dts in proptest::collection::vec(0.0f32..0.05, 1..200),
        ) {
            let mut state = GameState::new(seed, 800.0, 600.0);
            state.start(GameMode::Single, ControlScheme::Wasd);
            let input = InputState::new();

            let mut last = state.score;
            for dt in dts {
                let was_playing = state.is_playing();
                tick(&mut state, &input, dt);
                prop_assert!(state.score >= last);
                if !was_playing {
                    prop_assert_eq!(state.score, last);
                }
                last = state.score;
            }
        }
    }
}
