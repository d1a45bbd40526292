//! Session controller
//!
//! Owns the simulation, audio, high scores and settings for the lifetime of
//! the page. The driver feeds it key events, frame time and wall-clock time;
//! the session turns simulation events into sounds, high-score records and
//! [`Ui`] notifications.

use crate::audio::{AudioSystem, Cue};
use crate::consts::{SHIELD_CHIME_DELAY, WINNER_FANFARE_DELAY};
use crate::highscores::HighScores;
use crate::renderer::Canvas;
use crate::renderer::scene::{FrameInfo, draw_scene};
use crate::settings::Settings;
use crate::sim::{
    ControlScheme, GameEvent, GameMode, GameState, InputState, Outcome, PlayerSlot, tick,
};

/// Values shown in the in-game HUD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score: u64,
    /// Player health, per-player health or team lives depending on mode
    pub lives: String,
    pub level: u32,
    pub high_score: u64,
}

/// Presentation layer for menus, overlays and the HUD
pub trait Ui {
    fn show_menu(&mut self);
    fn show_player_count(&mut self);
    /// Mode choices for `player_count` players with each mode's best score
    fn show_mode_selection(&mut self, player_count: usize, best: &[(GameMode, u64)]);
    /// Hide every overlay for play
    fn show_game(&mut self);
    fn update_hud(&mut self, hud: &Hud);
    fn show_game_over(&mut self, score: u64, high_score: u64, new_high_score: bool);
    fn show_winner(&mut self, winner: &str, score: u64, high_score: u64);
    fn set_audio_enabled(&mut self, enabled: bool);
}

/// Game session controller
pub struct Session {
    state: GameState,
    audio: AudioSystem,
    high_scores: HighScores,
    settings: Settings,
    input: InputState,
    ui: Box<dyn Ui>,
    /// Best score for the current mode
    high_score: u64,
}

impl Session {
    pub fn new(
        mut state: GameState,
        mut audio: AudioSystem,
        high_scores: HighScores,
        settings: Settings,
        mut ui: Box<dyn Ui>,
    ) -> Self {
        state.particles.set_cap(settings.max_particles());
        audio.set_volume(settings.master_volume);
        if !settings.audio_enabled {
            audio.toggle();
        }
        ui.set_audio_enabled(audio.is_enabled());
        ui.show_menu();

        Self {
            state,
            audio,
            high_scores,
            settings,
            input: InputState::new(),
            ui,
            high_score: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn audio(&self) -> &AudioSystem {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Record a key press or release. Returns whether the key is bound.
    pub fn key_event(&mut self, code: &str, pressed: bool) -> bool {
        self.input.set_key(code, pressed)
    }

    pub fn show_menu(&mut self) {
        self.state.show_menu();
        self.ui.show_menu();
    }

    pub fn show_player_count(&mut self) {
        self.state.show_player_count();
        self.ui.show_player_count();
    }

    /// Back to player-count selection after a finished session
    pub fn restart(&mut self) {
        self.show_player_count();
    }

    pub fn show_mode_selection(&mut self, player_count: usize) {
        self.state.show_mode_selection(player_count);
        let modes: &[GameMode] = match self.state.player_count {
            1 => &[GameMode::Single],
            _ => &[GameMode::Vs, GameMode::Coop],
        };
        let best: Vec<(GameMode, u64)> = modes
            .iter()
            .map(|&mode| (mode, self.high_scores.best(mode)))
            .collect();
        self.ui.show_mode_selection(self.state.player_count, &best);
    }

    /// Begin a session in `mode`; `scheme` only matters for single player
    pub fn start(&mut self, mode: GameMode, scheme: ControlScheme) {
        self.audio.cancel_pending_cues();
        self.audio.stop_music();

        self.state.start(mode, scheme);
        self.high_score = self.high_scores.best(mode);

        self.audio.start_music(self.state.level);
        self.ui.show_game();
        self.ui.update_hud(&self.hud());
    }

    /// Flip audio on or off, remember the choice and return the new state
    pub fn toggle_audio(&mut self) -> bool {
        let enabled = self.audio.toggle();
        self.settings.audio_enabled = enabled;
        self.settings.save();
        self.ui.set_audio_enabled(enabled);
        enabled
    }

    /// Feed wall-clock seconds to every deferred task, playing or not.
    /// Independent of `update`, so timers keep running while frames stall.
    pub fn pump(&mut self, now: f64) {
        self.state.pump(now);
        self.audio.pump(now);
    }

    /// Advance one display frame
    pub fn update(&mut self, dt: f32) {
        if !self.state.is_playing() {
            return;
        }
        tick(&mut self.state, &self.input, dt);
        self.handle_events();
        self.ui.update_hud(&self.hud());
    }

    /// Draw the current frame at wall-clock `time`
    pub fn render(&self, canvas: &mut impl Canvas, time: f64) {
        let frame = FrameInfo {
            time,
            reduced_motion: self.settings.reduced_motion,
        };
        draw_scene(canvas, &self.state, frame);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }

    pub fn hud(&self) -> Hud {
        let health = |slot| self.state.player(slot).map_or(0, |p| p.health);
        let lives = match self.state.mode {
            GameMode::Single => health(PlayerSlot::One).to_string(),
            GameMode::Vs => format!(
                "P1: {} | P2: {}",
                health(PlayerSlot::One),
                health(PlayerSlot::Two)
            ),
            GameMode::Coop => format!("Team Lives: {}", self.state.shared_lives),
        };

        Hud {
            score: self.state.score,
            lives,
            level: self.state.level,
            high_score: self.high_score,
        }
    }

    fn handle_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::LevelUp { level } => {
                    self.audio.play(Cue::LevelUp);
                    self.audio.set_music_level(level);
                }
                GameEvent::PlayerHit { .. } => self.audio.play(Cue::Damage),
                GameEvent::FatalHit { .. } => self.audio.play(Cue::GameOver),
                GameEvent::AsteroidHit => self.audio.play(Cue::Asteroid),
                GameEvent::PowerUpCollected { .. } => self.audio.play(Cue::PowerUp),
                GameEvent::ShieldActivated => self.audio.play_after(Cue::Shield, SHIELD_CHIME_DELAY),
                GameEvent::SessionEnded { outcome, score } => self.end_session(outcome, score),
            }
        }
    }

    fn end_session(&mut self, outcome: Outcome, score: u64) {
        self.audio.stop_music();
        self.audio.cancel_pending_cues();

        let new_high_score = self.high_scores.submit(self.state.mode, score);
        if new_high_score {
            self.high_score = score;
        }

        match outcome {
            Outcome::Loss => self.ui.show_game_over(score, self.high_score, new_high_score),
            Outcome::Winner(slot) => {
                self.ui.show_winner(slot.label(), score, self.high_score);
                self.audio.play_after(Cue::LevelUp, WINNER_FANFARE_DELAY);
            }
        }
    }
}
