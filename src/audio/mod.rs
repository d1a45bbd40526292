//! Procedural audio: one-shot cues and level-scaled music
//!
//! Nothing here loads sound files. Cues and music cycles are composed as
//! [`voice::Voice`] lists and handed to an [`AudioOut`] backend. Without a
//! backend the system is disabled and every call is a no-op.

pub mod backend;
pub mod cues;
pub mod music;
pub mod voice;

pub use backend::{AudioOut, PlayingVoice};
pub use cues::Cue;
pub use music::{MusicCycle, compose_cycle};

use crate::sim::deferred::{Scheduler, TaskId};

/// Default master volume
pub const DEFAULT_VOLUME: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioTask {
    NextCycle,
    Cue(Cue),
}

/// Music engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Music {
    Stopped,
    Playing { next_cycle: TaskId },
}

/// Audio manager for the game
pub struct AudioSystem {
    out: Option<Box<dyn AudioOut>>,
    enabled: bool,
    volume: f32,
    music: Music,
    level: u32,
    /// Music sources with their end time on the output clock, stopped on
    /// `stop_music`. Drum tails can outlive their cycle.
    music_voices: Vec<(f64, Box<dyn PlayingVoice>)>,
    /// Music was playing when audio was last switched off
    resume_music: bool,
    in_cycle: bool,
    tasks: Scheduler<AudioTask>,
}

impl AudioSystem {
    pub fn new(out: Option<Box<dyn AudioOut>>) -> Self {
        if out.is_none() {
            log::warn!("No audio output available - audio disabled");
        }
        Self {
            out,
            enabled: true,
            volume: DEFAULT_VOLUME,
            music: Music::Stopped,
            level: 1,
            music_voices: Vec::new(),
            resume_music: false,
            in_cycle: false,
            tasks: Scheduler::new(),
        }
    }

    /// A system with no output
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Platform default output
    pub fn platform_default() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::new(
                backend::WebAudioOut::new().map(|out| Box::new(out) as Box<dyn AudioOut>),
            )
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::disabled()
        }
    }

    /// Output exists and the user has not switched audio off
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.out.is_some()
    }

    pub fn is_music_playing(&self) -> bool {
        matches!(self.music, Music::Playing { .. })
    }

    pub fn music_level(&self) -> u32 {
        self.level
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Play a cue now
    pub fn play(&mut self, cue: Cue) {
        if !self.is_enabled() || self.volume <= 0.0 {
            return;
        }
        let volume = self.volume;
        let Some(out) = self.out.as_mut() else { return };

        out.wake();
        let at = out.now();
        for voice in cue.voices(volume) {
            out.start_voice(&voice, at);
        }
    }

    /// Play a cue after `delay` wall-clock seconds
    pub fn play_after(&mut self, cue: Cue, delay: f64) {
        self.tasks.schedule_in(delay, AudioTask::Cue(cue));
    }

    /// Drop cues still waiting on `play_after`
    pub fn cancel_pending_cues(&mut self) {
        self.tasks.cancel_where(|task| matches!(task, AudioTask::Cue(_)));
    }

    /// Start the music loop at `level`. Ignored while already playing.
    pub fn start_music(&mut self, level: u32) {
        if !self.is_enabled() || self.is_music_playing() || self.in_cycle {
            return;
        }
        self.level = level.max(1);
        log::info!("Music started at level {}", self.level);
        self.run_cycle();
    }

    /// Takes effect from the next cycle
    pub fn set_music_level(&mut self, level: u32) {
        self.level = level.max(1);
    }

    /// Stop the loop and cut every source of the current cycle
    pub fn stop_music(&mut self) {
        if let Music::Playing { next_cycle } = self.music {
            self.tasks.cancel(next_cycle);
            log::info!("Music stopped");
        }
        self.music = Music::Stopped;
        self.resume_music = false;
        for (_, voice) in self.music_voices.drain(..) {
            voice.stop();
        }
    }

    /// Flip audio on or off and return the new state. Turning audio back on
    /// resumes the music only if it was playing when audio went off.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            if std::mem::take(&mut self.resume_music) {
                self.start_music(self.level);
            }
        } else {
            let was_playing = self.is_music_playing();
            self.stop_music();
            self.resume_music = was_playing;
        }
        self.enabled
    }

    /// Feed wall-clock time (seconds) to the music loop and delayed cues
    pub fn pump(&mut self, now: f64) {
        for task in self.tasks.advance_to(now) {
            match task {
                AudioTask::NextCycle => {
                    if self.is_music_playing() {
                        self.run_cycle();
                    }
                }
                AudioTask::Cue(cue) => self.play(cue),
            }
        }
    }

    fn run_cycle(&mut self) {
        if self.in_cycle {
            return;
        }
        self.in_cycle = true;

        let cycle = compose_cycle(self.level, self.volume);
        if let Some(out) = self.out.as_mut() {
            out.wake();
            let at = out.now();
            self.music_voices.retain(|(end, _)| *end > at);
            self.music_voices.extend(cycle.voices.iter().filter_map(|voice| {
                out.start_voice(voice, at)
                    .map(|playing| (at + voice.stop, playing))
            }));
        }

        let next_cycle = self.tasks.schedule_in(cycle.duration, AudioTask::NextCycle);
        self.replace_next_cycle(next_cycle);
        self.in_cycle = false;
    }

    fn replace_next_cycle(&mut self, next_cycle: TaskId) {
        if let Music::Playing { next_cycle: old } = self.music {
            self.tasks.cancel(old);
        }
        self.music = Music::Playing { next_cycle };
    }
}

#[cfg(test)]
mod tests {
    use super::backend::RecordingOut;
    use super::*;

    fn recording() -> (AudioSystem, RecordingOut) {
        let out = RecordingOut::new();
        (AudioSystem::new(Some(Box::new(out.clone()))), out)
    }

    #[test]
    fn test_disabled_is_noop() {
        let mut audio = AudioSystem::disabled();
        assert!(!audio.is_enabled());
        audio.play(Cue::Explosion);
        audio.start_music(1);
        assert!(!audio.is_music_playing());
        audio.pump(100.0);
    }

    #[test]
    fn test_play_cue() {
        let (mut audio, out) = recording();
        out.set_clock(2.5);
        audio.play(Cue::LevelUp);
        assert_eq!(out.started(), 3);
        assert!(out.log.borrow().started.iter().all(|(_, at)| *at == 2.5));
        assert_eq!(out.log.borrow().wakes, 1);
    }

    #[test]
    fn test_muted_volume_skips_cues() {
        let (mut audio, out) = recording();
        audio.set_volume(0.0);
        audio.play(Cue::Damage);
        assert_eq!(out.started(), 0);
    }

    #[test]
    fn test_delayed_cue() {
        let (mut audio, out) = recording();
        audio.play_after(Cue::Shield, 0.1);
        audio.pump(0.05);
        assert_eq!(out.started(), 0);
        audio.pump(0.1);
        assert_eq!(out.started(), 1);
    }

    #[test]
    fn test_music_reschedules_itself() {
        let (mut audio, out) = recording();
        audio.start_music(1);
        let first = out.started();
        assert!(first > 0);

        audio.pump(15.9);
        assert_eq!(out.started(), first);
        audio.pump(16.0);
        assert_eq!(out.started(), first * 2);
    }

    #[test]
    fn test_start_while_playing_is_ignored() {
        let (mut audio, out) = recording();
        audio.start_music(1);
        let first = out.started();
        audio.start_music(5);
        assert_eq!(out.started(), first);
        assert_eq!(audio.music_level(), 1);
    }

    #[test]
    fn test_level_change_applies_next_cycle() {
        let (mut audio, out) = recording();
        audio.start_music(1);
        audio.set_music_level(7);
        let before = out.started();
        audio.pump(16.0);
        let shaped = out.log.borrow().started[before..]
            .iter()
            .filter(|(v, _)| v.shaper.is_some())
            .count();
        assert_eq!(shaped, 12);
    }

    #[test]
    fn test_stop_cuts_sources_and_loop() {
        let (mut audio, out) = recording();
        audio.start_music(1);
        let started = out.started();

        audio.stop_music();
        assert!(!audio.is_music_playing());
        assert_eq!(out.stopped(), started);

        audio.pump(100.0);
        assert_eq!(out.started(), started);
    }

    #[test]
    fn test_rapid_restart_keeps_one_loop() {
        let (mut audio, out) = recording();
        for _ in 0..5 {
            audio.start_music(1);
            audio.stop_music();
        }
        audio.start_music(1);
        let per_cycle = out.started() / 6;

        audio.pump(16.0);
        assert_eq!(out.started(), per_cycle * 7);
    }

    #[test]
    fn test_toggle_resumes_only_playing_music() {
        let (mut audio, out) = recording();
        audio.start_music(3);

        assert!(!audio.toggle());
        assert!(!audio.is_music_playing());
        audio.play(Cue::Damage);

        assert!(audio.toggle());
        assert!(audio.is_music_playing());
        assert_eq!(audio.music_level(), 3);

        // Off and on again with music stopped stays silent
        audio.stop_music();
        audio.toggle();
        audio.toggle();
        assert!(!audio.is_music_playing());
        assert!(out.started() > 0);
    }

    #[test]
    fn test_stop_after_cycle_change_cuts_ringing_tails() {
        let (mut audio, out) = recording();
        audio.set_music_level(30);
        audio.start_music(30);
        let first = out.started();
        // Next cycle starts while the last drum hits still ring
        let now = music::cycle_duration(30) + 0.01;
        let tails = out.log.borrow().started[..first]
            .iter()
            .filter(|(v, _)| v.stop > now)
            .count();
        assert!(tails > 0);

        out.set_clock(now);
        audio.pump(now);
        let second = out.started() - first;

        audio.stop_music();
        assert_eq!(out.stopped(), second + tails);
    }

    #[test]
    fn test_finished_voices_are_released() {
        let (mut audio, out) = recording();
        audio.start_music(1);
        let per_cycle = out.started();

        out.set_clock(16.5);
        audio.pump(16.5);
        // Every level 1 voice ends inside its cycle
        audio.stop_music();
        assert_eq!(out.stopped(), per_cycle);
    }

    #[test]
    fn test_stop_clears_pending_resume() {
        let (mut audio, _out) = recording();
        audio.start_music(1);
        assert!(!audio.toggle());

        // Music is stopped for good while audio is off
        audio.stop_music();
        assert!(audio.toggle());
        assert!(!audio.is_music_playing());
    }

    #[test]
    fn test_cancel_pending_cues_keeps_music() {
        let (mut audio, out) = recording();
        audio.start_music(1);
        audio.play_after(Cue::LevelUp, 0.5);
        audio.cancel_pending_cues();
        let before = out.started();

        audio.pump(1.0);
        assert_eq!(out.started(), before);
        audio.pump(16.0);
        assert!(out.started() > before);
        assert!(audio.is_music_playing());
    }
}
