//! Level-scaled ambient music
//!
//! Each cycle is composed fresh from the current level: a bass line, a
//! melody and percussion always play, with arpeggio, lead and distortion
//! layers joining as the level rises. Cycles get shorter as the tempo
//! climbs, and every layer's volume scales linearly with the level.

use super::voice::{Automation as A, Filter, FilterKind, Voice, Waveform};

/// Voices for one music cycle
#[derive(Debug, Clone)]
pub struct MusicCycle {
    /// Seconds until the next cycle should start
    pub duration: f64,
    pub voices: Vec<Voice>,
}

/// Most percussion beats in a cycle
pub const MAX_BEATS: u32 = 32;

/// Kick length, the longest percussion hit. Hits keep fixed lengths, so a
/// late beat at high tempo rings up to this long past the cycle end.
pub const KICK_SECS: f64 = 0.4;

const BASS_ROOT: f32 = 65.41;

/// C5 E5 G5 C6 G5 E5 C5 D5 E5: (frequency, start, length) in melody beats
const MELODY: [(f32, f64, f64); 9] = [
    (523.25, 0.0, 0.4),
    (659.25, 0.4, 0.4),
    (783.99, 0.8, 0.4),
    (1046.50, 1.2, 0.8),
    (783.99, 2.2, 0.3),
    (659.25, 2.5, 0.3),
    (523.25, 2.8, 0.4),
    (587.33, 3.4, 0.3),
    (659.25, 3.7, 0.3),
];

/// A5 B5 D6 E6, added one per level from level 3
const MELODY_EXTRA: [(f32, f64, f64); 4] = [
    (880.00, 4.2, 0.3),
    (987.77, 4.5, 0.3),
    (1174.66, 4.8, 0.4),
    (1318.51, 5.4, 0.6),
];

const ARPEGGIO: [f32; 4] = [523.25, 659.25, 783.99, 1046.50];
const ARPEGGIO_EXTRA: [f32; 3] = [1318.51, 1567.98, 2093.00];

const LEAD: [f32; 8] = [
    1046.50, 1174.66, 1318.51, 1567.98, 1318.51, 1174.66, 1046.50, 1174.66,
];

const DISTORTION_NOTES: [f32; 4] = [65.41, 73.42, 82.41, 87.31];

/// Cycle length in seconds: 16s at level 1, shrinking 10% of tempo per level
pub fn cycle_duration(level: u32) -> f64 {
    let tempo = 1.0 + (level.max(1) - 1) as f64 * 0.1;
    16.0 / tempo
}

/// Compose every active layer for `level` at master `volume`
pub fn compose_cycle(level: u32, volume: f32) -> MusicCycle {
    let level = level.max(1);
    let duration = cycle_duration(level);

    let mut voices = Vec::new();
    voices.extend(bass_line(level, duration, volume));
    voices.extend(melody(level, duration, volume));
    voices.extend(percussion(level, duration, volume));
    voices.extend(arpeggio(level, duration, volume));
    if level >= 4 {
        voices.extend(lead_synth(level, duration, volume));
    }
    if level >= 7 {
        voices.extend(distortion_layer(level, duration, volume));
    }

    log::debug!(
        "Music cycle: level={} duration={:.2}s voices={}",
        level,
        duration,
        voices.len()
    );
    MusicCycle { duration, voices }
}

/// Four filtered bass notes, sawtooth until level 8 then square
pub fn bass_line(level: u32, duration: f64, volume: f32) -> Vec<Voice> {
    let lvl = level as f32;
    let notes = [BASS_ROOT, BASS_ROOT * 1.335, BASS_ROOT * 1.498, BASS_ROOT];
    let note = duration / 4.0;
    let waveform = if level / 4 >= 2 {
        Waveform::Square
    } else {
        Waveform::Sawtooth
    };
    let peak = volume * (0.18 + lvl * 0.01);

    notes
        .iter()
        .enumerate()
        .map(|(i, &freq)| {
            let t = i as f64 * note;
            Voice::oscillator(waveform, t, t + note)
                .freq(A::set(freq, t))
                .filter(
                    Filter::new(FilterKind::LowPass)
                        .freq(A::set(400.0 + lvl * 30.0, t))
                        .q(4.0 + lvl * 0.5),
                )
                .gain(A::set(0.0, t))
                .gain(A::linear(peak, t + 0.05))
                .gain(A::exp(peak * 0.6, t + note))
        })
        .collect()
}

/// The main phrase, extended from level 3 and brighter from level 5
pub fn melody(level: u32, duration: f64, volume: f32) -> Vec<Voice> {
    let lvl = level as f32;
    let extra = if level >= 3 { (level - 2).min(4) as usize } else { 0 };
    let scale = duration / 8.0;
    let waveform = if level >= 5 {
        Waveform::Sawtooth
    } else {
        Waveform::Square
    };
    let peak = volume * (0.10 + lvl * 0.005);

    MELODY
        .iter()
        .chain(&MELODY_EXTRA[..extra])
        .map(|&(freq, time, length)| {
            let t = time * scale;
            let end = t + length * scale;
            Voice::oscillator(waveform, t, end)
                .freq(A::set(freq * (1.0 + lvl * 0.01), t))
                .filter(Filter::new(FilterKind::LowPass).freq(A::set(freq * (3.0 + lvl * 0.2), t)))
                .gain(A::set(0.0, t))
                .gain(A::linear(peak, t + 0.03))
                .gain(A::exp(0.001, end))
        })
        .collect()
}

/// Number of percussion beats in a cycle
pub fn beat_count(level: u32) -> u32 {
    (8 + level * 2).min(MAX_BEATS)
}

/// Kick, hi-hat, snare and shaker pattern
pub fn percussion(level: u32, duration: f64, volume: f32) -> Vec<Voice> {
    let beats = beat_count(level);
    let interval = duration / beats as f64;
    let mut voices = Vec::new();

    for i in 0..beats {
        let t = i as f64 * interval;
        if i % 4 == 0 || (level >= 2 && i % 2 == 0) {
            voices.push(kick(level, t, volume));
        }
        voices.push(hi_hat(level, t, volume));
        if level >= 2 && i % 8 == 4 {
            voices.push(snare(level, t, volume));
        }
        if i % 6 == 2 {
            voices.push(shaker(level, t, volume));
        }
    }
    voices
}

fn kick(level: u32, t: f64, volume: f32) -> Voice {
    let lvl = level as f32;
    // Drops a little with each level; kept audible at extreme levels
    let freq = (65.0 - lvl).max(20.0);
    let peak = volume * (0.20 + lvl * 0.008);
    Voice::oscillator(Waveform::Sine, t, t + KICK_SECS)
        .freq(A::set(freq, t))
        .freq(A::exp(freq * 0.3, t + 0.15))
        .gain(A::set(peak, t))
        .gain(A::exp(0.001, t + KICK_SECS))
}

fn hi_hat(level: u32, t: f64, volume: f32) -> Voice {
    let lvl = level as f32;
    let peak = volume * (0.06 + lvl * 0.003);
    Voice::noise(1024, 1.0, t, t + 0.12)
        .filter(Filter::new(FilterKind::HighPass).freq(A::set(6000.0 + lvl * 300.0, t)))
        .gain(A::set(peak, t))
        .gain(A::exp(0.001, t + 0.08 + level as f64 * 0.01))
}

fn snare(level: u32, t: f64, volume: f32) -> Voice {
    let lvl = level as f32;
    let peak = volume * (0.08 + lvl * 0.005);
    Voice::noise(2048, 1.0, t, t + 0.2)
        .filter(
            Filter::new(FilterKind::BandPass)
                .freq(A::set(1000.0 + lvl * 100.0, t))
                .q(5.0),
        )
        .gain(A::set(peak, t))
        .gain(A::exp(0.001, t + 0.2))
}

fn shaker(level: u32, t: f64, volume: f32) -> Voice {
    let lvl = level as f32;
    let peak = volume * (0.03 + lvl * 0.002);
    Voice::noise(512, 0.5, t, t + 0.06)
        .filter(
            Filter::new(FilterKind::BandPass)
                .freq(A::set(4000.0 + lvl * 200.0, t))
                .q(3.0),
        )
        .gain(A::set(peak, t))
        .gain(A::exp(0.001, t + 0.06))
}

/// Fast triangle pattern over the second half of the cycle, four passes
pub fn arpeggio(level: u32, duration: f64, volume: f32) -> Vec<Voice> {
    let lvl = level as f32;
    let extra = if level >= 5 { (level - 4).min(3) as usize } else { 0 };
    let notes: Vec<f32> = ARPEGGIO.iter().chain(&ARPEGGIO_EXTRA[..extra]).copied().collect();

    let steps = notes.len() * 4;
    let interval = (duration / 2.0) / steps as f64;
    let offset = duration / 2.0;
    let peak = volume * (0.04 + lvl * 0.002);

    (0..steps)
        .map(|step| {
            let t = offset + step as f64 * interval;
            Voice::oscillator(Waveform::Triangle, t, t + interval)
                .freq(A::set(notes[step % notes.len()], t))
                .gain(A::set(0.0, t))
                .gain(A::linear(peak, t + 0.02))
                .gain(A::exp(0.001, t + interval))
        })
        .collect()
}

/// Resonant sawtooth lead with an opening filter sweep
pub fn lead_synth(level: u32, duration: f64, volume: f32) -> Vec<Voice> {
    let lvl = level as f32;
    let note = duration / LEAD.len() as f64;
    let peak = volume * (0.06 + lvl * 0.003);

    LEAD.iter()
        .enumerate()
        .map(|(i, &freq)| {
            let t = i as f64 * note;
            Voice::oscillator(Waveform::Sawtooth, t, t + note)
                .freq(A::set(freq, t))
                .filter(
                    Filter::new(FilterKind::LowPass)
                        .freq(A::set(freq, t))
                        .freq(A::linear(freq * 3.0, t + note))
                        .q(8.0 + lvl),
                )
                .gain(A::set(0.0, t))
                .gain(A::linear(peak, t + 0.05))
                .gain(A::exp(0.001, t + note))
        })
        .collect()
}

/// Three detuned sawtooths per bass note through the waveshaper
pub fn distortion_layer(level: u32, duration: f64, volume: f32) -> Vec<Voice> {
    let lvl = level as f32;
    let note = duration / 4.0;
    let peak = volume * (0.03 + lvl * 0.001);
    let mut voices = Vec::with_capacity(DISTORTION_NOTES.len() * 3);

    for (i, &freq) in DISTORTION_NOTES.iter().enumerate() {
        let t = i as f64 * note;
        for detune in [-5.0, 0.0, 5.0] {
            voices.push(
                Voice::oscillator(Waveform::Sawtooth, t, t + note)
                    .freq(A::set(freq + detune, t))
                    .shaper(level)
                    .gain(A::set(0.0, t))
                    .gain(A::linear(peak, t + 0.1))
                    .gain(A::exp(peak * 0.3, t + note)),
            );
        }
    }
    voices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::voice::Source;
    use proptest::prelude::*;

    fn count(voices: &[Voice], pred: impl Fn(&Voice) -> bool) -> usize {
        voices.iter().filter(|v| pred(v)).count()
    }

    #[test]
    fn test_cycle_duration() {
        assert_eq!(cycle_duration(1), 16.0);
        assert!((cycle_duration(3) - 16.0 / 1.2).abs() < 1e-9);
        assert!(cycle_duration(10) < cycle_duration(9));
    }

    #[test]
    fn test_layers_by_level() {
        let shaped = |v: &Voice| v.shaper.is_some();

        let l1 = compose_cycle(1, 0.3);
        assert_eq!(count(&l1.voices, shaped), 0);
        assert_eq!(lead_synth(1, 16.0, 0.3).len(), 8);

        let l4 = compose_cycle(4, 0.3);
        let l3 = compose_cycle(3, 0.3);
        assert!(l4.voices.len() > l3.voices.len() + LEAD.len() - 1);

        let l7 = compose_cycle(7, 0.3);
        assert_eq!(count(&l7.voices, shaped), 12);
    }

    #[test]
    fn test_bass_brightens() {
        assert_eq!(bass_line(1, 16.0, 0.3)[0].waveform(), Some(Waveform::Sawtooth));
        assert_eq!(bass_line(7, 16.0, 0.3)[0].waveform(), Some(Waveform::Sawtooth));
        assert_eq!(bass_line(8, 16.0, 0.3)[0].waveform(), Some(Waveform::Square));
    }

    #[test]
    fn test_melody_extends() {
        assert_eq!(melody(2, 16.0, 0.3).len(), 9);
        assert_eq!(melody(3, 16.0, 0.3).len(), 10);
        assert_eq!(melody(9, 16.0, 0.3).len(), 13);
        assert_eq!(melody(4, 16.0, 0.3)[0].waveform(), Some(Waveform::Square));
        assert_eq!(melody(5, 16.0, 0.3)[0].waveform(), Some(Waveform::Sawtooth));
    }

    #[test]
    fn test_percussion_pattern() {
        let is_kick = |v: &Voice| v.waveform() == Some(Waveform::Sine);
        let is_snare = |v: &Voice| matches!(v.source, Source::Noise { samples: 2048, .. });

        // Level 1: 10 beats, kicks every 4th, no snare
        let l1 = percussion(1, 16.0, 0.3);
        assert_eq!(count(&l1, is_kick), 3);
        assert_eq!(count(&l1, is_snare), 0);

        // Level 2: 12 beats, kicks every 2nd, snare on beat 4
        let l2 = percussion(2, 16.0, 0.3);
        assert_eq!(count(&l2, is_kick), 6);
        assert_eq!(count(&l2, is_snare), 1);
    }

    #[test]
    fn test_beat_count_caps() {
        assert_eq!(beat_count(1), 10);
        assert_eq!(beat_count(12), 32);
        assert_eq!(beat_count(50), MAX_BEATS);
    }

    #[test]
    fn test_arpeggio_second_half() {
        let voices = arpeggio(1, 16.0, 0.3);
        assert_eq!(voices.len(), 16);
        assert!(voices.iter().all(|v| v.start >= 8.0 && v.stop <= 16.0 + 1e-9));
        assert_eq!(arpeggio(5, 16.0, 0.3).len(), 20);
        assert_eq!(arpeggio(9, 16.0, 0.3).len(), 28);
    }

    proptest! {
        #[test]
        fn prop_voices_fit_in_cycle(level in 1u32..40) {
            let cycle = compose_cycle(level, 0.3);
            for v in &cycle.voices {
                prop_assert!(v.start >= 0.0);
                prop_assert!(v.start < cycle.duration);
                prop_assert!(v.stop > v.start);
                prop_assert!(v.stop <= cycle.duration + KICK_SECS + 1e-9);

                // Tonal layers end on the cycle boundary; only drum hits ring over
                let tonal = matches!(v.waveform(), Some(w) if w != Waveform::Sine);
                if tonal {
                    prop_assert!(v.stop <= cycle.duration + 1e-9);
                }
            }
        }

        #[test]
        fn prop_layer_volume_rises_with_level(level in 1u32..30) {
            let lo = bass_line(level, 16.0, 0.3)[0].peak_gain();
            let hi = bass_line(level + 1, 16.0, 0.3)[0].peak_gain();
            prop_assert!(hi > lo);
        }
    }
}
