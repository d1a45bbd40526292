//! One-shot sound effect recipes

use super::voice::{Automation as A, Filter, FilterKind, Voice, Waveform};

/// Named one-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Filtered sawtooth rumble
    Explosion,
    /// Rising square sweep
    PowerUp,
    /// Low sawtooth buzz
    Damage,
    /// Soft sine swell
    Shield,
    /// C-E-G triangle arpeggio
    LevelUp,
    /// Long falling triangle
    GameOver,
    /// Short square thud
    Asteroid,
}

impl Cue {
    pub const ALL: [Cue; 7] = [
        Cue::Explosion,
        Cue::PowerUp,
        Cue::Damage,
        Cue::Shield,
        Cue::LevelUp,
        Cue::GameOver,
        Cue::Asteroid,
    ];

    /// Build the voices for this cue at master `volume`
    pub fn voices(self, volume: f32) -> Vec<Voice> {
        match self {
            Cue::Explosion => {
                let d = 0.3;
                vec![
                    Voice::oscillator(Waveform::Sawtooth, 0.0, d)
                        .freq(A::set(150.0, 0.0))
                        .freq(A::exp(50.0, d))
                        .filter(
                            Filter::new(FilterKind::LowPass)
                                .freq(A::set(800.0, 0.0))
                                .freq(A::exp(100.0, d)),
                        )
                        .gain(A::set(volume, 0.0))
                        .gain(A::exp(0.01, d)),
                ]
            }
            Cue::PowerUp => sweep(Waveform::Square, 200.0, Sweep::Exp(800.0), 0.4, volume * 0.5),
            Cue::Damage => sweep(Waveform::Sawtooth, 100.0, Sweep::Linear(50.0), 0.2, volume * 0.7),
            Cue::Shield => sweep(Waveform::Sine, 400.0, Sweep::Linear(600.0), 0.5, volume * 0.4),
            Cue::LevelUp => [(261.63, 0.0, 0.3), (329.63, 0.1, 0.3), (392.0, 0.2, 0.4)]
                .into_iter()
                .map(|(freq, delay, d)| {
                    Voice::oscillator(Waveform::Triangle, delay, delay + d)
                        .freq(A::set(freq, delay))
                        .gain(A::set(0.0, delay))
                        .gain(A::linear(volume * 0.3, delay + 0.01))
                        .gain(A::exp(0.01, delay + d))
                })
                .collect(),
            Cue::GameOver => sweep(Waveform::Triangle, 300.0, Sweep::Exp(80.0), 1.0, volume * 0.6),
            Cue::Asteroid => sweep(Waveform::Square, 120.0, Sweep::Linear(60.0), 0.15, volume * 0.4),
        }
    }
}

enum Sweep {
    Linear(f32),
    Exp(f32),
}

/// Single oscillator with a frequency sweep and a decaying envelope
fn sweep(waveform: Waveform, from: f32, to: Sweep, duration: f64, peak: f32) -> Vec<Voice> {
    let end = match to {
        Sweep::Linear(f) => A::linear(f, duration),
        Sweep::Exp(f) => A::exp(f, duration),
    };
    vec![
        Voice::oscillator(waveform, 0.0, duration)
            .freq(A::set(from, 0.0))
            .freq(end)
            .gain(A::set(peak, 0.0))
            .gain(A::exp(0.01, duration)),
    ]
}
