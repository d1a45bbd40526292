//! Backend-neutral synthesis descriptions
//!
//! A [`Voice`] is one scheduled sound source: an oscillator or a noise burst,
//! optionally routed through a filter and a waveshaper, into a gain envelope.
//! All times are offsets in seconds from the moment the voice set is started.

use std::f32::consts::PI;

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One step of a parameter automation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Automation {
    Set { value: f32, at: f64 },
    LinearTo { value: f32, at: f64 },
    ExponentialTo { value: f32, at: f64 },
}

impl Automation {
    pub fn set(value: f32, at: f64) -> Self {
        Automation::Set { value, at }
    }

    pub fn linear(value: f32, at: f64) -> Self {
        Automation::LinearTo { value, at }
    }

    pub fn exp(value: f32, at: f64) -> Self {
        Automation::ExponentialTo { value, at }
    }

    pub fn value(&self) -> f32 {
        match *self {
            Automation::Set { value, .. }
            | Automation::LinearTo { value, .. }
            | Automation::ExponentialTo { value, .. } => value,
        }
    }

    pub fn at(&self) -> f64 {
        match *self {
            Automation::Set { at, .. }
            | Automation::LinearTo { at, .. }
            | Automation::ExponentialTo { at, .. } => at,
        }
    }
}

/// Sound source of a voice
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Oscillator {
        waveform: Waveform,
        frequency: Vec<Automation>,
    },
    /// Mono white noise buffer of `samples` frames scaled by `amplitude`
    Noise { samples: u32, amplitude: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
}

/// Biquad filter stage
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub kind: FilterKind,
    pub frequency: Vec<Automation>,
    /// Resonance, applied at the voice start
    pub q: Option<f32>,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            frequency: Vec::new(),
            q: None,
        }
    }

    pub fn freq(mut self, step: Automation) -> Self {
        self.frequency.push(step);
        self
    }

    pub fn q(mut self, q: f32) -> Self {
        self.q = Some(q);
        self
    }
}

/// Waveshaper stage using [`distortion_curve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shaper {
    pub level: u32,
    pub samples: usize,
}

/// A single scheduled sound source
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub source: Source,
    pub filter: Option<Filter>,
    pub shaper: Option<Shaper>,
    pub gain: Vec<Automation>,
    pub start: f64,
    pub stop: f64,
}

impl Voice {
    pub fn oscillator(waveform: Waveform, start: f64, stop: f64) -> Self {
        Self::with_source(
            Source::Oscillator {
                waveform,
                frequency: Vec::new(),
            },
            start,
            stop,
        )
    }

    pub fn noise(samples: u32, amplitude: f32, start: f64, stop: f64) -> Self {
        Self::with_source(Source::Noise { samples, amplitude }, start, stop)
    }

    fn with_source(source: Source, start: f64, stop: f64) -> Self {
        debug_assert!(stop >= start, "voice stops before it starts");
        Self {
            source,
            filter: None,
            shaper: None,
            gain: Vec::new(),
            start,
            stop,
        }
    }

    /// Add an oscillator frequency step (no effect on noise)
    pub fn freq(mut self, step: Automation) -> Self {
        if let Source::Oscillator { frequency, .. } = &mut self.source {
            frequency.push(step);
        }
        self
    }

    pub fn gain(mut self, step: Automation) -> Self {
        self.gain.push(step);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn shaper(mut self, level: u32) -> Self {
        self.shaper = Some(Shaper {
            level,
            samples: DISTORTION_SAMPLES,
        });
        self
    }

    pub fn waveform(&self) -> Option<Waveform> {
        match &self.source {
            Source::Oscillator { waveform, .. } => Some(*waveform),
            Source::Noise { .. } => None,
        }
    }

    /// Starting frequency, if this is an oscillator
    pub fn base_frequency(&self) -> Option<f32> {
        match &self.source {
            Source::Oscillator { frequency, .. } => frequency.first().map(Automation::value),
            Source::Noise { .. } => None,
        }
    }

    /// Highest gain the envelope reaches
    pub fn peak_gain(&self) -> f32 {
        self.gain.iter().map(Automation::value).fold(0.0, f32::max)
    }
}

/// Length of a waveshaper curve
pub const DISTORTION_SAMPLES: usize = 44_100;

/// Odd-symmetric soft-clipping curve; harder as `level` rises
pub fn distortion_curve(level: u32, samples: usize) -> Vec<f32> {
    let deg = PI / 180.0;
    let level = level as f32;
    let drive = (3.0 + level) * 20.0 * deg;

    (0..samples)
        .map(|i| {
            let x = (i as f32 * 2.0) / samples as f32 - 1.0;
            drive * x * 57.0 * deg / (PI + level * x.abs())
        })
        .collect()
}
