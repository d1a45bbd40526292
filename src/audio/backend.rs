//! Audio output backends
//!
//! [`AudioOut`] turns [`Voice`] descriptions into sound. The browser build
//! uses [`WebAudioOut`]; tests use [`RecordingOut`].

use super::voice::Voice;

/// A started voice that can be cut short
pub trait PlayingVoice {
    fn stop(&self);
}

/// Sink that schedules voices against its own clock
pub trait AudioOut {
    /// Current audio clock time in seconds
    fn now(&self) -> f64;

    /// Resume output if the platform suspended it
    fn wake(&self);

    /// Schedule `voice` with its offsets relative to `at`
    fn start_voice(&mut self, voice: &Voice, at: f64) -> Option<Box<dyn PlayingVoice>>;
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioOut;

#[cfg(target_arch = "wasm32")]
mod web {
    use js_sys::{Float32Array, Reflect};
    use wasm_bindgen::JsValue;
    use web_sys::{
        AudioContext, AudioContextState, AudioNode, AudioParam, AudioScheduledSourceNode,
        BiquadFilterType, OscillatorType,
    };

    use super::{AudioOut, PlayingVoice};
    use crate::audio::voice::{
        Automation, Filter, FilterKind, Shaper, Source, Voice, Waveform, distortion_curve,
    };

    /// Web Audio API output
    pub struct WebAudioOut {
        ctx: AudioContext,
    }

    impl WebAudioOut {
        /// Create the audio context; `None` when the browser refuses
        pub fn new() -> Option<Self> {
            match AudioContext::new() {
                Ok(ctx) => Some(Self { ctx }),
                Err(e) => {
                    log::warn!("Failed to create AudioContext - audio disabled: {e:?}");
                    None
                }
            }
        }

        fn source(&self, source: &Source, at: f64) -> Option<AudioScheduledSourceNode> {
            match source {
                Source::Oscillator {
                    waveform,
                    frequency,
                } => {
                    let osc = self.ctx.create_oscillator().ok()?;
                    osc.set_type(match waveform {
                        Waveform::Sine => OscillatorType::Sine,
                        Waveform::Square => OscillatorType::Square,
                        Waveform::Sawtooth => OscillatorType::Sawtooth,
                        Waveform::Triangle => OscillatorType::Triangle,
                    });
                    automate(&osc.frequency(), frequency, at);
                    Some(osc.into())
                }
                Source::Noise { samples, amplitude } => {
                    let rate = self.ctx.sample_rate();
                    let buffer = self.ctx.create_buffer(1, *samples, rate).ok()?;
                    let mut data: Vec<f32> = (0..*samples)
                        .map(|_| (rand::random::<f32>() * 2.0 - 1.0) * amplitude)
                        .collect();
                    buffer.copy_to_channel(&mut data, 0).ok()?;

                    let node = self.ctx.create_buffer_source().ok()?;
                    node.set_buffer(Some(&buffer));
                    Some(node.into())
                }
            }
        }

        fn filter(&self, filter: &Filter, at: f64) -> Option<AudioNode> {
            let node = self.ctx.create_biquad_filter().ok()?;
            node.set_type(match filter.kind {
                FilterKind::LowPass => BiquadFilterType::Lowpass,
                FilterKind::HighPass => BiquadFilterType::Highpass,
                FilterKind::BandPass => BiquadFilterType::Bandpass,
            });
            automate(&node.frequency(), &filter.frequency, at);
            if let Some(q) = filter.q {
                let start = filter.frequency.first().map_or(0.0, Automation::at);
                node.q().set_value_at_time(q, at + start).ok();
            }
            Some(node.into())
        }

        fn shaper(&self, shaper: &Shaper) -> Option<AudioNode> {
            let node = self.ctx.create_wave_shaper().ok()?;
            let curve = distortion_curve(shaper.level, shaper.samples);
            let curve = Float32Array::from(curve.as_slice());
            Reflect::set(&node, &JsValue::from_str("curve"), &curve).ok()?;
            Reflect::set(&node, &JsValue::from_str("oversample"), &JsValue::from_str("4x")).ok()?;
            Some(node.into())
        }
    }

    impl AudioOut for WebAudioOut {
        fn now(&self) -> f64 {
            self.ctx.current_time()
        }

        fn wake(&self) {
            // Browsers keep the context suspended until a user gesture
            if self.ctx.state() == AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
        }

        fn start_voice(&mut self, voice: &Voice, at: f64) -> Option<Box<dyn PlayingVoice>> {
            let source = self.source(&voice.source, at)?;
            let gain = self.ctx.create_gain().ok()?;
            automate(&gain.gain(), &voice.gain, at);

            // source -> [filter] -> [shaper] -> gain -> destination
            let mut tail: AudioNode = source.clone().into();
            if let Some(filter) = &voice.filter {
                let node = self.filter(filter, at)?;
                tail.connect_with_audio_node(&node).ok()?;
                tail = node;
            }
            if let Some(shaper) = &voice.shaper {
                let node = self.shaper(shaper)?;
                tail.connect_with_audio_node(&node).ok()?;
                tail = node;
            }
            tail.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            source.start_with_when(at + voice.start).ok()?;
            source.stop_with_when(at + voice.stop).ok();

            Some(Box::new(WebVoice(source)))
        }
    }

    fn automate(param: &AudioParam, steps: &[Automation], at: f64) {
        for step in steps {
            let _ = match *step {
                Automation::Set { value, at: t } => param.set_value_at_time(value, at + t),
                Automation::LinearTo { value, at: t } => {
                    param.linear_ramp_to_value_at_time(value, at + t)
                }
                Automation::ExponentialTo { value, at: t } => {
                    param.exponential_ramp_to_value_at_time(value, at + t)
                }
            };
        }
    }

    struct WebVoice(AudioScheduledSourceNode);

    impl PlayingVoice for WebVoice {
        fn stop(&self) {
            // Already-finished sources throw; nothing to do then
            let _ = self.0.stop();
        }
    }
}

#[cfg(test)]
pub use recording::{Recorded, RecordingOut};

#[cfg(test)]
mod recording {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{AudioOut, PlayingVoice};
    use crate::audio::voice::Voice;

    /// Everything a [`RecordingOut`] was asked to do
    #[derive(Debug, Default)]
    pub struct Recorded {
        pub started: Vec<(Voice, f64)>,
        pub stopped: usize,
        pub wakes: usize,
    }

    /// Test backend with a hand-driven clock
    #[derive(Clone, Default)]
    pub struct RecordingOut {
        pub log: Rc<RefCell<Recorded>>,
        pub clock: Rc<RefCell<f64>>,
    }

    impl RecordingOut {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn started(&self) -> usize {
            self.log.borrow().started.len()
        }

        pub fn stopped(&self) -> usize {
            self.log.borrow().stopped
        }

        pub fn set_clock(&self, now: f64) {
            *self.clock.borrow_mut() = now;
        }
    }

    struct RecordedVoice(Rc<RefCell<Recorded>>);

    impl PlayingVoice for RecordedVoice {
        fn stop(&self) {
            self.0.borrow_mut().stopped += 1;
        }
    }

    impl AudioOut for RecordingOut {
        fn now(&self) -> f64 {
            *self.clock.borrow()
        }

        fn wake(&self) {
            self.log.borrow_mut().wakes += 1;
        }

        fn start_voice(&mut self, voice: &Voice, at: f64) -> Option<Box<dyn PlayingVoice>> {
            self.log.borrow_mut().started.push((voice.clone(), at));
            Some(Box::new(RecordedVoice(Rc::clone(&self.log))))
        }
    }
}
