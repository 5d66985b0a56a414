//! Sound and vibration cues for game events.
//!
//! The engine only tags a snapshot with a [`SoundEvent`]; this module turns
//! the tag into concrete cues and hands them to a [`FeedbackSink`].
//! Synthesis and vibration hardware are up to the sink.

use derive_new::new;
use tiktac_rules::SoundEvent;
use tracing::{info, instrument};

/// Amplitude value meaning "device default".
pub const DEFAULT_AMPLITUDE: Option<u8> = None;

/// Shape of one tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// Pure tone at the given frequency.
    Sine(f32),
    /// White noise with a quadratic decay.
    Noise,
}

/// A tone scheduled relative to the start of its cue.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Tone {
    /// Offset from the start of the cue.
    pub start_ms: u64,
    /// Tone shape.
    pub waveform: Waveform,
    /// Length of the tone.
    pub duration_ms: u64,
}

/// A vibration pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vibration {
    /// Single pulse.
    OneShot {
        /// Pulse length.
        duration_ms: u64,
        /// Strength 0-255, or the device default.
        amplitude: Option<u8>,
    },
    /// Alternating off/on segments.
    Waveform {
        /// Segment lengths.
        timings_ms: Vec<u64>,
        /// Strength per segment.
        amplitudes: Vec<u8>,
    },
}

/// Everything to play for one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cue {
    /// Tones, ordered by start.
    pub tones: Vec<Tone>,
    /// Vibration, if any.
    pub vibration: Option<Vibration>,
}

impl Cue {
    /// Cue for `event`, with sound and haptic parts dropped when disabled.
    pub fn for_event(event: SoundEvent, sound_enabled: bool, haptics_enabled: bool) -> Self {
        Self {
            tones: if sound_enabled { tones(event) } else { Vec::new() },
            vibration: if haptics_enabled { vibration(event) } else { None },
        }
    }

    /// True when there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.tones.is_empty() && self.vibration.is_none()
    }
}

fn tones(event: SoundEvent) -> Vec<Tone> {
    use Waveform::{Noise, Sine};
    match event {
        SoundEvent::Move => vec![Tone::new(0, Sine(440.0), 100)],
        SoundEvent::Pop => vec![Tone::new(0, Sine(600.0), 50)],
        // C5, E5, G5
        SoundEvent::Win => vec![
            Tone::new(0, Sine(523.25), 100),
            Tone::new(100, Sine(659.25), 100),
            Tone::new(200, Sine(783.99), 200),
        ],
        SoundEvent::Lose => vec![
            Tone::new(0, Sine(300.0), 300),
            Tone::new(300, Sine(200.0), 400),
        ],
        SoundEvent::Bomb => vec![Tone::new(0, Noise, 500)],
        SoundEvent::Draw => Vec::new(),
    }
}

fn vibration(event: SoundEvent) -> Option<Vibration> {
    match event {
        SoundEvent::Move => Some(Vibration::OneShot {
            duration_ms: 20,
            amplitude: DEFAULT_AMPLITUDE,
        }),
        SoundEvent::Bomb => Some(Vibration::OneShot {
            duration_ms: 300,
            amplitude: Some(255),
        }),
        SoundEvent::Win => Some(Vibration::Waveform {
            timings_ms: vec![0, 100, 100, 100, 100, 300],
            amplitudes: vec![0, 255, 0, 255, 0, 200],
        }),
        SoundEvent::Lose | SoundEvent::Draw | SoundEvent::Pop => None,
    }
}

/// Receives cues. Playback is fire-and-forget and must not block.
pub trait FeedbackSink: Send + Sync {
    /// Plays a cue.
    fn play(&self, event: SoundEvent, cue: &Cue);
}

/// Sink that only logs cues.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    #[instrument(skip(self, cue))]
    fn play(&self, event: SoundEvent, cue: &Cue) {
        info!(
            tones = cue.tones.len(),
            vibration = cue.vibration.is_some(),
            "Feedback cue"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_cue() {
        let cue = Cue::for_event(SoundEvent::Move, true, true);
        assert_eq!(cue.tones, vec![Tone::new(0, Waveform::Sine(440.0), 100)]);
        assert_eq!(
            cue.vibration,
            Some(Vibration::OneShot {
                duration_ms: 20,
                amplitude: None
            })
        );
    }

    #[test]
    fn test_win_arpeggio_rises() {
        let cue = Cue::for_event(SoundEvent::Win, true, false);
        let freqs: Vec<f32> = cue
            .tones
            .iter()
            .map(|t| match t.waveform {
                Waveform::Sine(f) => f,
                Waveform::Noise => 0.0,
            })
            .collect();
        assert_eq!(freqs, vec![523.25, 659.25, 783.99]);
        assert!(cue.vibration.is_none());
    }

    #[test]
    fn test_toggles_drop_parts() {
        let silent = Cue::for_event(SoundEvent::Bomb, false, true);
        assert!(silent.tones.is_empty());
        assert!(silent.vibration.is_some());

        assert!(Cue::for_event(SoundEvent::Bomb, false, false).is_empty());
        assert!(Cue::for_event(SoundEvent::Draw, true, true).is_empty());
    }

    #[test]
    fn test_lose_slides_down() {
        let cue = Cue::for_event(SoundEvent::Lose, true, true);
        assert_eq!(cue.tones.len(), 2);
        assert_eq!(cue.tones[1].start_ms, 300);
        assert!(cue.vibration.is_none());
    }
}
