//! Pitch tracking modules
//!
//! YIN fundamental-frequency estimation, one estimate per analysis frame:
//! - Difference function and cumulative mean normalized difference
//! - Period selection with parabolic refinement
//! - Frame-parallel track assembly

pub mod difference;
pub mod period;
pub mod tracker;

use crate::features::scale::midi;
use serde::{Deserialize, Serialize};

/// Pitch estimate for a single analysis frame
///
/// `Unvoiced` replaces the "frequency 0" sentinel: no frequency arithmetic can be
/// done on a frame without a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PitchEstimate {
    /// Periodic frame
    Voiced {
        /// Fundamental frequency in Hz
        frequency: f32,
        /// Detection confidence (0.0-1.0)
        confidence: f32,
    },
    /// Silent, noisy or out-of-band frame
    #[default]
    Unvoiced,
}

impl PitchEstimate {
    /// Voiced estimate with confidence clamped to `[0, 1]`
    pub fn voiced(frequency: f32, confidence: f32) -> Self {
        PitchEstimate::Voiced {
            frequency,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Whether a pitch was detected
    pub fn is_voiced(&self) -> bool {
        matches!(self, PitchEstimate::Voiced { .. })
    }

    /// Frequency in Hz, 0.0 when unvoiced
    pub fn frequency(&self) -> f32 {
        match self {
            PitchEstimate::Voiced { frequency, .. } => *frequency,
            PitchEstimate::Unvoiced => 0.0,
        }
    }

    /// Confidence, 0.0 when unvoiced
    pub fn confidence(&self) -> f32 {
        match self {
            PitchEstimate::Voiced { confidence, .. } => *confidence,
            PitchEstimate::Unvoiced => 0.0,
        }
    }

    /// Frequency if voiced
    pub fn voiced_frequency(&self) -> Option<f32> {
        match self {
            PitchEstimate::Voiced { frequency, .. } => Some(*frequency),
            PitchEstimate::Unvoiced => None,
        }
    }

    /// Nearest note name (e.g. `"A4"`), if voiced
    pub fn note_name(&self) -> Option<String> {
        let frequency = self.voiced_frequency()?;
        let note = midi::hz_to_midi(frequency as f64).round();
        if (0.0..=127.0).contains(&note) {
            Some(midi::note_name(note as u8))
        } else {
            None
        }
    }
}

/// Ordered pitch estimates, one per analysis frame
///
/// Frame `i` starts at sample `i * hop_length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchTrack {
    estimates: Vec<PitchEstimate>,
    hop_length: usize,
    sample_rate: u32,
}

impl PitchTrack {
    /// Create a track from frame-ordered estimates
    pub fn new(estimates: Vec<PitchEstimate>, hop_length: usize, sample_rate: u32) -> Self {
        Self {
            estimates,
            hop_length,
            sample_rate,
        }
    }

    /// Same framing, different estimates
    pub fn with_estimates(&self, estimates: Vec<PitchEstimate>) -> Self {
        Self::new(estimates, self.hop_length, self.sample_rate)
    }

    /// All estimates in frame order
    pub fn estimates(&self) -> &[PitchEstimate] {
        &self.estimates
    }

    /// Estimate for one frame
    pub fn get(&self, frame_index: usize) -> Option<&PitchEstimate> {
        self.estimates.get(frame_index)
    }

    /// Iterate estimates in frame order
    pub fn iter(&self) -> std::slice::Iter<'_, PitchEstimate> {
        self.estimates.iter()
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// Whether the track has no frames
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Hop between frames in samples
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Sample rate of the analysed signal
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start time of a frame in seconds
    pub fn frame_time_seconds(&self, frame_index: usize) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (frame_index * self.hop_length) as f32 / self.sample_rate as f32
    }

    /// Frequencies with 0.0 for unvoiced frames
    pub fn frequencies(&self) -> Vec<f32> {
        self.estimates.iter().map(PitchEstimate::frequency).collect()
    }

    /// Voiced flags
    pub fn voiced_flags(&self) -> Vec<bool> {
        self.estimates.iter().map(PitchEstimate::is_voiced).collect()
    }

    /// Confidences with 0.0 for unvoiced frames
    pub fn confidences(&self) -> Vec<f32> {
        self.estimates.iter().map(PitchEstimate::confidence).collect()
    }

    /// Number of voiced frames
    pub fn voiced_count(&self) -> usize {
        self.estimates.iter().filter(|e| e.is_voiced()).count()
    }
}

impl<'a> IntoIterator for &'a PitchTrack {
    type Item = &'a PitchEstimate;
    type IntoIter = std::slice::Iter<'a, PitchEstimate>;

    fn into_iter(self) -> Self::IntoIter {
        self.estimates.iter()
    }
}
