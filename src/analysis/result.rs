//! Pitch-correction result types

use super::confidence::{compute_confidence, CorrectionConfidence};
use super::metadata::AutotuneMetadata;
use crate::features::pitch::PitchTrack;
use crate::io::sample_buffer::SampleBuffer;
use serde::Serialize;

/// Complete pitch-correction result
///
/// Serializes everything except the sample payload.
#[derive(Debug, Clone, Serialize)]
pub struct AutotuneResult {
    /// Corrected audio (same length and sample rate as the input)
    #[serde(skip)]
    pub output: SampleBuffer,

    /// Detected pitch of the input
    pub source_track: PitchTrack,

    /// Scale-corrected, smoothed target pitch
    pub target_track: PitchTrack,

    /// Run metadata
    pub metadata: AutotuneMetadata,
}

impl AutotuneResult {
    /// Confidence summary comparing the source and target tracks
    pub fn confidence(&self) -> CorrectionConfidence {
        compute_confidence(&self.source_track, &self.target_track)
    }

    /// Per-frame `(time_seconds, source_hz, target_hz)`, 0 Hz where unvoiced
    pub fn pitch_curve(&self) -> Vec<(f32, f32, f32)> {
        self.source_track
            .iter()
            .zip(self.target_track.iter())
            .enumerate()
            .map(|(i, (s, t))| {
                (
                    self.source_track.frame_time_seconds(i),
                    s.frequency(),
                    t.frequency(),
                )
            })
            .collect()
    }
}
