//! Correction confidence scoring
//!
//! Summarizes how trustworthy a correction is and how far it moved the pitch.
//!
//! # Components
//!
//! 1. **Voiced ratio**: fraction of frames with a pitch estimate
//! 2. **Mean confidence**: average YIN confidence over voiced frames
//! 3. **Correction size**: mean and maximum absolute shift in cents
//! 4. **Overall confidence**: mean confidence scaled by voicing coverage

use crate::features::pitch::PitchTrack;
use crate::features::scale::midi;
use serde::{Deserialize, Serialize};

/// Correction confidence scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfidence {
    /// Fraction of voiced source frames (0.0-1.0)
    pub voiced_ratio: f32,

    /// Mean YIN confidence over voiced source frames (0.0-1.0)
    pub mean_confidence: f32,

    /// Mean absolute source-to-target shift in cents
    pub mean_correction_cents: f32,

    /// Largest absolute source-to-target shift in cents
    pub max_correction_cents: f32,

    /// Overall confidence: `mean_confidence · min(1, 2 · voiced_ratio)`
    ///
    /// Tracks with at least half of their frames voiced are not penalized.
    pub overall_confidence: f32,
}

/// Compare a source track with its corrected target
///
/// Frames count toward the correction size only when both tracks are voiced.
pub fn compute_confidence(source: &PitchTrack, target: &PitchTrack) -> CorrectionConfidence {
    let n_frames = source.len();
    let voiced: Vec<f32> = source
        .iter()
        .filter(|e| e.is_voiced())
        .map(|e| e.confidence())
        .collect();

    let voiced_ratio = if n_frames == 0 {
        0.0
    } else {
        voiced.len() as f32 / n_frames as f32
    };
    let mean_confidence = if voiced.is_empty() {
        0.0
    } else {
        voiced.iter().sum::<f32>() / voiced.len() as f32
    };

    let shifts: Vec<f32> = source
        .iter()
        .zip(target.iter())
        .filter_map(|(s, t)| match (s.voiced_frequency(), t.voiced_frequency()) {
            (Some(fs), Some(ft)) if fs > 0.0 && ft > 0.0 => Some(
                ((midi::hz_to_midi(ft as f64) - midi::hz_to_midi(fs as f64)) * 100.0).abs() as f32,
            ),
            _ => None,
        })
        .collect();

    let mean_correction_cents = if shifts.is_empty() {
        0.0
    } else {
        shifts.iter().sum::<f32>() / shifts.len() as f32
    };
    let max_correction_cents = shifts.iter().copied().fold(0.0f32, f32::max);

    let overall_confidence = (mean_confidence * (2.0 * voiced_ratio).min(1.0)).clamp(0.0, 1.0);

    log::debug!(
        "Correction confidence: voiced={:.2}, mean={:.3}, shift={:.1}c (max {:.1}), overall={:.3}",
        voiced_ratio,
        mean_confidence,
        mean_correction_cents,
        max_correction_cents,
        overall_confidence
    );

    CorrectionConfidence {
        voiced_ratio,
        mean_confidence,
        mean_correction_cents,
        max_correction_cents,
        overall_confidence,
    }
}

impl CorrectionConfidence {
    /// Check if overall confidence is high (>= 0.7)
    pub fn is_high_confidence(&self) -> bool {
        self.overall_confidence >= 0.7
    }

    /// Check if overall confidence is low (< 0.5)
    pub fn is_low_confidence(&self) -> bool {
        self.overall_confidence < 0.5
    }
}
