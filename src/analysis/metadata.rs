//! Run metadata structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conditions worth surfacing to the caller
///
/// None of these fail the run; the output is still produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutotuneFlag {
    /// No frame was voiced, so the output is silent
    NoVoicedFrames,
    /// Voiced frames exist but no pitch marks were placed
    NoPitchMarks,
    /// Fewer than a quarter of the frames are voiced
    SparseVoicing,
    /// Output peak exceeds full scale (unnormalized overlap-add)
    OutputClipping,
}

impl fmt::Display for AutotuneFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AutotuneFlag::NoVoicedFrames => "no voiced frames detected; output is silent",
            AutotuneFlag::NoPitchMarks => "no pitch marks placed",
            AutotuneFlag::SparseVoicing => "less than 25% of frames are voiced",
            AutotuneFlag::OutputClipping => "output exceeds full scale",
        };
        f.write_str(text)
    }
}

/// Metadata describing one pitch-correction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutotuneMetadata {
    /// Input duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,

    /// Number of analysis frames
    pub n_frames: usize,

    /// Number of voiced analysis frames
    pub voiced_frames: usize,

    /// Number of pitch marks placed on the source
    pub pitch_marks: usize,

    /// Target scale, e.g. `"C [0, 2, 3, 5, 7, 8, 10]"`
    pub scale: String,

    /// Crate version that produced the result
    pub algorithm_version: String,

    /// Flags raised during the run
    pub flags: Vec<AutotuneFlag>,

    /// Human-readable form of `flags`
    pub warnings: Vec<String>,
}

impl Default for AutotuneMetadata {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: 0,
            processing_time_ms: 0.0,
            n_frames: 0,
            voiced_frames: 0,
            pitch_marks: 0,
            scale: String::new(),
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            flags: vec![],
            warnings: vec![],
        }
    }
}

impl AutotuneMetadata {
    /// Record a flag and its warning text (each flag at most once)
    pub fn flag(&mut self, flag: AutotuneFlag) {
        if !self.flags.contains(&flag) {
            log::warn!("{}", flag);
            self.flags.push(flag);
            self.warnings.push(flag.to_string());
        }
    }

    /// Fraction of voiced frames
    pub fn voiced_ratio(&self) -> f32 {
        if self.n_frames == 0 {
            0.0
        } else {
            self.voiced_frames as f32 / self.n_frames as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_once() {
        let mut metadata = AutotuneMetadata::default();
        metadata.flag(AutotuneFlag::NoPitchMarks);
        metadata.flag(AutotuneFlag::NoPitchMarks);
        assert_eq!(metadata.flags, vec![AutotuneFlag::NoPitchMarks]);
        assert_eq!(metadata.warnings, vec!["no pitch marks placed".to_string()]);
    }

    #[test]
    fn test_voiced_ratio() {
        let metadata = AutotuneMetadata {
            n_frames: 8,
            voiced_frames: 2,
            ..AutotuneMetadata::default()
        };
        assert!((metadata.voiced_ratio() - 0.25).abs() < 1e-6);
        assert_eq!(AutotuneMetadata::default().voiced_ratio(), 0.0);
        assert_eq!(
            AutotuneMetadata::default().algorithm_version,
            env!("CARGO_PKG_VERSION")
        );
    }
}
