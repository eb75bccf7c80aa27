//! Configuration parameters for pitch correction
//!
//! One immutable [`AutotuneConfig`] is shared by every pipeline stage, so frame,
//! hop and band settings are defined in exactly one place.

use crate::error::AutotuneError;
use crate::features::pitch::difference::DifferenceMethod;
use crate::features::scale::ScaleDefinition;

/// Pitch-correction configuration parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AutotuneConfig {
    // Framing
    /// Analysis and synthesis frame length in samples (default: 2048)
    pub frame_length: usize,

    /// Hop between analysis frames in samples (default: frame_length / 4 = 512)
    pub hop_length: usize,

    // Pitch tracking
    /// Lowest accepted fundamental in Hz (default: 65.0, about C2)
    pub fmin: f32,

    /// Highest accepted fundamental in Hz (default: 2093.0, about C7)
    pub fmax: f32,

    /// CMND acceptance ceiling (default: 0.1)
    /// Lower values are stricter and report more frames as unvoiced
    pub threshold: f32,

    /// Difference function method (default: Direct)
    pub difference_method: DifferenceMethod,

    /// Silence gate ratio relative to the global RMS (default: None = disabled)
    /// Frames quieter than `ratio * global_rms` are reported unvoiced without analysis
    pub silence_gate: Option<f32>,

    /// Unvoice frames whose pitch jumps outside `[0.7, 1.5]` times the previous
    /// voiced frame (default: false)
    pub octave_guard: bool,

    // Correction
    /// Target scale (default: C natural minor)
    pub scale: ScaleDefinition,

    /// Median smoothing window in frames, odd (default: 11)
    pub median_window: usize,

    // Resynthesis
    /// Divide the overlap-add output by the accumulated window weight (default: false)
    pub normalize_overlap: bool,
}

impl Default for AutotuneConfig {
    fn default() -> Self {
        let frame_length = 2048;
        Self {
            frame_length,
            hop_length: frame_length / 4,
            fmin: 65.0,
            fmax: 2093.0,
            threshold: 0.1,
            difference_method: DifferenceMethod::Direct,
            silence_gate: None,
            octave_guard: false,
            scale: ScaleDefinition::default(),
            median_window: 11,
            normalize_overlap: false,
        }
    }
}

impl AutotuneConfig {
    /// Default configuration with a different frame length
    ///
    /// The hop follows the frame length (`frame_length / 4`, at least 1).
    pub fn with_frame_length(frame_length: usize) -> Self {
        Self {
            frame_length,
            hop_length: (frame_length / 4).max(1),
            ..Self::default()
        }
    }

    /// Default configuration targeting a different scale
    pub fn with_scale(scale: ScaleDefinition) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Largest YIN lag for a sample rate: `min(ceil(sample_rate / fmin), frame_length)`
    pub fn tau_max(&self, sample_rate: u32) -> usize {
        let tau = (sample_rate as f32 / self.fmin).ceil() as usize;
        tau.min(self.frame_length)
    }

    /// Check all parameters
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` for inconsistent framing, band or
    /// threshold settings, and `AutotuneError::InvalidScale` for a malformed scale.
    pub fn validate(&self) -> Result<(), AutotuneError> {
        if self.frame_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Frame length must be > 0".to_string(),
            ));
        }

        if self.hop_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Hop length must be > 0".to_string(),
            ));
        }

        if self.hop_length > self.frame_length {
            return Err(AutotuneError::InvalidInput(format!(
                "Hop length ({}) must not exceed frame length ({})",
                self.hop_length, self.frame_length
            )));
        }

        if !(self.fmin > 0.0 && self.fmax > self.fmin && self.fmax.is_finite()) {
            return Err(AutotuneError::InvalidInput(format!(
                "Invalid frequency band: [{:.1}, {:.1}] Hz",
                self.fmin, self.fmax
            )));
        }

        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(AutotuneError::InvalidInput(format!(
                "Threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }

        if self.median_window == 0 || self.median_window % 2 == 0 {
            return Err(AutotuneError::InvalidInput(format!(
                "Median window must be odd, got {}",
                self.median_window
            )));
        }

        if let Some(ratio) = self.silence_gate {
            if !(ratio >= 0.0 && ratio.is_finite()) {
                return Err(AutotuneError::InvalidInput(format!(
                    "Silence gate ratio must be non-negative, got {}",
                    ratio
                )));
            }
        }

        self.scale.validate()
    }
}
