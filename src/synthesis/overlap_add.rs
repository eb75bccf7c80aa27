//! Overlap-add resynthesis
//!
//! Adds each windowed frame into a zeroed output, centred on its synthesis
//! mark and clipped to the output bounds. The merge is single-threaded; only
//! this stage writes to the output buffer.
//!
//! Without normalization the output amplitude scales with the local overlap
//! factor. With `normalize_overlap` the Hann weights are accumulated alongside
//! the samples and every position with weight above [`WEIGHT_FLOOR`] is divided
//! by its weight.

use super::extraction::hann_window;
use crate::cancel::{self, CancellationToken};
use crate::config::AutotuneConfig;
use crate::error::AutotuneError;

/// Minimum accumulated window weight for normalization
pub const WEIGHT_FLOOR: f32 = 1e-3;

/// Overlap-add merger
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapAddSynthesizer {
    frame_length: usize,
    normalize: bool,
    window: Vec<f32>,
}

impl OverlapAddSynthesizer {
    /// Create a synthesizer for frames of `frame_length` samples
    pub fn new(frame_length: usize, normalize: bool) -> Result<Self, AutotuneError> {
        if frame_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Frame length must be > 0".to_string(),
            ));
        }
        Ok(Self {
            frame_length,
            normalize,
            window: hann_window(frame_length),
        })
    }

    /// Synthesizer using the configured frame length and normalization flag
    pub fn from_config(config: &AutotuneConfig) -> Result<Self, AutotuneError> {
        Self::new(config.frame_length, config.normalize_overlap)
    }

    /// Merge frames into an output of `output_len` samples
    ///
    /// Frame `k` is placed so that its centre lands on `marks[k]`.
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if the frame and mark counts differ,
    /// or a frame has the wrong length, and `AutotuneError::Cancelled` if the
    /// token fires between frames.
    pub fn synthesize(
        &self,
        frames: &[Vec<f32>],
        marks: &[usize],
        output_len: usize,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<f32>, AutotuneError> {
        if frames.len() != marks.len() {
            return Err(AutotuneError::InvalidInput(format!(
                "Frame count ({}) does not match mark count ({})",
                frames.len(),
                marks.len()
            )));
        }

        let mut output = vec![0.0f32; output_len];
        let mut weights = if self.normalize {
            vec![0.0f32; output_len]
        } else {
            Vec::new()
        };

        let half = (self.frame_length / 2) as isize;
        for (frame, &mark) in frames.iter().zip(marks) {
            cancel::check(cancel)?;

            if frame.len() != self.frame_length {
                return Err(AutotuneError::InvalidInput(format!(
                    "Frame length {} does not match expected {}",
                    frame.len(),
                    self.frame_length
                )));
            }

            let offset = mark as isize - half;
            let first = (-offset).max(0) as usize;
            let last = (output_len as isize - offset).clamp(0, self.frame_length as isize) as usize;

            for k in first..last {
                let idx = (offset + k as isize) as usize;
                output[idx] += frame[k];
                if self.normalize {
                    weights[idx] += self.window[k];
                }
            }
        }

        if self.normalize {
            for (sample, &weight) in output.iter_mut().zip(&weights) {
                if weight > WEIGHT_FLOOR {
                    *sample /= weight;
                }
            }
        }

        log::debug!(
            "Overlap-add: {} frames into {} samples (normalize={})",
            frames.len(),
            output_len,
            self.normalize
        );

        Ok(output)
    }
}
