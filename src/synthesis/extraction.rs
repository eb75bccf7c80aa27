//! Windowed grain extraction around pitch marks

use crate::cancel::{self, CancellationToken};
use crate::error::AutotuneError;
use rayon::prelude::*;

/// Symmetric Hann window: `w[n] = 0.5 - 0.5·cos(2πn / (L - 1))`
///
/// A length-1 window is `[1.0]`.
pub fn hann_window(length: usize) -> Vec<f32> {
    if length == 1 {
        return vec![1.0];
    }
    let denom = (length.saturating_sub(1)) as f64;
    (0..length)
        .map(|n| (0.5 - 0.5 * (2.0 * std::f64::consts::PI * n as f64 / denom).cos()) as f32)
        .collect()
}

/// Cuts Hann-tapered frames centred on pitch marks
#[derive(Debug, Clone, PartialEq)]
pub struct FrameExtractor {
    frame_length: usize,
    window: Vec<f32>,
}

impl FrameExtractor {
    /// Create an extractor for a fixed frame length
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if `frame_length` is zero.
    pub fn new(frame_length: usize) -> Result<Self, AutotuneError> {
        if frame_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Frame length must be > 0".to_string(),
            ));
        }
        Ok(Self {
            frame_length,
            window: hann_window(frame_length),
        })
    }

    /// Frame length in samples
    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// The analysis window
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Extract the frame covering `[mark - L/2, mark - L/2 + L)`
    ///
    /// Samples outside the signal read as zero.
    pub fn extract(&self, samples: &[f32], mark: usize) -> Vec<f32> {
        let offset = mark as isize - (self.frame_length / 2) as isize;
        self.window
            .iter()
            .enumerate()
            .map(|(k, &w)| {
                let idx = offset + k as isize;
                if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize] * w
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Extract one frame per mark, in mark order
    ///
    /// Frames are independent and extracted on the rayon pool.
    pub fn extract_all(
        &self,
        samples: &[f32],
        marks: &[usize],
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Vec<f32>>, AutotuneError> {
        log::debug!(
            "Extracting {} frames of {} samples",
            marks.len(),
            self.frame_length
        );

        marks
            .par_iter()
            .map(|&mark| {
                cancel::check(cancel)?;
                Ok::<_, AutotuneError>(self.extract(samples, mark))
            })
            .collect()
    }
}
