//! Fixed-length, fixed-hop framing
//!
//! Slices a buffer into overlapping analysis windows. Frames that would run past
//! the end of the buffer are not produced (no tail zero-padding).
//!
//! # Example
//!
//! ```
//! use stratum_autotune::preprocessing::framing::FrameSegmenter;
//!
//! let segmenter = FrameSegmenter::new(2048, 512)?;
//! let samples = vec![0.0f32; 44100];
//! assert_eq!(segmenter.n_frames(samples.len())?, 83);
//! assert_eq!(segmenter.frame(&samples, 1).len(), 2048);
//! # Ok::<(), stratum_autotune::AutotuneError>(())
//! ```

use crate::config::AutotuneConfig;
use crate::error::AutotuneError;

/// Frame/hop segmentation of a sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSegmenter {
    frame_length: usize,
    hop_length: usize,
}

impl FrameSegmenter {
    /// Create a segmenter
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if either length is zero.
    pub fn new(frame_length: usize, hop_length: usize) -> Result<Self, AutotuneError> {
        if frame_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Frame length must be > 0".to_string(),
            ));
        }
        if hop_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Hop length must be > 0".to_string(),
            ));
        }
        Ok(Self {
            frame_length,
            hop_length,
        })
    }

    /// Segmenter using the configured frame and hop lengths
    pub fn from_config(config: &AutotuneConfig) -> Result<Self, AutotuneError> {
        Self::new(config.frame_length, config.hop_length)
    }

    /// Frame length in samples
    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Hop length in samples
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Number of complete frames in a buffer of `len` samples
    ///
    /// `1 + floor((len - frame_length) / hop_length)`
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InsufficientSamples` if `len < frame_length`.
    pub fn n_frames(&self, len: usize) -> Result<usize, AutotuneError> {
        if len < self.frame_length {
            return Err(AutotuneError::InsufficientSamples {
                available: len,
                required: self.frame_length,
            });
        }
        Ok(1 + (len - self.frame_length) / self.hop_length)
    }

    /// First sample of a frame
    pub fn frame_start(&self, frame_index: usize) -> usize {
        frame_index * self.hop_length
    }

    /// Frame containing a sample, clamped to the last of `n_frames` frames
    pub fn frame_of_sample(&self, sample: usize, n_frames: usize) -> usize {
        (sample / self.hop_length).min(n_frames.saturating_sub(1))
    }

    /// Borrowed view of one frame
    ///
    /// Callers index within `0..n_frames(samples.len())`; the view is truncated
    /// if the frame runs past the buffer.
    pub fn frame<'a>(&self, samples: &'a [f32], frame_index: usize) -> &'a [f32] {
        let start = self.frame_start(frame_index).min(samples.len());
        let end = (start + self.frame_length).min(samples.len());
        &samples[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        let segmenter = FrameSegmenter::new(2048, 512).unwrap();
        assert_eq!(segmenter.n_frames(2048).unwrap(), 1);
        assert_eq!(segmenter.n_frames(2559).unwrap(), 1);
        assert_eq!(segmenter.n_frames(2560).unwrap(), 2);
        assert_eq!(segmenter.n_frames(44100).unwrap(), 83);
    }

    #[test]
    fn test_insufficient_samples() {
        let segmenter = FrameSegmenter::new(2048, 512).unwrap();
        assert_eq!(
            segmenter.n_frames(100),
            Err(AutotuneError::InsufficientSamples {
                available: 100,
                required: 2048
            })
        );
    }

    #[test]
    fn test_zero_lengths_rejected() {
        assert!(FrameSegmenter::new(0, 512).is_err());
        assert!(FrameSegmenter::new(2048, 0).is_err());
    }

    #[test]
    fn test_frames_overlap_and_stay_in_bounds() {
        let samples: Vec<f32> = (0..20).map(|i| i as f32).collect();
        let segmenter = FrameSegmenter::new(8, 4).unwrap();
        let n_frames = segmenter.n_frames(samples.len()).unwrap();
        let frames: Vec<&[f32]> = (0..n_frames).map(|i| segmenter.frame(&samples, i)).collect();

        // 1 + (20 - 8) / 4 = 4
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[1][0], 4.0);
        assert_eq!(frames[3], &samples[12..20]);
        assert!(frames.iter().all(|f| f.len() == 8));
    }

    #[test]
    fn test_frame_of_sample_clamps() {
        let segmenter = FrameSegmenter::new(8, 4).unwrap();
        assert_eq!(segmenter.frame_of_sample(0, 4), 0);
        assert_eq!(segmenter.frame_of_sample(9, 4), 2);
        assert_eq!(segmenter.frame_of_sample(19, 4), 3);
    }
}
