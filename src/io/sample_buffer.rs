//! Mono sample buffer

use crate::error::AutotuneError;

/// Immutable mono audio plus its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap mono samples
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if the sample rate is zero.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AutotuneError> {
        if sample_rate == 0 {
            return Err(AutotuneError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Wrap interleaved samples, accepting single-channel material only
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidChannelCount` unless `channels == 1`.
    pub fn from_interleaved(
        samples: Vec<f32>,
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self, AutotuneError> {
        if channels != 1 {
            return Err(AutotuneError::InvalidChannelCount(channels));
        }
        Self::new(samples, sample_rate)
    }

    /// Zero-filled buffer of the given length
    pub fn silence(len: usize, sample_rate: u32) -> Result<Self, AutotuneError> {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Sample data
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Peak absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    /// Take ownership of the samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_buffer() {
        let buffer = SampleBuffer::new(vec![0.0, 0.5, -1.0, 0.25], 4).unwrap();
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.sample_rate(), 4);
        assert!((buffer.duration_seconds() - 1.0).abs() < 1e-6);
        assert_eq!(buffer.peak(), 1.0);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(matches!(
            SampleBuffer::new(vec![0.0], 0),
            Err(AutotuneError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_interleaved_requires_mono() {
        assert!(SampleBuffer::from_interleaved(vec![0.0; 8], 1, 44100).is_ok());
        assert_eq!(
            SampleBuffer::from_interleaved(vec![0.0; 8], 2, 44100),
            Err(AutotuneError::InvalidChannelCount(2))
        );
        assert_eq!(
            SampleBuffer::from_interleaved(vec![], 0, 44100),
            Err(AutotuneError::InvalidChannelCount(0))
        );
    }

    #[test]
    fn test_silence() {
        let buffer = SampleBuffer::silence(16, 8000).unwrap();
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer.peak(), 0.0);
        assert_eq!(buffer.into_samples(), vec![0.0; 16]);
    }
}
