//! Error types for the pitch-correction engine

use std::fmt;

/// Errors that can occur while correcting a buffer
///
/// Only structural misconfiguration is fatal. Per-frame numeric degeneracies
/// (silent frames, zero source frequency) are absorbed by the stages and show up
/// as unvoiced or identity results instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AutotuneError {
    /// Invalid input parameters
    InvalidInput(String),

    /// Source material is not single-channel
    InvalidChannelCount(usize),

    /// Buffer shorter than one analysis frame
    InsufficientSamples {
        /// Samples available in the buffer
        available: usize,
        /// Samples needed for a single frame
        required: usize,
    },

    /// Unrecognized tonic or scale-degree set
    InvalidScale(String),

    /// Audio decoding error
    DecodingError(String),

    /// Audio encoding error
    EncodingError(String),

    /// Processing error during correction
    ProcessingError(String),

    /// Processing was cancelled between frames
    Cancelled,
}

impl fmt::Display for AutotuneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutotuneError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AutotuneError::InvalidChannelCount(channels) => {
                write!(f, "Invalid channel count: expected mono, got {} channels", channels)
            }
            AutotuneError::InsufficientSamples { available, required } => write!(
                f,
                "Insufficient samples: {} available, at least {} required",
                available, required
            ),
            AutotuneError::InvalidScale(msg) => write!(f, "Invalid scale: {}", msg),
            AutotuneError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AutotuneError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            AutotuneError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            AutotuneError::Cancelled => write!(f, "Processing cancelled"),
        }
    }
}

impl std::error::Error for AutotuneError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AutotuneError::InsufficientSamples {
            available: 100,
            required: 2048,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient samples: 100 available, at least 2048 required"
        );
        assert!(AutotuneError::InvalidChannelCount(2).to_string().contains("2 channels"));
        assert_eq!(AutotuneError::Cancelled.to_string(), "Processing cancelled");
    }
}
