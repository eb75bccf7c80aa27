//! RMS silence gate
//!
//! Frames whose RMS falls below `ratio * global_rms + 1e-6` are reported
//! unvoiced without running YIN. The small absolute floor keeps an all-zero
//! buffer gated even though its global RMS is zero.

/// Absolute floor added to the relative threshold
const RMS_FLOOR: f32 = 1e-6;

/// Silence gate configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceGate {
    /// Threshold relative to the global RMS (the original engine used 0.02)
    pub ratio: f32,
}

impl Default for SilenceGate {
    fn default() -> Self {
        Self { ratio: 0.02 }
    }
}

impl SilenceGate {
    /// Gate with the given ratio
    pub fn new(ratio: f32) -> Self {
        Self { ratio }
    }

    /// Absolute RMS threshold for a whole buffer
    pub fn threshold_for(&self, samples: &[f32]) -> f32 {
        frame_rms(samples) * self.ratio + RMS_FLOOR
    }

    /// Whether a frame falls below the threshold
    pub fn is_silent(&self, frame: &[f32], threshold: f32) -> bool {
        frame_rms(frame) < threshold
    }
}

/// Root-mean-square level of a frame (0.0 for an empty frame)
pub fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum_sq / frame.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rms() {
        assert_eq!(frame_rms(&[]), 0.0);
        assert!((frame_rms(&[1.0; 100]) - 1.0).abs() < 1e-6);
        assert!((frame_rms(&[3.0, -3.0]) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_gate_threshold() {
        let gate = SilenceGate::default();
        let loud = vec![0.5f32; 1000];
        let threshold = gate.threshold_for(&loud);
        assert!((threshold - (0.5 * 0.02 + 1e-6)).abs() < 1e-6);

        assert!(gate.is_silent(&[0.001; 64], threshold));
        assert!(!gate.is_silent(&[0.2; 64], threshold));
    }

    #[test]
    fn test_silent_buffer_is_gated() {
        let gate = SilenceGate::default();
        let silent = vec![0.0f32; 512];
        let threshold = gate.threshold_for(&silent);
        assert!(gate.is_silent(&silent, threshold));
    }
}
