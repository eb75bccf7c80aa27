//! Period selection from the CMND curve
//!
//! Picks the FIRST local minimum of `d'` that falls below the threshold, refines
//! it with parabolic interpolation and converts the refined lag to a frequency.
//! Earlier (shorter-lag) candidates win over deeper later ones, which keeps the
//! tracker from jumping down an octave.

use super::PitchEstimate;
use crate::config::AutotuneConfig;

const EPSILON: f64 = 1e-6;

/// YIN period estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodEstimator {
    threshold: f32,
    sample_rate: u32,
}

impl PeriodEstimator {
    /// Create an estimator
    ///
    /// # Arguments
    ///
    /// * `threshold` - CMND acceptance ceiling (typically 0.1)
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(threshold: f32, sample_rate: u32) -> Self {
        Self {
            threshold,
            sample_rate,
        }
    }

    /// Estimator with the configured threshold
    pub fn from_config(config: &AutotuneConfig, sample_rate: u32) -> Self {
        Self::new(config.threshold, sample_rate)
    }

    /// Estimate pitch from one CMND curve
    ///
    /// Returns `Unvoiced` when no local minimum lies below the threshold.
    /// Confidence is `1 - d'` at the refined minimum, clamped to `[0, 1]`.
    pub fn estimate(&self, cmnd: &[f32]) -> PitchEstimate {
        let tau = match first_local_minimum(cmnd, self.threshold) {
            Some(tau) => tau,
            None => return PitchEstimate::Unvoiced,
        };

        let (peak_pos, peak_val) = parabolic_interpolation(cmnd, tau);
        if peak_pos <= 0.0 || self.sample_rate == 0 {
            return PitchEstimate::Unvoiced;
        }

        let frequency = self.sample_rate as f32 / peak_pos;
        PitchEstimate::voiced(frequency, 1.0 - peak_val)
    }
}

/// First lag `τ ∈ [1, len - 2]` with `d'(τ) < threshold` that is a local minimum
///
/// A local minimum satisfies `d'(τ-1) > d'(τ) < d'(τ+1)`.
pub fn first_local_minimum(cmnd: &[f32], threshold: f32) -> Option<usize> {
    if cmnd.len() < 3 {
        return None;
    }

    (1..cmnd.len() - 1).find(|&tau| {
        let value = cmnd[tau];
        value < threshold && cmnd[tau - 1] > value && value < cmnd[tau + 1]
    })
}

/// Parabolic refinement of a minimum at `index`
///
/// Fits a parabola through `(index-1, a)`, `(index, b)`, `(index+1, c)` and
/// returns `(peak_pos, peak_val)`:
///
/// ```text
/// peak_pos = index + 0.5·(a - c) / (a - 2b + c)
/// peak_val = b - 0.25·(a - c)·(peak_pos - index)
/// ```
///
/// Returns `(index, values[index])` unrefined at either boundary or when the
/// three points are collinear.
pub fn parabolic_interpolation(values: &[f32], index: usize) -> (f32, f32) {
    if index >= values.len() {
        return (index as f32, 0.0);
    }
    if index == 0 || index + 1 >= values.len() {
        return (index as f32, values[index]);
    }

    let a = values[index - 1] as f64;
    let b = values[index] as f64;
    let c = values[index + 1] as f64;
    let denom = a - 2.0 * b + c;

    if denom.abs() < EPSILON {
        return (index as f32, values[index]);
    }

    let offset = 0.5 * (a - c) / denom;
    let peak_pos = index as f64 + offset;
    let peak_val = b - 0.25 * (a - c) * offset;
    (peak_pos as f32, peak_val as f32)
}

/// Accepted ratio range between consecutive voiced estimates (inclusive)
pub const OCTAVE_GUARD_RANGE: (f32, f32) = (0.7, 1.5);

/// Unvoice estimates that jump too far from the previous voiced frame
///
/// Walks the track in frame order. A voiced frame whose frequency ratio to the
/// previous voiced frame falls outside [`OCTAVE_GUARD_RANGE`] becomes `Unvoiced`.
/// Rejected and unvoiced frames clear the reference, so the next voiced frame is
/// always accepted.
///
/// Returns the number of rejected frames.
pub fn reject_octave_jumps(estimates: &mut [PitchEstimate]) -> usize {
    let (low, high) = OCTAVE_GUARD_RANGE;
    let mut previous: Option<f32> = None;
    let mut rejected = 0;

    for estimate in estimates.iter_mut() {
        let frequency = estimate.voiced_frequency();
        let jumped = match (frequency, previous) {
            (Some(f), Some(reference)) => !(low..=high).contains(&(f / reference)),
            _ => false,
        };
        if jumped {
            *estimate = PitchEstimate::Unvoiced;
            rejected += 1;
            previous = None;
        } else {
            previous = frequency;
        }
    }

    rejected
}
