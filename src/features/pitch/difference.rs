//! YIN difference function and cumulative mean normalization
//!
//! For a frame `x` of length `L` and lags `τ ∈ [0, tau_max)`:
//!
//! ```text
//! d(τ)    = Σ_{j=0}^{L-1-τ} (x[j] - x[j+τ])²
//! d'(0)   = 1
//! d'(τ)   = d(τ) · τ / Σ_{k=1}^{τ} d(k)      (1.0 when the running sum is 0)
//! ```
//!
//! Two interchangeable methods compute `d`:
//! - **Direct**: the O(L · tau_max) double loop
//! - **Fft**: `d(τ) = e₁(τ) + e₂(τ) - 2·r(τ)` where `r` is the autocorrelation
//!   obtained as `IFFT(|FFT(x)|²)` (Wiener–Khinchin) and `e₁`, `e₂` are windowed
//!   energies from prefix sums of `x²`
//!
//! Both agree to within floating-point tolerance. FFT plans are built once per
//! engine and shared across worker threads.
//!
//! # Reference
//!
//! de Cheveigné, A., & Kawahara, H. (2002). YIN, a fundamental frequency
//! estimator for speech and music. *JASA*, 111(4), 1917-1930.

use crate::config::AutotuneConfig;
use crate::error::AutotuneError;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How the difference function is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DifferenceMethod {
    /// Direct double loop
    #[default]
    Direct,
    /// FFT autocorrelation with energy prefix sums
    Fft,
}

/// Precomputed forward/inverse plans for one frame length
struct FftPlans {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl FftPlans {
    fn new(frame_length: usize) -> Self {
        let size = (2 * frame_length).next_power_of_two();
        let mut planner = FftPlanner::<f64>::new();
        Self {
            size,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }
}

/// Difference-function calculator for frames of a fixed length
///
/// The engine is immutable after construction and is shared by reference
/// across rayon workers.
pub struct DifferenceEngine {
    frame_length: usize,
    tau_max: usize,
    method: DifferenceMethod,
    plans: Option<FftPlans>,
}

impl fmt::Debug for DifferenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DifferenceEngine")
            .field("frame_length", &self.frame_length)
            .field("tau_max", &self.tau_max)
            .field("method", &self.method)
            .field("fft_size", &self.plans.as_ref().map(|p| p.size))
            .finish()
    }
}

impl DifferenceEngine {
    /// Create an engine
    ///
    /// # Arguments
    ///
    /// * `frame_length` - Number of samples per analysis frame
    /// * `tau_max` - Number of lags to compute (clamped to `frame_length`)
    /// * `method` - Direct or FFT computation
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if `frame_length` or `tau_max` is zero.
    pub fn new(
        frame_length: usize,
        tau_max: usize,
        method: DifferenceMethod,
    ) -> Result<Self, AutotuneError> {
        if frame_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Frame length must be > 0".to_string(),
            ));
        }
        if tau_max == 0 {
            return Err(AutotuneError::InvalidInput(
                "Maximum lag must be > 0".to_string(),
            ));
        }

        let plans = match method {
            DifferenceMethod::Direct => None,
            DifferenceMethod::Fft => Some(FftPlans::new(frame_length)),
        };

        Ok(Self {
            frame_length,
            tau_max: tau_max.min(frame_length),
            method,
            plans,
        })
    }

    /// Engine for the configured frame length, band and method
    pub fn from_config(config: &AutotuneConfig, sample_rate: u32) -> Result<Self, AutotuneError> {
        Self::new(
            config.frame_length,
            config.tau_max(sample_rate),
            config.difference_method,
        )
    }

    /// Number of lags produced per frame
    pub fn tau_max(&self) -> usize {
        self.tau_max
    }

    /// Configured method
    pub fn method(&self) -> DifferenceMethod {
        self.method
    }

    /// Difference function `d(τ)` for `τ ∈ [0, tau_max)`
    ///
    /// Frames shorter than the planned length are handled with the direct
    /// method; the number of lags never exceeds the frame length.
    pub fn difference(&self, frame: &[f32]) -> Vec<f32> {
        let tau_max = self.tau_max.min(frame.len());
        match &self.plans {
            Some(plans) if frame.len() == self.frame_length => {
                difference_fft(frame, tau_max, plans)
            }
            _ => difference_direct(frame, tau_max),
        }
    }

    /// Cumulative mean normalized difference `d'(τ)` for one frame
    pub fn cmnd(&self, frame: &[f32]) -> Vec<f32> {
        cumulative_mean_normalized_difference(&self.difference(frame))
    }
}

/// Direct difference function
pub fn difference_direct(frame: &[f32], tau_max: usize) -> Vec<f32> {
    let n = frame.len();
    let tau_max = tau_max.min(n);
    let mut d = vec![0.0f32; tau_max];

    for (tau, value) in d.iter_mut().enumerate().skip(1) {
        let mut sum = 0.0f64;
        for j in 0..(n - tau) {
            let delta = frame[j] as f64 - frame[j + tau] as f64;
            sum += delta * delta;
        }
        *value = sum as f32;
    }

    d
}

fn difference_fft(frame: &[f32], tau_max: usize, plans: &FftPlans) -> Vec<f32> {
    let n = frame.len();

    let mut buffer: Vec<Complex<f64>> = frame
        .iter()
        .map(|&x| Complex::new(x as f64, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(plans.size)
        .collect();

    plans.forward.process(&mut buffer);
    for bin in buffer.iter_mut() {
        *bin = Complex::new(bin.norm_sqr(), 0.0);
    }
    plans.inverse.process(&mut buffer);

    // rustfft does not normalize the inverse transform
    let scale = 1.0 / plans.size as f64;

    // prefix[k] = Σ_{j<k} x[j]²
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &x in frame {
        acc += x as f64 * x as f64;
        prefix.push(acc);
    }

    let mut d = vec![0.0f32; tau_max];
    for (tau, value) in d.iter_mut().enumerate().skip(1) {
        let e1 = prefix[n - tau];
        let e2 = prefix[n] - prefix[tau];
        let r = buffer[tau].re * scale;
        *value = (e1 + e2 - 2.0 * r).max(0.0) as f32;
    }

    d
}

/// Cumulative mean normalized difference
///
/// `cmnd[0] = 1`; every later lag is `d(τ) · τ / Σ_{k=1}^{τ} d(k)`, or 1.0 while
/// the running sum is still zero (e.g. a silent frame).
pub fn cumulative_mean_normalized_difference(d: &[f32]) -> Vec<f32> {
    let mut cmnd = vec![1.0f32; d.len()];
    let mut running_sum = 0.0f64;

    for tau in 1..d.len() {
        running_sum += d[tau] as f64;
        cmnd[tau] = if running_sum > 0.0 {
            (d[tau] as f64 * tau as f64 / running_sum) as f32
        } else {
            1.0
        };
    }

    cmnd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signal(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 / 44100.0;
                0.6 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * 661.0 * t).sin()
                    + 0.1 * ((i * 7919 % 101) as f32 / 101.0 - 0.5)
            })
            .collect()
    }

    #[test]
    fn test_difference_hand_computed() {
        let d = difference_direct(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(d, vec![0.0, 3.0, 8.0]);
    }

    #[test]
    fn test_cmnd_first_lag_is_one() {
        let d = difference_direct(&test_signal(512), 200);
        let cmnd = cumulative_mean_normalized_difference(&d);
        assert_eq!(cmnd[0], 1.0);
        assert!(cmnd.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_cmnd_hand_computed() {
        // d = [0, 3, 8] -> d'(1) = 3*1/3 = 1, d'(2) = 8*2/11
        let cmnd = cumulative_mean_normalized_difference(&[0.0, 3.0, 8.0]);
        assert_eq!(cmnd[1], 1.0);
        assert!((cmnd[2] - 16.0 / 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_silent_frame_is_all_ones() {
        let engine = DifferenceEngine::new(256, 128, DifferenceMethod::Direct).unwrap();
        let cmnd = engine.cmnd(&[0.0; 256]);
        assert_eq!(cmnd.len(), 128);
        assert!(cmnd.iter().all(|&v| v == 1.0));

        let engine = DifferenceEngine::new(256, 128, DifferenceMethod::Fft).unwrap();
        let cmnd = engine.cmnd(&[0.0; 256]);
        assert!(cmnd.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_fft_matches_direct() {
        let frame = test_signal(1024);
        let direct = DifferenceEngine::new(1024, 400, DifferenceMethod::Direct).unwrap();
        let fft = DifferenceEngine::new(1024, 400, DifferenceMethod::Fft).unwrap();

        let d_direct = direct.difference(&frame);
        let d_fft = fft.difference(&frame);
        assert_eq!(d_direct.len(), d_fft.len());

        let energy: f32 = frame.iter().map(|x| x * x).sum();
        for (tau, (a, b)) in d_direct.iter().zip(d_fft.iter()).enumerate() {
            assert!(
                (a - b).abs() <= 1e-4 * energy.max(1.0),
                "lag {}: direct {} vs fft {}",
                tau,
                a,
                b
            );
        }
    }

    #[test]
    fn test_tau_max_clamped_to_frame() {
        let engine = DifferenceEngine::new(64, 1000, DifferenceMethod::Fft).unwrap();
        assert_eq!(engine.tau_max(), 64);
        assert_eq!(engine.difference(&test_signal(64)).len(), 64);

        // Shorter frame falls back to the direct method
        assert_eq!(engine.difference(&test_signal(32)).len(), 32);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(DifferenceEngine::new(0, 10, DifferenceMethod::Direct).is_err());
        assert!(DifferenceEngine::new(10, 0, DifferenceMethod::Direct).is_err());
    }
}
