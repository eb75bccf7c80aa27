//! Frame-parallel pitch tracking
//!
//! Runs difference → CMND → period selection → band filter on every frame.
//! Frames are independent, so they are analyzed on the rayon pool and collected
//! back in frame order. Cancellation is checked once per frame.

use super::difference::DifferenceEngine;
use super::period::{reject_octave_jumps, PeriodEstimator};
use super::{PitchEstimate, PitchTrack};
use crate::cancel::{self, CancellationToken};
use crate::config::AutotuneConfig;
use crate::error::AutotuneError;
use crate::preprocessing::framing::FrameSegmenter;
use crate::preprocessing::silence::SilenceGate;
use rayon::prelude::*;

/// Builds a [`PitchTrack`] from a mono buffer
#[derive(Debug)]
pub struct PitchTrackAssembler {
    segmenter: FrameSegmenter,
    engine: DifferenceEngine,
    estimator: PeriodEstimator,
    fmin: f32,
    fmax: f32,
    silence_gate: Option<SilenceGate>,
    octave_guard: bool,
    sample_rate: u32,
}

impl PitchTrackAssembler {
    /// Create an assembler for a sample rate
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if the configuration is invalid or
    /// the sample rate is zero.
    pub fn new(config: &AutotuneConfig, sample_rate: u32) -> Result<Self, AutotuneError> {
        config.validate()?;
        if sample_rate == 0 {
            return Err(AutotuneError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        Ok(Self {
            segmenter: FrameSegmenter::from_config(config)?,
            engine: DifferenceEngine::from_config(config, sample_rate)?,
            estimator: PeriodEstimator::from_config(config, sample_rate),
            fmin: config.fmin,
            fmax: config.fmax,
            silence_gate: config.silence_gate.map(SilenceGate::new),
            octave_guard: config.octave_guard,
            sample_rate,
        })
    }

    /// Analyze a single frame
    pub fn analyze_frame(&self, frame: &[f32]) -> PitchEstimate {
        let cmnd = self.engine.cmnd(frame);
        let estimate = self.estimator.estimate(&cmnd);
        apply_band(estimate, self.fmin, self.fmax)
    }

    /// Track pitch over a whole buffer
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InsufficientSamples` if the buffer is shorter than
    /// one frame, and `AutotuneError::Cancelled` if the token fires.
    pub fn assemble(
        &self,
        samples: &[f32],
        cancel: Option<&CancellationToken>,
    ) -> Result<PitchTrack, AutotuneError> {
        let n_frames = self.segmenter.n_frames(samples.len())?;

        log::debug!(
            "Tracking pitch: {} samples, {} frames, tau_max={}, method={:?}",
            samples.len(),
            n_frames,
            self.engine.tau_max(),
            self.engine.method()
        );

        let gate = self
            .silence_gate
            .map(|gate| (gate, gate.threshold_for(samples)));

        let mut estimates = (0..n_frames)
            .into_par_iter()
            .map(|i| {
                cancel::check(cancel)?;
                let frame = self.segmenter.frame(samples, i);
                if let Some((gate, threshold)) = gate {
                    if gate.is_silent(frame, threshold) {
                        return Ok(PitchEstimate::Unvoiced);
                    }
                }
                Ok(self.analyze_frame(frame))
            })
            .collect::<Result<Vec<_>, AutotuneError>>()?;

        // Depends on the previous frame, so it runs after the parallel pass
        if self.octave_guard {
            let rejected = reject_octave_jumps(&mut estimates);
            log::debug!("Octave guard: {} frames rejected", rejected);
        }

        let track = PitchTrack::new(estimates, self.segmenter.hop_length(), self.sample_rate);
        log::debug!(
            "Pitch track: {}/{} voiced frames",
            track.voiced_count(),
            track.len()
        );

        Ok(track)
    }
}

/// Reject voiced estimates outside `[fmin, fmax]`
pub fn apply_band(estimate: PitchEstimate, fmin: f32, fmax: f32) -> PitchEstimate {
    match estimate {
        PitchEstimate::Voiced { frequency, .. } if frequency < fmin || frequency > fmax => {
            PitchEstimate::Unvoiced
        }
        other => other,
    }
}
