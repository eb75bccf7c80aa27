//! PSOLA resynthesis
//!
//! Pitch-Synchronous Overlap-and-Add moves the fundamental of a voiced signal
//! without resampling:
//!
//! 1. [`pitch_marks`]: one mark per source period, on waveform peaks
//! 2. [`extraction`]: a Hann-tapered grain around every mark
//! 3. [`time_warp`]: marks respaced to the target period
//! 4. [`overlap_add`]: grains summed at the respaced marks
//!
//! # Reference
//!
//! Moulines, E., & Charpentier, F. (1990). Pitch-synchronous waveform processing
//! techniques for text-to-speech synthesis using diphones. *Speech Communication*,
//! 9(5-6), 453-467.

pub mod extraction;
pub mod overlap_add;
pub mod pitch_marks;
pub mod time_warp;

use crate::cancel::CancellationToken;
use crate::config::AutotuneConfig;
use crate::error::AutotuneError;
use crate::features::pitch::PitchTrack;

use extraction::FrameExtractor;
use overlap_add::OverlapAddSynthesizer;
use pitch_marks::PitchMarker;
use time_warp::TimeWarper;

/// PSOLA output plus the marks that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PsolaOutput {
    /// Resynthesized samples (same length as the input)
    pub output: Vec<f32>,

    /// Pitch marks on the source signal
    pub source_marks: Vec<usize>,

    /// Respaced marks used for overlap-add
    pub synthesis_marks: Vec<usize>,
}

/// Shift a signal from the `source` contour to the `target` contour
///
/// # Arguments
///
/// * `samples` - Mono input signal
/// * `sample_rate` - Sample rate in Hz
/// * `source` - Detected pitch track of `samples`
/// * `target` - Desired pitch track (same length as `source`)
/// * `config` - Frame/hop lengths and overlap normalization
/// * `cancel` - Optional cancellation token, checked between frames
///
/// # Errors
///
/// Returns `AutotuneError::InvalidInput` if the tracks differ in length and
/// `AutotuneError::Cancelled` if the token fires.
///
/// # Example
///
/// ```
/// use stratum_autotune::synthesis::psola;
/// use stratum_autotune::{AutotuneConfig, PitchEstimate, PitchTrack};
///
/// let config = AutotuneConfig::default();
/// let samples: Vec<f32> = (0..8192)
///     .map(|i| (2.0 * std::f32::consts::PI * 441.0 * i as f32 / 44100.0).sin())
///     .collect();
/// let track = PitchTrack::new(vec![PitchEstimate::voiced(441.0, 1.0); 13], 512, 44100);
///
/// let result = psola(&samples, 44100, &track, &track, &config, None)?;
/// assert_eq!(result.output.len(), samples.len());
/// assert_eq!(result.source_marks, result.synthesis_marks);
/// # Ok::<(), stratum_autotune::AutotuneError>(())
/// ```
pub fn psola(
    samples: &[f32],
    sample_rate: u32,
    source: &PitchTrack,
    target: &PitchTrack,
    config: &AutotuneConfig,
    cancel: Option<&CancellationToken>,
) -> Result<PsolaOutput, AutotuneError> {
    if source.len() != target.len() {
        return Err(AutotuneError::InvalidInput(format!(
            "Source and target tracks differ in length: {} vs {}",
            source.len(),
            target.len()
        )));
    }

    log::debug!(
        "PSOLA: {} samples, {} frames, frame_length={}, hop={}",
        samples.len(),
        source.len(),
        config.frame_length,
        config.hop_length
    );

    let marker = PitchMarker::from_config(config, sample_rate)?;
    let source_marks = marker.place_marks(samples, source, cancel)?;

    let extractor = FrameExtractor::new(config.frame_length)?;
    let frames = extractor.extract_all(samples, &source_marks, cancel)?;

    let warper = TimeWarper::from_config(config)?;
    let synthesis_marks = warper.warp(&source_marks, source, target)?;

    let synthesizer = OverlapAddSynthesizer::from_config(config)?;
    let output = synthesizer.synthesize(&frames, &synthesis_marks, samples.len(), cancel)?;

    Ok(PsolaOutput {
        output,
        source_marks,
        synthesis_marks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::pitch::PitchEstimate;

    fn sine(frequency: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32 / 44100.0).sin())
            .collect()
    }

    #[test]
    fn test_identity_target_reproduces_input() {
        let config = AutotuneConfig::default();
        let samples = sine(220.0, 44100);
        let n_frames = 1 + (samples.len() - config.frame_length) / config.hop_length;
        let track = PitchTrack::new(
            vec![PitchEstimate::voiced(220.0, 1.0); n_frames],
            config.hop_length,
            44100,
        );

        let result = psola(&samples, 44100, &track, &track, &config, None).unwrap();
        assert_eq!(result.output.len(), samples.len());
        assert_eq!(result.source_marks, result.synthesis_marks);

        // Interior region, least-squares gain match
        let lo = config.frame_length;
        let hi = samples.len() - 2 * config.frame_length;
        let x = &samples[lo..hi];
        let y = &result.output[lo..hi];
        let xy: f64 = x.iter().zip(y).map(|(a, b)| *a as f64 * *b as f64).sum();
        let yy: f64 = y.iter().map(|b| *b as f64 * *b as f64).sum();
        assert!(yy > 0.0);
        let gain = xy / yy;

        let err: f64 = x
            .iter()
            .zip(y)
            .map(|(a, b)| (*a as f64 - gain * *b as f64).powi(2))
            .sum();
        let energy: f64 = x.iter().map(|a| (*a as f64).powi(2)).sum();
        let nrms = (err / energy).sqrt();
        assert!(nrms < 0.05, "normalized RMS error {}", nrms);
    }

    #[test]
    fn test_unvoiced_track_gives_silence() {
        let config = AutotuneConfig::default();
        let samples = sine(220.0, 8192);
        let track = PitchTrack::new(vec![PitchEstimate::Unvoiced; 13], 512, 44100);

        let result = psola(&samples, 44100, &track, &track, &config, None).unwrap();
        assert!(result.source_marks.is_empty());
        assert!(result.output.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_track_length_mismatch() {
        let config = AutotuneConfig::default();
        let a = PitchTrack::new(vec![PitchEstimate::Unvoiced; 3], 512, 44100);
        let b = PitchTrack::new(vec![PitchEstimate::Unvoiced; 4], 512, 44100);
        assert!(matches!(
            psola(&[0.0; 4096], 44100, &a, &b, &config, None),
            Err(AutotuneError::InvalidInput(_))
        ));
    }
}
