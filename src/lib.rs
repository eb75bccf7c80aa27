//! # Stratum Autotune
//!
//! An offline pitch-correction engine: detects the fundamental of a mono
//! recording, snaps it onto a musical scale and resynthesizes the audio at the
//! corrected pitch.
//!
//! ## Features
//!
//! - **Pitch Tracking**: YIN difference function (direct or FFT), CMND and
//!   first-minimum period selection with parabolic refinement
//! - **Scale Correction**: nearest-degree quantization onto any scale, followed by
//!   median smoothing of the contour
//! - **Resynthesis**: PSOLA (pitch-synchronous overlap-add) with Hann-tapered grains
//! - **Parallelism**: frame-level analysis and grain extraction on the rayon pool,
//!   with cooperative cancellation
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_autotune::io::{decoder::load_mono, encoder::write_wav};
//! use stratum_autotune::{autotune, AutotuneConfig, ScaleDefinition};
//!
//! let input = load_mono("vocal.wav")?;
//! let config = AutotuneConfig::with_scale("A minor".parse::<ScaleDefinition>()?);
//!
//! let result = autotune(&input, &config)?;
//! println!(
//!     "{} of {} frames voiced",
//!     result.metadata.voiced_frames, result.metadata.n_frames
//! );
//! write_wav("vocal_tuned.wav", &result.output)?;
//! # Ok::<(), stratum_autotune::AutotuneError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SampleBuffer → Framing → YIN Pitch Track → Scale Quantizer + Median → PSOLA → Output
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod cancel;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod synthesis;

// Re-export main types
pub use analysis::confidence::CorrectionConfidence;
pub use analysis::metadata::{AutotuneFlag, AutotuneMetadata};
pub use analysis::result::AutotuneResult;
pub use cancel::CancellationToken;
pub use config::AutotuneConfig;
pub use error::AutotuneError;
pub use features::pitch::difference::DifferenceMethod;
pub use features::pitch::{PitchEstimate, PitchTrack};
pub use features::scale::{PitchClass, ScaleDefinition, ScaleKind};
pub use io::sample_buffer::SampleBuffer;

use features::pitch::tracker::PitchTrackAssembler;
use features::scale::quantizer::ScaleQuantizer;

/// Main pitch-correction function
///
/// Tracks the pitch of `input`, corrects it onto `config.scale` and resynthesizes
/// the audio at the corrected pitch.
///
/// # Arguments
///
/// * `input` - Mono audio buffer
/// * `config` - Correction configuration
///
/// # Returns
///
/// `AutotuneResult` with the corrected audio (same length and sample rate as the
/// input), both pitch tracks and run metadata
///
/// # Errors
///
/// Returns `AutotuneError` if the configuration is invalid or the buffer is
/// shorter than one frame.
///
/// # Example
///
/// ```
/// use stratum_autotune::{autotune, AutotuneConfig, SampleBuffer};
///
/// let samples: Vec<f32> = (0..22050)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 300.0 * i as f32 / 44100.0).sin())
///     .collect();
/// let input = SampleBuffer::new(samples, 44100)?;
///
/// let result = autotune(&input, &AutotuneConfig::default())?;
/// assert_eq!(result.output.len(), input.len());
/// assert_eq!(result.source_track.len(), result.target_track.len());
/// # Ok::<(), stratum_autotune::AutotuneError>(())
/// ```
pub fn autotune(
    input: &SampleBuffer,
    config: &AutotuneConfig,
) -> Result<AutotuneResult, AutotuneError> {
    run(input, config, None)
}

/// [`autotune`] with cooperative cancellation
///
/// The token is checked between frames in every stage.
///
/// # Errors
///
/// Returns `AutotuneError::Cancelled` once the token fires, plus every error
/// [`autotune`] can return.
pub fn autotune_with_cancel(
    input: &SampleBuffer,
    config: &AutotuneConfig,
    cancel: &CancellationToken,
) -> Result<AutotuneResult, AutotuneError> {
    run(input, config, Some(cancel))
}

/// Track pitch without correcting it
///
/// # Errors
///
/// Returns `AutotuneError` if the configuration or sample rate is invalid, or
/// the buffer is shorter than one frame.
///
/// # Example
///
/// ```
/// use stratum_autotune::{track_pitch, AutotuneConfig};
///
/// let samples: Vec<f32> = (0..8192)
///     .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin())
///     .collect();
/// let track = track_pitch(&samples, 44100, &AutotuneConfig::default())?;
/// assert_eq!(track.len(), 13);
/// # Ok::<(), stratum_autotune::AutotuneError>(())
/// ```
pub fn track_pitch(
    samples: &[f32],
    sample_rate: u32,
    config: &AutotuneConfig,
) -> Result<PitchTrack, AutotuneError> {
    PitchTrackAssembler::new(config, sample_rate)?.assemble(samples, None)
}

fn run(
    input: &SampleBuffer,
    config: &AutotuneConfig,
    cancel: Option<&CancellationToken>,
) -> Result<AutotuneResult, AutotuneError> {
    use std::time::Instant;
    let start_time = Instant::now();

    let sample_rate = input.sample_rate();
    let samples = input.samples();

    log::debug!(
        "Starting pitch correction: {} samples at {} Hz, scale {}",
        samples.len(),
        sample_rate,
        config.scale
    );

    config.validate()?;
    cancel::check(cancel)?;

    // Phase 1: pitch tracking
    let assembler = PitchTrackAssembler::new(config, sample_rate)?;
    let source_track = assembler.assemble(samples, cancel)?;

    // Phase 2: scale correction
    cancel::check(cancel)?;
    let quantizer = ScaleQuantizer::from_config(config)?;
    let target_track = quantizer.correct_track(&source_track);

    // Phase 3: resynthesis
    let psola = synthesis::psola(
        samples,
        sample_rate,
        &source_track,
        &target_track,
        config,
        cancel,
    )?;
    if psola.output.len() != samples.len() {
        return Err(AutotuneError::ProcessingError(format!(
            "Resynthesis produced {} samples for {} input samples",
            psola.output.len(),
            samples.len()
        )));
    }
    let output = SampleBuffer::new(psola.output, sample_rate)?;

    let mut metadata = AutotuneMetadata {
        duration_seconds: input.duration_seconds(),
        sample_rate,
        processing_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
        n_frames: source_track.len(),
        voiced_frames: source_track.voiced_count(),
        pitch_marks: psola.source_marks.len(),
        scale: config.scale.to_string(),
        ..AutotuneMetadata::default()
    };

    if metadata.voiced_frames == 0 {
        metadata.flag(AutotuneFlag::NoVoicedFrames);
    } else {
        if metadata.pitch_marks == 0 {
            metadata.flag(AutotuneFlag::NoPitchMarks);
        }
        if metadata.voiced_ratio() < 0.25 {
            metadata.flag(AutotuneFlag::SparseVoicing);
        }
    }
    if output.peak() > 1.0 {
        metadata.flag(AutotuneFlag::OutputClipping);
    }

    log::debug!(
        "Pitch correction complete: {}/{} voiced frames, {} marks, {:.1} ms",
        metadata.voiced_frames,
        metadata.n_frames,
        metadata.pitch_marks,
        metadata.processing_time_ms
    );

    Ok(AutotuneResult {
        output,
        source_track,
        target_track,
        metadata,
    })
}
