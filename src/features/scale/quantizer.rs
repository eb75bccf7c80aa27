//! Scale quantization of a pitch track
//!
//! Each voiced frequency is moved to the nearest in-scale note:
//!
//! 1. `m = 12·log2(f / 440) + 69` (continuous MIDI)
//! 2. `degree = (m - tonic) mod 12`, in `[0, 12)`
//! 3. Candidates are the sorted scale offsets plus `12` (the tonic one octave
//!    up, so pitches just below the next tonic snap upward)
//! 4. The candidate `c` with the smallest `|degree - c|` wins; ties go to the
//!    earlier (lower) candidate
//! 5. `m' = m - (degree - c)`, `f' = 440·2^((m' - 69) / 12)`
//!
//! All arithmetic runs in `f64`; only the final frequency is narrowed.
//! Unvoiced frames pass through unchanged. The quantized contour is then
//! median-smoothed (see [`super::smoothing::median_smooth`]).

use super::smoothing::median_smooth;
use super::{midi, ScaleDefinition};
use crate::config::AutotuneConfig;
use crate::error::AutotuneError;
use crate::features::pitch::{PitchEstimate, PitchTrack};

/// Snaps pitches to a scale
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleQuantizer {
    tonic: f64,
    candidates: Vec<f64>,
    median_window: usize,
}

impl ScaleQuantizer {
    /// Create a quantizer for a scale (median window 11)
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidScale` if the scale fails validation.
    pub fn new(scale: &ScaleDefinition) -> Result<Self, AutotuneError> {
        scale.validate()?;

        let mut candidates: Vec<f64> = scale
            .sorted_degrees()
            .into_iter()
            .map(|d| d as f64)
            .collect();
        candidates.push(12.0);

        Ok(Self {
            tonic: scale.tonic as f64,
            candidates,
            median_window: 11,
        })
    }

    /// Quantizer using the configured scale and median window
    pub fn from_config(config: &AutotuneConfig) -> Result<Self, AutotuneError> {
        Ok(Self::new(&config.scale)?.with_median_window(config.median_window))
    }

    /// Use a different median window (1 disables smoothing)
    pub fn with_median_window(mut self, median_window: usize) -> Self {
        self.median_window = median_window;
        self
    }

    /// Median window in frames
    pub fn median_window(&self) -> usize {
        self.median_window
    }

    /// Nearest in-scale frequency
    ///
    /// Returns `None` for non-positive or non-finite input.
    pub fn quantize_frequency(&self, frequency: f32) -> Option<f32> {
        if !(frequency > 0.0 && frequency.is_finite()) {
            return None;
        }

        let m = midi::hz_to_midi(frequency as f64);
        let degree = (m - self.tonic).rem_euclid(12.0);

        let mut best = self.candidates[0];
        let mut best_distance = (degree - best).abs();
        for &candidate in &self.candidates[1..] {
            let distance = (degree - candidate).abs();
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }

        let corrected = m - (degree - best);
        Some(midi::midi_to_hz(corrected) as f32)
    }

    /// Quantize one estimate, keeping its confidence
    pub fn quantize_estimate(&self, estimate: PitchEstimate) -> PitchEstimate {
        match estimate {
            PitchEstimate::Voiced {
                frequency,
                confidence,
            } => match self.quantize_frequency(frequency) {
                Some(corrected) => PitchEstimate::voiced(corrected, confidence),
                None => PitchEstimate::Unvoiced,
            },
            PitchEstimate::Unvoiced => PitchEstimate::Unvoiced,
        }
    }

    /// Quantize every frame without smoothing
    pub fn quantize_track(&self, track: &PitchTrack) -> PitchTrack {
        track.with_estimates(track.iter().map(|&e| self.quantize_estimate(e)).collect())
    }

    /// Quantize and median-smooth a track
    ///
    /// The result has the same length and voicing as `track`.
    pub fn correct_track(&self, track: &PitchTrack) -> PitchTrack {
        let quantized = self.quantize_track(track);
        let contour: Vec<Option<f32>> = quantized.iter().map(|e| e.voiced_frequency()).collect();
        let smoothed = median_smooth(&contour, self.median_window);

        let estimates = quantized
            .iter()
            .zip(smoothed)
            .map(|(estimate, frequency)| match frequency {
                Some(f) => PitchEstimate::voiced(f, estimate.confidence()),
                None => PitchEstimate::Unvoiced,
            })
            .collect();

        let corrected = track.with_estimates(estimates);
        log::debug!(
            "Corrected {} frames ({} voiced) with median window {}",
            corrected.len(),
            corrected.voiced_count(),
            self.median_window
        );
        corrected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() / b < 1e-4
    }

    #[test]
    fn test_in_scale_note_unchanged() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::natural_minor(0)).unwrap();
        // G4 and Eb4 are in C minor
        assert!(close(quantizer.quantize_frequency(392.00).unwrap(), 392.00));
        assert!(close(quantizer.quantize_frequency(311.13).unwrap(), 311.13));
    }

    #[test]
    fn test_idempotent() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::natural_minor(0)).unwrap();
        for &f in &[97.3f32, 187.0, 250.5, 440.0, 612.0, 1500.0] {
            let once = quantizer.quantize_frequency(f).unwrap();
            let twice = quantizer.quantize_frequency(once).unwrap();
            assert!(close(once, twice), "{} -> {} -> {}", f, once, twice);
        }
    }

    #[test]
    fn test_snaps_up_across_octave_boundary() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::natural_minor(0)).unwrap();
        // One cent below C5 snaps to C5, not down to Bb4
        let f = midi::midi_to_hz(72.0 - 0.01) as f32;
        assert!(close(quantizer.quantize_frequency(f).unwrap(), 523.25));
    }

    #[test]
    fn test_tie_goes_to_lower_candidate() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::natural_minor(0)).unwrap();
        // A4 lies between Ab4 (8) and Bb4 (10)
        let corrected = quantizer.quantize_frequency(440.0).unwrap();
        assert!(close(corrected, 415.30), "got {}", corrected);
    }

    #[test]
    fn test_non_c_tonic() {
        // A minor contains every white key, so B4 stays and a sharp A4 moves down
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::natural_minor(9)).unwrap();
        assert!(close(quantizer.quantize_frequency(493.88).unwrap(), 493.88));
        let corrected = quantizer.quantize_frequency(460.0).unwrap();
        assert!(close(corrected, 440.0), "got {}", corrected);
    }

    #[test]
    fn test_chromatic_rounds_to_semitone() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::chromatic()).unwrap();
        let f = midi::midi_to_hz(69.3) as f32;
        assert!(close(quantizer.quantize_frequency(f).unwrap(), 440.0));
    }

    #[test]
    fn test_invalid_input() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::default()).unwrap();
        assert_eq!(quantizer.quantize_frequency(0.0), None);
        assert_eq!(quantizer.quantize_frequency(-10.0), None);
        assert_eq!(quantizer.quantize_frequency(f32::NAN), None);

        assert!(matches!(
            ScaleQuantizer::new(&ScaleDefinition::new(0, vec![])),
            Err(AutotuneError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_unvoiced_passthrough_and_confidence_kept() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::default()).unwrap();
        assert_eq!(
            quantizer.quantize_estimate(PitchEstimate::Unvoiced),
            PitchEstimate::Unvoiced
        );
        let corrected = quantizer.quantize_estimate(PitchEstimate::voiced(400.0, 0.7));
        assert_eq!(corrected.confidence(), 0.7);
    }

    #[test]
    fn test_correct_track_preserves_length_and_voicing() {
        let quantizer = ScaleQuantizer::new(&ScaleDefinition::default()).unwrap();
        let mut estimates = vec![PitchEstimate::voiced(445.0, 0.9); 30];
        estimates[4] = PitchEstimate::Unvoiced;
        estimates[20] = PitchEstimate::voiced(900.0, 0.9);
        let track = PitchTrack::new(estimates, 512, 44100);

        let corrected = quantizer.correct_track(&track);
        assert_eq!(corrected.len(), track.len());
        assert_eq!(corrected.voiced_flags(), track.voiced_flags());
        // 445 Hz snaps to Bb4 and the octave spike is smoothed away
        assert!(close(corrected.get(20).unwrap().frequency(), 466.16));
    }
}
