//! Musical scales and pitch-contour correction
//!
//! - [`ScaleDefinition`]: tonic pitch class plus scale-degree offsets
//! - [`quantizer::ScaleQuantizer`]: snaps a pitch track onto a scale
//! - [`smoothing`]: median smoothing of the corrected contour
//! - [`midi`]: note number / frequency conversions
//!
//! # Example
//!
//! ```
//! use stratum_autotune::features::scale::ScaleDefinition;
//!
//! let scale: ScaleDefinition = "C minor".parse()?;
//! assert_eq!(scale.pitch_classes(), vec![0, 2, 3, 5, 7, 8, 10]);
//! # Ok::<(), stratum_autotune::AutotuneError>(())
//! ```

pub mod midi;
pub mod quantizer;
pub mod smoothing;

use crate::error::AutotuneError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common scale patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Ionian: 0 2 4 5 7 9 11
    Major,
    /// Aeolian: 0 2 3 5 7 8 10
    NaturalMinor,
    /// 0 2 3 5 7 8 11
    HarmonicMinor,
    /// 0 2 4 7 9
    MajorPentatonic,
    /// 0 3 5 7 10
    MinorPentatonic,
    /// 0 3 5 6 7 10
    Blues,
    /// All twelve semitones
    Chromatic,
}

impl ScaleKind {
    /// Semitone offsets from the tonic, ascending
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleKind::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleKind::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }
}

impl FromStr for ScaleKind {
    type Err = AutotuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(|c: char| c == '-' || c.is_whitespace(), "_");

        match normalized.as_str() {
            "maj" | "major" | "ionian" => Ok(ScaleKind::Major),
            "min" | "minor" | "natural_minor" | "aeolian" => Ok(ScaleKind::NaturalMinor),
            "harmonic_minor" => Ok(ScaleKind::HarmonicMinor),
            "pentatonic" | "major_pentatonic" => Ok(ScaleKind::MajorPentatonic),
            "minor_pentatonic" => Ok(ScaleKind::MinorPentatonic),
            "blues" => Ok(ScaleKind::Blues),
            "chromatic" => Ok(ScaleKind::Chromatic),
            other => Err(AutotuneError::InvalidScale(format!(
                "Unknown scale pattern: {}",
                other
            ))),
        }
    }
}

/// Parse a pitch class name such as `"C"`, `"F#"`, `"Bb"` or `"Cb"` into 0..=11
pub fn parse_pitch_class(name: &str) -> Result<u8, AutotuneError> {
    let name = name.trim();
    let mut chars = name.chars();
    let letter = chars
        .next()
        .ok_or_else(|| AutotuneError::InvalidScale("Empty tonic name".to_string()))?;

    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => {
            return Err(AutotuneError::InvalidScale(format!(
                "Invalid tonic name: {}",
                name
            )))
        }
    };

    let mut offset = 0i32;
    for accidental in chars {
        offset += match accidental {
            '#' | '♯' => 1,
            'b' | '♭' => -1,
            _ => {
                return Err(AutotuneError::InvalidScale(format!(
                    "Invalid accidental in tonic name: {}",
                    name
                )))
            }
        };
    }

    Ok((base + offset).rem_euclid(12) as u8)
}

/// A pitch class in `0..=11` (0 = C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Wrap a semitone number into a pitch class
    pub fn new(semitone: u8) -> Self {
        Self(semitone % 12)
    }

    /// Pitch class number
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(midi::pitch_class_name(self.0))
    }
}

impl FromStr for PitchClass {
    type Err = AutotuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pitch_class(s).map(PitchClass)
    }
}

/// A tonic pitch class plus the in-scale degree offsets
///
/// Offsets are semitones above the tonic in `[0, 12)`. The definition is plain
/// data; [`ScaleDefinition::validate`] (run by the quantizer on construction)
/// rejects malformed definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleDefinition {
    /// Tonic pitch class (0 = C, ..., 11 = B)
    pub tonic: u8,

    /// Scale-degree offsets from the tonic in semitones
    pub degrees: Vec<u8>,
}

impl ScaleDefinition {
    /// Create a scale from a tonic and explicit degree offsets
    pub fn new(tonic: u8, degrees: impl Into<Vec<u8>>) -> Self {
        Self {
            tonic,
            degrees: degrees.into(),
        }
    }

    /// Create a scale from a tonic and a known pattern
    pub fn from_kind(tonic: u8, kind: ScaleKind) -> Self {
        Self::new(tonic, kind.intervals())
    }

    /// Major scale on `tonic`
    pub fn major(tonic: u8) -> Self {
        Self::from_kind(tonic, ScaleKind::Major)
    }

    /// Natural minor scale on `tonic`
    pub fn natural_minor(tonic: u8) -> Self {
        Self::from_kind(tonic, ScaleKind::NaturalMinor)
    }

    /// All twelve pitch classes (corrects to the nearest semitone)
    pub fn chromatic() -> Self {
        Self::from_kind(0, ScaleKind::Chromatic)
    }

    /// Check the definition for structural errors
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidScale` if the tonic is out of range, the
    /// degree set is empty, a degree is outside `[0, 12)`, a degree repeats, or
    /// the tonic itself (offset 0) is missing.
    pub fn validate(&self) -> Result<(), AutotuneError> {
        if self.tonic > 11 {
            return Err(AutotuneError::InvalidScale(format!(
                "Tonic pitch class must be in 0..=11, got {}",
                self.tonic
            )));
        }

        if self.degrees.is_empty() {
            return Err(AutotuneError::InvalidScale(
                "Scale has no degrees".to_string(),
            ));
        }

        if let Some(&bad) = self.degrees.iter().find(|&&d| d >= 12) {
            return Err(AutotuneError::InvalidScale(format!(
                "Scale degree must be in 0..12, got {}",
                bad
            )));
        }

        let sorted = self.sorted_degrees();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(AutotuneError::InvalidScale(format!(
                "Duplicate scale degrees in {:?}",
                self.degrees
            )));
        }

        if sorted[0] != 0 {
            return Err(AutotuneError::InvalidScale(format!(
                "Scale degrees {:?} do not include the tonic (0)",
                self.degrees
            )));
        }

        Ok(())
    }

    /// Degree offsets sorted ascending
    pub fn sorted_degrees(&self) -> Vec<u8> {
        let mut sorted = self.degrees.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Absolute in-scale pitch classes, sorted ascending
    pub fn pitch_classes(&self) -> Vec<u8> {
        let mut classes: Vec<u8> = self
            .degrees
            .iter()
            .map(|&d| ((self.tonic as u32 + d as u32) % 12) as u8)
            .collect();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    /// Whether a pitch class belongs to the scale
    pub fn contains_pitch_class(&self, pitch_class: u8) -> bool {
        self.pitch_classes().contains(&(pitch_class % 12))
    }

    /// In-scale MIDI notes from `low_octave` to `high_octave` inclusive
    ///
    /// Octaves follow scientific pitch notation (C4 = 60). Notes outside the
    /// MIDI range are dropped.
    pub fn midi_notes(&self, low_octave: i8, high_octave: i8) -> Vec<u8> {
        let mut notes = Vec::new();
        for octave in low_octave..=high_octave {
            let base = (octave as i32 + 1) * 12 + self.tonic as i32;
            for &degree in &self.degrees {
                let note = base + degree as i32;
                if (0..=127).contains(&note) {
                    notes.push(note as u8);
                }
            }
        }
        notes.sort_unstable();
        notes.dedup();
        notes
    }

    /// Frequencies of the in-scale notes between two octaves
    pub fn frequencies(&self, low_octave: i8, high_octave: i8) -> Vec<f32> {
        self.midi_notes(low_octave, high_octave)
            .into_iter()
            .map(|note| midi::midi_to_hz(note as f64) as f32)
            .collect()
    }

    /// Note names of the in-scale notes between two octaves
    pub fn note_names(&self, low_octave: i8, high_octave: i8) -> Vec<String> {
        self.midi_notes(low_octave, high_octave)
            .into_iter()
            .map(midi::note_name)
            .collect()
    }
}

impl Default for ScaleDefinition {
    fn default() -> Self {
        Self::natural_minor(0)
    }
}

impl fmt::Display for ScaleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?}",
            midi::pitch_class_name(self.tonic),
            self.sorted_degrees()
        )
    }
}

impl FromStr for ScaleDefinition {
    type Err = AutotuneError;

    /// Parse `"<tonic> <pattern>"`, e.g. `"C minor"`, `"F# major"`, or the
    /// colon form `"Bb:min"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s
            .split(|c: char| c.is_whitespace() || c == ':')
            .filter(|p| !p.is_empty());

        let tonic = parts
            .next()
            .ok_or_else(|| AutotuneError::InvalidScale("Missing tonic".to_string()))?;
        let tonic = parse_pitch_class(tonic)?;

        let pattern: Vec<&str> = parts.collect();
        if pattern.is_empty() {
            return Err(AutotuneError::InvalidScale(format!(
                "Missing scale pattern in '{}'",
                s
            )));
        }
        let kind: ScaleKind = pattern.join("_").parse()?;

        Ok(Self::from_kind(tonic, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pitch_class() {
        assert_eq!(parse_pitch_class("C").unwrap(), 0);
        assert_eq!(parse_pitch_class("c#").unwrap(), 1);
        assert_eq!(parse_pitch_class("Db").unwrap(), 1);
        assert_eq!(parse_pitch_class("Bb").unwrap(), 10);
        assert_eq!(parse_pitch_class("B#").unwrap(), 0);
        assert_eq!(parse_pitch_class("Cb").unwrap(), 11);
        assert!(parse_pitch_class("H").is_err());
        assert!(parse_pitch_class("C?").is_err());
        assert!(parse_pitch_class("").is_err());
    }

    #[test]
    fn test_pitch_class() {
        let pc: PitchClass = "Eb".parse().unwrap();
        assert_eq!(pc.value(), 3);
        assert_eq!(pc.to_string(), "D#");
        assert_eq!(PitchClass::new(14), PitchClass::new(2));
        assert!("X".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_parse_scale_definition() {
        let scale: ScaleDefinition = "C minor".parse().unwrap();
        assert_eq!(scale, ScaleDefinition::natural_minor(0));

        let scale: ScaleDefinition = "F# major".parse().unwrap();
        assert_eq!(scale.tonic, 6);
        assert_eq!(scale.degrees, vec![0, 2, 4, 5, 7, 9, 11]);

        let scale: ScaleDefinition = "Bb:min".parse().unwrap();
        assert_eq!(scale.tonic, 10);

        let scale: ScaleDefinition = "A minor pentatonic".parse().unwrap();
        assert_eq!(scale.degrees, vec![0, 3, 5, 7, 10]);

        assert!("C".parse::<ScaleDefinition>().is_err());
        assert!("C lydian-dominant".parse::<ScaleDefinition>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ScaleDefinition::major(0).validate().is_ok());
        assert!(ScaleDefinition::chromatic().validate().is_ok());

        assert!(matches!(
            ScaleDefinition::new(12, vec![0, 2]).validate(),
            Err(AutotuneError::InvalidScale(_))
        ));
        assert!(ScaleDefinition::new(0, Vec::new()).validate().is_err());
        assert!(ScaleDefinition::new(0, vec![0, 12]).validate().is_err());
        assert!(ScaleDefinition::new(0, vec![0, 4, 4]).validate().is_err());
        assert!(ScaleDefinition::new(0, vec![2, 4, 7]).validate().is_err());
    }

    #[test]
    fn test_pitch_classes_wrap_around_octave() {
        // A minor: A B C D E F G
        let scale = ScaleDefinition::natural_minor(9);
        assert_eq!(scale.pitch_classes(), vec![0, 2, 4, 5, 7, 9, 11]);
        assert!(scale.contains_pitch_class(9));
        assert!(!scale.contains_pitch_class(10));
    }

    #[test]
    fn test_midi_notes_and_frequencies() {
        let scale = ScaleDefinition::major(0);
        let notes = scale.midi_notes(4, 4);
        assert_eq!(notes, vec![60, 62, 64, 65, 67, 69, 71]);

        let freqs = scale.frequencies(4, 4);
        assert_eq!(freqs.len(), 7);
        assert!((freqs[5] - 440.0).abs() < 1e-3);

        let names = scale.note_names(4, 4);
        assert_eq!(names[0], "C4");
        assert_eq!(names[5], "A4");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ScaleDefinition::natural_minor(0).to_string(),
            "C [0, 2, 3, 5, 7, 8, 10]"
        );
    }
}
