//! MIDI note number and frequency conversions
//!
//! Uses the A4 = 69 = 440 Hz convention. Note numbers are continuous so that
//! fractional semitones (cents) survive the round trip.

/// Reference frequency of A4 in Hz
pub const A4_FREQUENCY: f64 = 440.0;

/// MIDI note number of A4
pub const A4_MIDI: f64 = 69.0;

/// Semitones per octave
pub const SEMITONES_PER_OCTAVE: f64 = 12.0;

/// Pitch class names using sharps
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert a frequency in Hz to a continuous MIDI note number
///
/// `m = 12 * log2(f / 440) + 69`
pub fn hz_to_midi(frequency: f64) -> f64 {
    SEMITONES_PER_OCTAVE * (frequency / A4_FREQUENCY).log2() + A4_MIDI
}

/// Convert a continuous MIDI note number to a frequency in Hz
///
/// `f = 440 * 2^((m - 69) / 12)`
pub fn midi_to_hz(midi_note: f64) -> f64 {
    A4_FREQUENCY * 2f64.powf((midi_note - A4_MIDI) / SEMITONES_PER_OCTAVE)
}

/// Name of a pitch class (0 = C, ..., 11 = B)
pub fn pitch_class_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES[(pitch_class % 12) as usize]
}

/// Name of a MIDI note with octave, e.g. `"A4"` or `"C#5"`
pub fn note_name(midi_note: u8) -> String {
    let octave = (midi_note / 12) as i32 - 1;
    format!("{}{}", pitch_class_name(midi_note % 12), octave)
}
