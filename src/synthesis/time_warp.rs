//! Synthesis-mark placement
//!
//! Respaces the source marks so that the spacing matches the target period.
//! For the interval between marks `i` and `i + 1`, with `s = target_f0 / source_f0`
//! taken from the frame containing mark `i`:
//!
//! ```text
//! new[0]     = mark[0]
//! new[i + 1] = new[i] + max(1, round((mark[i+1] - mark[i]) / s))
//! ```
//!
//! `s` falls back to 1.0 (spacing kept) when either pitch is missing or zero, or
//! when an unvoiced frame lies between the two marks.
//!
//! Across such a gap the sequence resynchronizes with the source:
//! `new[i + 1] = max(new[i] + 1, mark[i + 1])`, so the offset built up over one
//! voiced segment does not shift the next one.

use crate::config::AutotuneConfig;
use crate::error::AutotuneError;
use crate::features::pitch::PitchTrack;
use crate::preprocessing::framing::FrameSegmenter;

/// Maps source marks to synthesis marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWarper {
    segmenter: FrameSegmenter,
}

impl TimeWarper {
    /// Create a warper for the analysis framing
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if either length is zero.
    pub fn new(frame_length: usize, hop_length: usize) -> Result<Self, AutotuneError> {
        Ok(Self {
            segmenter: FrameSegmenter::new(frame_length, hop_length)?,
        })
    }

    /// Warper using the configured frame and hop lengths
    pub fn from_config(config: &AutotuneConfig) -> Result<Self, AutotuneError> {
        Ok(Self {
            segmenter: FrameSegmenter::from_config(config)?,
        })
    }

    /// True when an unvoiced frame (in either track) lies within `[mark_a, mark_b]`
    pub fn spans_gap(
        &self,
        source: &PitchTrack,
        target: &PitchTrack,
        mark_a: usize,
        mark_b: usize,
    ) -> bool {
        let n_frames = source.len().min(target.len());
        if n_frames == 0 {
            return false;
        }

        let frame_a = self.segmenter.frame_of_sample(mark_a, n_frames);
        let frame_b = self.segmenter.frame_of_sample(mark_b, n_frames);
        (frame_a..=frame_b).any(|i| {
            let voiced = |track: &PitchTrack| track.get(i).map_or(false, |e| e.is_voiced());
            !voiced(source) || !voiced(target)
        })
    }

    /// Pitch ratio for the interval `[mark_a, mark_b]`
    pub fn pitch_ratio(
        &self,
        source: &PitchTrack,
        target: &PitchTrack,
        mark_a: usize,
        mark_b: usize,
    ) -> f64 {
        let n_frames = source.len().min(target.len());
        if n_frames == 0 || self.spans_gap(source, target, mark_a, mark_b) {
            return 1.0;
        }

        let frame_a = self.segmenter.frame_of_sample(mark_a, n_frames);

        let (src, tgt) = match (source.get(frame_a), target.get(frame_a)) {
            (Some(s), Some(t)) => (s.frequency() as f64, t.frequency() as f64),
            _ => return 1.0,
        };
        if src <= 0.0 || tgt <= 0.0 || !src.is_finite() || !tgt.is_finite() {
            return 1.0;
        }
        tgt / src
    }

    /// Compute synthesis marks
    ///
    /// The result has the same length as `marks` and is strictly increasing.
    /// Each voiced segment after an unvoiced gap starts back on its source mark.
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::InvalidInput` if the tracks differ in length.
    pub fn warp(
        &self,
        marks: &[usize],
        source: &PitchTrack,
        target: &PitchTrack,
    ) -> Result<Vec<usize>, AutotuneError> {
        if source.len() != target.len() {
            return Err(AutotuneError::InvalidInput(format!(
                "Source and target tracks differ in length: {} vs {}",
                source.len(),
                target.len()
            )));
        }

        let first = match marks.first() {
            Some(&first) => first,
            None => return Ok(Vec::new()),
        };

        let mut warped = Vec::with_capacity(marks.len());
        warped.push(first);
        let mut position = first;

        for pair in marks.windows(2) {
            position = if self.spans_gap(source, target, pair[0], pair[1]) {
                (position + 1).max(pair[1])
            } else {
                let ratio = self.pitch_ratio(source, target, pair[0], pair[1]);
                let spacing = (pair[1] - pair[0]) as f64 / ratio;
                position + (spacing.round() as usize).max(1)
            };
            warped.push(position);
        }

        log::debug!(
            "Warped {} marks: span {} -> {} samples",
            marks.len(),
            marks[marks.len() - 1] - first,
            position - first
        );

        Ok(warped)
    }
}
