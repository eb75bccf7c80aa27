//! Pitch-mark placement
//!
//! Walks the signal one period at a time inside each voiced frame's hop window,
//! marking the largest-magnitude sample of every period. The scan cursor is
//! threaded through the frames as a fold; unvoiced frames emit nothing and only
//! move the cursor forward.

use crate::cancel::{self, CancellationToken};
use crate::config::AutotuneConfig;
use crate::error::AutotuneError;
use crate::features::pitch::PitchTrack;

/// Period in whole samples: `max(1, round(sample_rate / frequency))`
///
/// Returns `None` for non-positive or non-finite frequencies.
pub fn period_samples(frequency: f32, sample_rate: u32) -> Option<usize> {
    if !(frequency > 0.0 && frequency.is_finite()) {
        return None;
    }
    let period = (sample_rate as f64 / frequency as f64).round();
    Some((period as usize).max(1))
}

/// Places pitch marks on the source signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchMarker {
    hop_length: usize,
    sample_rate: u32,
}

impl PitchMarker {
    /// Create a marker for a hop length and sample rate
    pub fn new(hop_length: usize, sample_rate: u32) -> Result<Self, AutotuneError> {
        if hop_length == 0 {
            return Err(AutotuneError::InvalidInput(
                "Hop length must be > 0".to_string(),
            ));
        }
        Ok(Self {
            hop_length,
            sample_rate,
        })
    }

    /// Marker using the configured hop length
    pub fn from_config(config: &AutotuneConfig, sample_rate: u32) -> Result<Self, AutotuneError> {
        Self::new(config.hop_length, sample_rate)
    }

    /// Place marks for a whole track
    ///
    /// Frame `i` owns the hop window `[i·hop, (i+1)·hop)`; the last frame's window
    /// runs to the end of the buffer. Marks are strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns `AutotuneError::Cancelled` if the token fires between frames.
    pub fn place_marks(
        &self,
        samples: &[f32],
        track: &PitchTrack,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<usize>, AutotuneError> {
        let n = samples.len();
        let n_frames = track.len();

        let (marks, _) = track.iter().enumerate().try_fold(
            (Vec::new(), 0usize),
            |(mut marks, cursor), (i, estimate)| {
                cancel::check(cancel)?;

                let start = (i * self.hop_length).min(n);
                let end = if i + 1 == n_frames {
                    n
                } else {
                    (start + self.hop_length).min(n)
                };

                let next = match estimate
                    .voiced_frequency()
                    .and_then(|f| period_samples(f, self.sample_rate))
                {
                    Some(period) => scan_hop(samples, cursor.max(start), end, period, &mut marks),
                    None => cursor.max(end),
                };

                Ok::<_, AutotuneError>((marks, next))
            },
        )?;

        if marks.is_empty() {
            log::warn!("No pitch marks placed ({} frames)", n_frames);
        } else {
            log::debug!("Placed {} pitch marks over {} frames", marks.len(), n_frames);
        }

        Ok(marks)
    }
}

/// Mark one period at a time while the cursor stays inside `[.., end)`
///
/// Returns the cursor after the last period.
fn scan_hop(
    samples: &[f32],
    mut cursor: usize,
    end: usize,
    period: usize,
    marks: &mut Vec<usize>,
) -> usize {
    let n = samples.len();
    while cursor < end && cursor < n {
        let window_end = (cursor + period).min(n);
        marks.push(cursor + argmax_abs(&samples[cursor..window_end]));
        cursor += period;
    }
    cursor
}

/// Index of the first largest `|x|`
fn argmax_abs(window: &[f32]) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &x) in window.iter().enumerate() {
        if x.abs() > best_value {
            best = i;
            best_value = x.abs();
        }
    }
    best
}
