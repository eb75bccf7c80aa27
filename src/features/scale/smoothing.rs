//! Median smoothing of a corrected pitch contour

/// Median-filter a contour with an odd window
///
/// `None` marks an unvoiced frame. For each position:
/// - unvoiced positions stay unvoiced
/// - if the centred window runs past either end of the contour, or contains any
///   unvoiced frame, the input value is kept
/// - otherwise the value becomes the median of the window
///
/// A window of 1 (or 0) returns the input unchanged.
///
/// # Arguments
///
/// * `contour` - Per-frame frequencies, `None` where unvoiced
/// * `window_size` - Window length in frames (odd, e.g. 11)
///
/// # Returns
///
/// Smoothed contour with the same voicing as the input
pub fn median_smooth(contour: &[Option<f32>], window_size: usize) -> Vec<Option<f32>> {
    let half = window_size / 2;
    if half == 0 {
        return contour.to_vec();
    }

    log::debug!(
        "Median smoothing {} frames with window size {}",
        contour.len(),
        window_size
    );

    let mut window: Vec<f32> = Vec::with_capacity(2 * half + 1);
    contour
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let value = value?;
            if i < half || i + half >= contour.len() {
                return Some(value);
            }

            window.clear();
            for neighbour in &contour[i - half..=i + half] {
                match neighbour {
                    Some(f) => window.push(*f),
                    None => return Some(value),
                }
            }

            window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            Some(window[half])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_contour_unchanged() {
        let contour = vec![Some(220.0f32); 20];
        assert_eq!(median_smooth(&contour, 11), contour);
    }

    #[test]
    fn test_outlier_removed() {
        let mut contour = vec![Some(220.0f32); 21];
        contour[10] = Some(440.0);
        let smoothed = median_smooth(&contour, 11);
        assert_eq!(smoothed[10], Some(220.0));
    }

    #[test]
    fn test_edges_keep_input() {
        let contour: Vec<Option<f32>> = (0..15).map(|i| Some(100.0 + i as f32)).collect();
        let mut spiky = contour.clone();
        spiky[0] = Some(500.0);
        spiky[14] = Some(500.0);

        let smoothed = median_smooth(&spiky, 11);
        // Positions 0..5 and 10..15 have incomplete windows
        assert_eq!(smoothed[0], Some(500.0));
        assert_eq!(smoothed[14], Some(500.0));
        assert_eq!(smoothed[3], spiky[3]);
        // Position 5 has the full window 0..=10: {500, 101..=110}
        assert_eq!(smoothed[5], Some(106.0));
    }

    #[test]
    fn test_unvoiced_frames_preserved() {
        let mut contour = vec![Some(220.0f32); 30];
        contour[15] = None;
        contour[12] = Some(300.0);

        let smoothed = median_smooth(&contour, 11);
        assert_eq!(smoothed[15], None);
        // Window of position 12 contains the unvoiced frame, so it is left alone
        assert_eq!(smoothed[12], Some(300.0));
        assert_eq!(
            smoothed.iter().filter(|v| v.is_none()).count(),
            1,
            "voicing must not change"
        );
    }

    #[test]
    fn test_window_one_is_identity() {
        let contour = vec![Some(1.0f32), None, Some(3.0)];
        assert_eq!(median_smooth(&contour, 1), contour);
        assert!(median_smooth(&[], 11).is_empty());
    }
}
