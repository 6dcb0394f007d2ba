//! Peak Detection
//!
//! Strict local maxima filtered by minimum height, minimum prominence and
//! minimum horizontal distance, applied in that order.

use crate::DspError;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Peak selection criteria; `None` disables a filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakCriteria {
    /// Minimum peak value
    pub height: Option<f64>,
    /// Minimum prominence
    pub prominence: Option<f64>,
    /// Minimum spacing between kept peaks (samples, rounded up)
    pub distance: Option<f64>,
}

impl PeakCriteria {
    /// Criteria used for head-shake counting
    pub fn head_shake() -> Self {
        Self {
            height: Some(35.0),
            prominence: Some(3.0),
            distance: Some(5.0),
        }
    }
}

/// Find peak indices in ascending order
pub fn find_peaks(data: &[f64], criteria: &PeakCriteria) -> Result<Vec<usize>, DspError> {
    if let Some(distance) = criteria.distance {
        if !(distance >= 1.0) {
            return Err(DspError::InvalidParameter(format!(
                "peak distance must be >= 1, got {distance}"
            )));
        }
    }

    let mut peaks = local_maxima(data);

    if let Some(min_height) = criteria.height {
        peaks.retain(|&p| min_height <= data[p]);
    }

    if let Some(min_prominence) = criteria.prominence {
        let prominences = peak_prominences(data, &peaks);
        peaks = peaks
            .into_iter()
            .zip(prominences)
            .filter(|(_, prom)| min_prominence <= *prom)
            .map(|(p, _)| p)
            .collect();
    }

    if let Some(distance) = criteria.distance {
        peaks = select_by_distance(data, &peaks, distance.ceil() as usize);
    }

    trace!(count = peaks.len(), "peaks selected");
    Ok(peaks)
}

/// Prominence of each peak.
///
/// Bases are found by walking outward while the signal stays at or below
/// the peak value, up to the ends of the array.
pub fn peak_prominences(data: &[f64], peaks: &[usize]) -> Vec<f64> {
    peaks
        .iter()
        .map(|&peak| {
            let top = data[peak];

            let left_min = data[..=peak]
                .iter()
                .rev()
                .take_while(|&&v| v <= top)
                .fold(top, |acc, &v| acc.min(v));

            let right_min = data[peak..]
                .iter()
                .take_while(|&&v| v <= top)
                .fold(top, |acc, &v| acc.min(v));

            top - left_min.max(right_min)
        })
        .collect()
}

fn local_maxima(data: &[f64]) -> Vec<usize> {
    if data.len() < 3 {
        return Vec::new();
    }
    (1..data.len() - 1)
        .filter(|&i| data[i] > data[i - 1] && data[i] > data[i + 1])
        .collect()
}

/// Keep the highest peaks first and drop neighbours closer than `distance`
fn select_by_distance(data: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];

    let mut by_priority: Vec<usize> = (0..peaks.len()).collect();
    by_priority.sort_by(|&a, &b| data[peaks[a]].total_cmp(&data[peaks[b]]));

    for &j in by_priority.iter().rev() {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_local_maxima_with_height() {
        let data = [0.0, 5.0, 0.0, 8.0, 0.0, 6.0, 0.0];
        let criteria = PeakCriteria {
            height: Some(4.0),
            ..Default::default()
        };
        assert_eq!(find_peaks(&data, &criteria).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_height_filter_is_inclusive() {
        let data = [0.0, 4.0, 0.0, 3.0, 0.0];
        let criteria = PeakCriteria {
            height: Some(4.0),
            ..Default::default()
        };
        assert_eq!(find_peaks(&data, &criteria).unwrap(), vec![1]);
    }

    #[test]
    fn test_plateau_is_not_a_peak() {
        let data = [0.0, 2.0, 2.0, 0.0];
        assert!(find_peaks(&data, &PeakCriteria::default()).unwrap().is_empty());
    }

    #[test]
    fn test_prominences() {
        let data = [0.0, 5.0, 1.0, 8.0, 2.0, 3.0, 0.0];
        let prom = peak_prominences(&data, &[1, 3, 5]);
        assert_eq!(prom, vec![4.0, 8.0, 1.0]);
    }

    #[test]
    fn test_prominence_filter() {
        let data = [0.0, 5.0, 1.0, 8.0, 2.0, 3.0, 0.0];
        let criteria = PeakCriteria {
            prominence: Some(2.0),
            ..Default::default()
        };
        assert_eq!(find_peaks(&data, &criteria).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_distance_keeps_highest() {
        let data = [0.0, 5.0, 0.0, 8.0, 0.0, 6.0, 0.0];
        let criteria = PeakCriteria {
            distance: Some(3.0),
            ..Default::default()
        };
        assert_eq!(find_peaks(&data, &criteria).unwrap(), vec![3]);
    }

    #[test]
    fn test_distance_rounds_up() {
        let data = [0.0, 5.0, 0.0, 8.0, 0.0, 6.0, 0.0];
        let criteria = PeakCriteria {
            distance: Some(1.5),
            ..Default::default()
        };
        // ceil(1.5) == 2, peaks two apart survive
        assert_eq!(find_peaks(&data, &criteria).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_distance_below_one_rejected() {
        let criteria = PeakCriteria {
            distance: Some(0.5),
            ..Default::default()
        };
        assert!(find_peaks(&[0.0, 1.0, 0.0], &criteria).is_err());
    }

    #[test]
    fn test_short_input_has_no_peaks() {
        assert!(find_peaks(&[1.0, 2.0], &PeakCriteria::default()).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_peaks_respect_criteria(
            data in prop::collection::vec(-50.0f64..50.0, 0..120),
            height in -10.0f64..10.0,
            distance in 1usize..8,
        ) {
            let criteria = PeakCriteria {
                height: Some(height),
                prominence: None,
                distance: Some(distance as f64),
            };
            let peaks = find_peaks(&data, &criteria).unwrap();
            for w in peaks.windows(2) {
                prop_assert!(w[1] - w[0] >= distance);
            }
            for &p in &peaks {
                prop_assert!(data[p] >= height);
                prop_assert!(data[p] > data[p - 1] && data[p] > data[p + 1]);
            }
        }

        #[test]
        fn prop_prominence_non_negative(data in prop::collection::vec(-50.0f64..50.0, 3..80)) {
            let peaks = local_maxima(&data);
            for prom in peak_prominences(&data, &peaks) {
                prop_assert!(prom >= 0.0);
            }
        }
    }
}
