//! Window Statistics

/// Summary statistics for a signal window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalStats {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl SignalStats {
    /// Compute statistics from a slice of values.
    ///
    /// An empty slice yields all-zero statistics rather than NaN.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }
}

/// Round to two decimals (half away from zero)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Z-score normalize a signal with the population standard deviation.
///
/// A constant signal maps to all zeros.
pub fn z_score(values: &[f64]) -> Vec<f64> {
    let stats = SignalStats::compute(values);
    if stats.std_dev == 0.0 || !stats.std_dev.is_finite() {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|v| (v - stats.mean) / stats.std_dev)
        .collect()
}
