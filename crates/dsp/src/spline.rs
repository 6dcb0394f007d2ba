//! Natural Cubic Spline
//!
//! Piecewise cubic through every knot with zero second derivative at both
//! ends. Evaluation outside the knot range extrapolates the edge segment.

use crate::DspError;

/// Natural cubic spline over strictly increasing knots
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `(x[i], y[i])`
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, DspError> {
        if x.len() != y.len() {
            return Err(DspError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let n = x.len();
        if n < 3 {
            return Err(DspError::TooFewPoints {
                operation: "cubic spline",
                required: 3,
                actual: n,
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(DspError::NonFinite("spline knots"));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if let Some(index) = h.iter().position(|&step| step == 0.0) {
            return Err(DspError::NonDistinct { index });
        }

        let mut alpha = vec![0.0; n - 1];
        for i in 1..n - 1 {
            alpha[i] = 3.0 / h[i] * (y[i + 1] - y[i]) - 3.0 / h[i - 1] * (y[i] - y[i - 1]);
        }

        // Tridiagonal forward sweep
        let mut l = vec![1.0; n];
        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n];
        for i in 1..n - 1 {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        let mut b = vec![0.0; n - 1];
        let mut c = vec![0.0; n];
        let mut d = vec![0.0; n - 1];
        for j in (0..n - 1).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }

        Ok(Self {
            x: x.to_vec(),
            a: y.to_vec(),
            b,
            c,
            d,
        })
    }

    /// Evaluate the spline at `t`
    pub fn interpolate(&self, t: f64) -> f64 {
        let mut i = self.x.len() - 2;
        while i > 0 && t < self.x[i] {
            i -= 1;
        }
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx * dx + self.d[i] * dx * dx * dx
    }

    /// Evaluate the spline at each point
    pub fn interpolate_many(&self, points: &[f64]) -> Vec<f64> {
        points.iter().map(|&t| self.interpolate(t)).collect()
    }

    /// Number of knots
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false; a spline has at least three knots
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_knots() {
        let x = [0.0, 1.0, 2.5, 3.0, 4.0];
        let y = [1.0, -2.0, 0.5, 3.0, 2.0];
        let spline = CubicSpline::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!((spline.interpolate(*xi) - yi).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_data_stays_linear() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 2.0, 4.0, 6.0];
        let spline = CubicSpline::new(&x, &y).unwrap();
        assert!((spline.interpolate(1.5) - 3.0).abs() < 1e-9);
        assert!((spline.interpolate(2.25) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_many() {
        let spline = CubicSpline::new(&[0.0, 0.5, 1.0], &[0.0, 1.0, 0.0]).unwrap();
        let values = spline.interpolate_many(&[0.0, 0.5, 1.0]);
        assert_eq!(values.len(), 3);
        assert!((values[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatch() {
        let err = CubicSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err();
        assert_eq!(err, DspError::LengthMismatch { x_len: 3, y_len: 2 });
    }

    #[test]
    fn test_too_few_points() {
        let err = CubicSpline::new(&[0.0, 1.0], &[0.0, 1.0]).unwrap_err();
        assert!(matches!(err, DspError::TooFewPoints { actual: 2, .. }));
    }

    #[test]
    fn test_repeated_abscissa() {
        let err = CubicSpline::new(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, DspError::NonDistinct { index: 1 });
    }
}
