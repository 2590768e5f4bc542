//! Interpolation over sorted abscissae and rectangular grids.
//!
//! Both interpolators are generic over `T: Float` so the same code serves
//! `f64` production paths and narrower test types. Construction validates
//! the grid once; lookups are then branch-light and clamp to the boundary
//! (flat extrapolation), which is the behaviour the curve and surface
//! wrappers document.

use num_traits::Float;
use thiserror::Error;

/// Errors from interpolator construction or evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    /// Fewer points than the method requires.
    #[error("insufficient data: got {got} points, need at least {need}")]
    InsufficientData {
        /// Points supplied
        got: usize,
        /// Points required
        need: usize,
    },

    /// Abscissae not strictly increasing.
    #[error("abscissae must be strictly increasing at index {index}")]
    NotIncreasing {
        /// Index of the offending point
        index: usize,
    },

    /// Mismatched dimensions between axes and values.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Linear interpolation over strictly increasing abscissae.
///
/// Outside the domain the boundary value is returned (flat extrapolation).
///
/// # Examples
///
/// ```
/// use risk_core::math::LinearInterpolator;
///
/// let interp = LinearInterpolator::new(vec![1.0, 2.0, 4.0], vec![10.0, 20.0, 40.0]).unwrap();
/// assert_eq!(interp.interpolate(3.0), 30.0);
/// assert_eq!(interp.interpolate(0.0), 10.0); // flat below
/// assert_eq!(interp.interpolate(9.0), 40.0); // flat above
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Constructs a linear interpolator.
    ///
    /// Requires at least two points with strictly increasing abscissae and
    /// matching ordinate count.
    pub fn new(xs: Vec<T>, ys: Vec<T>) -> Result<Self, InterpolationError> {
        if xs.len() < 2 {
            return Err(InterpolationError::InsufficientData {
                got: xs.len(),
                need: 2,
            });
        }
        if xs.len() != ys.len() {
            return Err(InterpolationError::DimensionMismatch(format!(
                "{} abscissae vs {} ordinates",
                xs.len(),
                ys.len()
            )));
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(InterpolationError::NotIncreasing { index: i });
            }
        }
        Ok(Self { xs, ys })
    }

    /// Returns the abscissa domain `(min, max)`.
    #[inline]
    pub fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Evaluates the interpolant at `x`, flat beyond the boundary knots.
    pub fn interpolate(&self, x: T) -> T {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        // Binary search for the bracketing segment.
        let mut lo = 0usize;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] <= x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let w = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        self.ys[lo] + w * (self.ys[hi] - self.ys[lo])
    }
}

/// Bilinear interpolation over a rectangular grid.
///
/// Values are stored row-major: `values[i][j]` corresponds to
/// `(xs[i], ys[j])`. Queries clamp to the grid boundary on both axes.
///
/// # Examples
///
/// ```
/// use risk_core::math::BilinearInterpolator;
///
/// let interp = BilinearInterpolator::new(
///     vec![0.0, 1.0],
///     vec![0.0, 1.0],
///     vec![vec![0.0, 1.0], vec![1.0, 2.0]],
/// ).unwrap();
/// assert!((interp.interpolate(0.5, 0.5) - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BilinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    values: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Constructs a bilinear interpolator over a rectangular grid.
    ///
    /// Both axes must be strictly increasing with at least two points, and
    /// `values` must be an `xs.len() × ys.len()` matrix.
    pub fn new(xs: Vec<T>, ys: Vec<T>, values: Vec<Vec<T>>) -> Result<Self, InterpolationError> {
        for (axis, len) in [(&xs, xs.len()), (&ys, ys.len())] {
            if len < 2 {
                return Err(InterpolationError::InsufficientData { got: len, need: 2 });
            }
            for i in 1..len {
                if axis[i] <= axis[i - 1] {
                    return Err(InterpolationError::NotIncreasing { index: i });
                }
            }
        }
        if values.len() != xs.len() || values.iter().any(|row| row.len() != ys.len()) {
            return Err(InterpolationError::DimensionMismatch(format!(
                "expected {}x{} value grid",
                xs.len(),
                ys.len()
            )));
        }
        Ok(Self { xs, ys, values })
    }

    /// Evaluates the interpolant at `(x, y)`, clamping to the grid boundary.
    pub fn interpolate(&self, x: T, y: T) -> T {
        let (i, wx) = Self::locate(&self.xs, x);
        let (j, wy) = Self::locate(&self.ys, y);

        let one = T::one();
        let v00 = self.values[i][j];
        let v01 = self.values[i][j + 1];
        let v10 = self.values[i + 1][j];
        let v11 = self.values[i + 1][j + 1];

        (one - wx) * ((one - wy) * v00 + wy * v01) + wx * ((one - wy) * v10 + wy * v11)
    }

    /// Returns the bracketing lower index and the clamped weight in [0, 1].
    fn locate(axis: &[T], v: T) -> (usize, T) {
        let n = axis.len();
        if v <= axis[0] {
            return (0, T::zero());
        }
        if v >= axis[n - 1] {
            return (n - 2, T::one());
        }
        let mut lo = 0usize;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if axis[mid] <= v {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let w = (v - axis[lo]) / (axis[lo + 1] - axis[lo]);
        (lo, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ========================================
    // Linear interpolation
    // ========================================

    #[test]
    fn test_linear_at_knots() {
        let interp =
            LinearInterpolator::new(vec![0.5, 1.0, 2.0], vec![0.02, 0.03, 0.04]).unwrap();
        assert_relative_eq!(interp.interpolate(1.0), 0.03);
    }

    #[test]
    fn test_linear_midpoint() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0], vec![0.0, 10.0]).unwrap();
        assert_relative_eq!(interp.interpolate(0.25), 2.5);
    }

    #[test]
    fn test_linear_flat_extrapolation() {
        let interp = LinearInterpolator::new(vec![1.0, 2.0], vec![5.0, 6.0]).unwrap();
        assert_relative_eq!(interp.interpolate(0.0), 5.0);
        assert_relative_eq!(interp.interpolate(10.0), 6.0);
    }

    #[test]
    fn test_linear_rejects_unsorted() {
        let result = LinearInterpolator::new(vec![1.0, 1.0, 2.0], vec![0.0, 0.0, 0.0]);
        assert_eq!(
            result.unwrap_err(),
            InterpolationError::NotIncreasing { index: 1 }
        );
    }

    #[test]
    fn test_linear_rejects_single_point() {
        let result = LinearInterpolator::new(vec![1.0], vec![5.0]);
        assert!(matches!(
            result.unwrap_err(),
            InterpolationError::InsufficientData { got: 1, need: 2 }
        ));
    }

    #[test]
    fn test_linear_rejects_mismatch() {
        let result = LinearInterpolator::new(vec![1.0, 2.0], vec![5.0]);
        assert!(matches!(
            result.unwrap_err(),
            InterpolationError::DimensionMismatch(_)
        ));
    }

    // ========================================
    // Bilinear interpolation
    // ========================================

    #[test]
    fn test_bilinear_corners() {
        let interp = BilinearInterpolator::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_relative_eq!(interp.interpolate(0.0, 0.0), 1.0);
        assert_relative_eq!(interp.interpolate(0.0, 1.0), 2.0);
        assert_relative_eq!(interp.interpolate(1.0, 0.0), 3.0);
        assert_relative_eq!(interp.interpolate(1.0, 1.0), 4.0);
    }

    #[test]
    fn test_bilinear_centre() {
        let interp = BilinearInterpolator::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_relative_eq!(interp.interpolate(0.5, 0.5), 2.5);
    }

    #[test]
    fn test_bilinear_clamps() {
        let interp = BilinearInterpolator::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_relative_eq!(interp.interpolate(-5.0, -5.0), 1.0);
        assert_relative_eq!(interp.interpolate(5.0, 5.0), 4.0);
    }

    #[test]
    fn test_bilinear_rejects_ragged_grid() {
        let result = BilinearInterpolator::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0], vec![3.0]],
        );
        assert!(matches!(
            result.unwrap_err(),
            InterpolationError::DimensionMismatch(_)
        ));
    }
}
