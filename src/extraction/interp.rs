//! Cubic interpolation along the sample axis
//!
//! Sub-sample alignment re-samples an extracted window onto a grid
//! shifted by the fractional part of the aligned spike time. The window
//! rows sit on a uniform integer grid, so a natural cubic spline per
//! channel is fitted and evaluated at the shifted positions.

use ndarray::{Array2, ArrayView2};

use crate::error::WaveformError;

/// Minimum number of support rows for a cubic fit
const MIN_SUPPORT: usize = 4;

/// Evaluate a natural cubic spline through the window rows at the given
/// positions
///
/// Support points sit at `x = 0, 1, ..., n_rows - 1` along the sample
/// axis; each channel is splined independently.
///
/// # Arguments
///
/// * `window` - Support values, shape `(n_rows, n_channels)`
/// * `positions` - Evaluation positions in window-relative coordinates
///
/// # Returns
///
/// Matrix of shape `(positions.len(), n_channels)`
///
/// # Errors
///
/// Returns `WaveformError::Interpolation` if fewer than 4 support rows
/// exist, or any position is non-finite or outside `[0, n_rows - 1]`.
pub fn cubic_resample(
    window: ArrayView2<f32>,
    positions: &[f64],
) -> Result<Array2<f32>, WaveformError> {
    let n = window.nrows();
    if n < MIN_SUPPORT {
        return Err(WaveformError::Interpolation(format!(
            "Cubic interpolation needs at least {} support points, got {}",
            MIN_SUPPORT, n
        )));
    }
    let x_max = (n - 1) as f64;
    for &x in positions {
        if !x.is_finite() || x < 0.0 || x > x_max {
            return Err(WaveformError::Interpolation(format!(
                "Evaluation point {} outside support range [0, {}]",
                x, x_max
            )));
        }
    }

    let nc = window.ncols();
    let n_interior = n - 2;
    let mut out = Array2::<f32>::zeros((positions.len(), nc));
    let mut second = vec![0.0f64; n];
    let mut upper = vec![0.0f64; n_interior];
    let mut rhs = vec![0.0f64; n_interior];

    for c in 0..nc {
        // Second derivatives of the natural spline on the unit-spaced
        // grid. The system is tridiagonal (1, 4, 1) over the interior
        // points with zero curvature at both ends; solved with the
        // Thomas algorithm in f64.
        for k in 0..n_interior {
            let i = k + 1;
            rhs[k] = 6.0
                * (window[(i - 1, c)] as f64 - 2.0 * window[(i, c)] as f64
                    + window[(i + 1, c)] as f64);
        }
        upper[0] = 1.0 / 4.0;
        rhs[0] /= 4.0;
        for k in 1..n_interior {
            let denom = 4.0 - upper[k - 1];
            upper[k] = 1.0 / denom;
            rhs[k] = (rhs[k] - rhs[k - 1]) / denom;
        }
        second[0] = 0.0;
        second[n - 1] = 0.0;
        second[n_interior] = rhs[n_interior - 1];
        for k in (0..n_interior - 1).rev() {
            second[k + 1] = rhs[k] - upper[k] * second[k + 2];
        }

        for (row, &x) in positions.iter().enumerate() {
            // Interval index, clamped so x == n - 1 lands in the last one.
            let i = (x.floor() as usize).min(n - 2);
            let t = x - i as f64;
            let u = 1.0 - t;
            let y0 = window[(i, c)] as f64;
            let y1 = window[(i + 1, c)] as f64;
            let value = y0 * u + y1 * t
                + ((u * u * u - u) * second[i] + (t * t * t - t) * second[i + 1]) / 6.0;
            out[(row, c)] = value as f32;
        }
    }
    Ok(out)
}
