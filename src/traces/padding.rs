//! Bounds-safe sub-range extraction with zero padding
//!
//! Waveform windows routinely overhang the start or end of a recording
//! (a spike detected near sample 0, or near the last sample). These
//! helpers copy the in-bounds rows of a sample×channel matrix and fill
//! the overhanging rows with zeros, so callers always get a window of
//! the exact length they asked for.

use ndarray::{s, Array2, ArrayView2};

use crate::error::WaveformError;

/// Return `data[start..end]` along the sample axis, zero-filling rows
/// outside the trace bounds
///
/// At most one of `start < 0` or `end > n_samples` may hold; the window
/// construction in the extractor guarantees this. Both at once is an
/// internal consistency error.
///
/// # Arguments
///
/// * `data` - Trace matrix of shape `(n_samples, n_channels)`
/// * `start` - First row of the requested range (may be negative)
/// * `end` - One past the last row of the requested range (may exceed
///   `n_samples`)
///
/// # Returns
///
/// Matrix of shape `(end - start, n_channels)`
///
/// # Errors
///
/// Returns `WaveformError::Internal` if both bounds are out of range, or
/// `WaveformError::InvalidConfig` if `start >= end`.
pub fn padded_range(
    data: ArrayView2<f32>,
    start: i64,
    end: i64,
) -> Result<Array2<f32>, WaveformError> {
    if start >= end {
        return Err(WaveformError::InvalidConfig(format!(
            "Empty padded range [{}, {})",
            start, end
        )));
    }
    let n_samples = data.nrows() as i64;
    if start < 0 && end > n_samples {
        return Err(WaveformError::Internal(format!(
            "Padded range [{}, {}) overhangs both ends of a {}-sample trace",
            start, end, n_samples
        )));
    }

    let n_out = (end - start) as usize;
    let mut out = Array2::<f32>::zeros((n_out, data.ncols()));
    if start < 0 {
        // Zero rows at the top, data below.
        let offset = (-start) as usize;
        let stop = (end.min(n_samples)) as usize;
        out.slice_mut(s![offset.., ..])
            .assign(&data.slice(s![..stop, ..]));
    } else if end > n_samples {
        // Data at the top, zero rows below.
        let copied = (n_samples - start) as usize;
        out.slice_mut(s![..copied, ..])
            .assign(&data.slice(s![start as usize.., ..]));
    } else {
        out.assign(&data.slice(s![start as usize..end as usize, ..]));
    }
    Ok(out)
}

/// Return `data[start..end]` along the sample axis, zero-filling each
/// out-of-bounds side independently
///
/// Unlike [`padded_range`], this tolerates a window wider than the whole
/// trace (both bounds out of range at once), which arbitrary caller-chosen
/// load times can produce. Returns an all-zero window when the range does
/// not intersect the trace at all.
pub fn padded_window(data: ArrayView2<f32>, start: i64, end: i64) -> Array2<f32> {
    let n_samples = data.nrows() as i64;
    let n_out = (end - start).max(0) as usize;
    let mut out = Array2::<f32>::zeros((n_out, data.ncols()));

    let copy_from = start.max(0);
    let copy_to = end.min(n_samples);
    if copy_from < copy_to {
        let offset = (copy_from - start) as usize;
        let copied = (copy_to - copy_from) as usize;
        out.slice_mut(s![offset..offset + copied, ..])
            .assign(&data.slice(s![copy_from as usize..copy_to as usize, ..]));
    }
    out
}
