//! Window length specification
//!
//! A waveform window can be specified either as a single total sample
//! count (split evenly around the event) or as an explicit
//! (before, after) pair. The same specification type doubles as the
//! filter margin of the loader.

use serde::{Deserialize, Serialize};

/// Number of samples in a waveform window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleCount {
    /// A single total count, split as `n / 2` before and `n - n / 2` after
    Total(usize),
    /// Explicit (before, after) counts
    BeforeAfter(usize, usize),
}

impl SampleCount {
    /// Resolve to concrete (before, after) counts
    pub fn before_after(&self) -> (usize, usize) {
        match *self {
            SampleCount::Total(n) => (n / 2, n - n / 2),
            SampleCount::BeforeAfter(before, after) => (before, after),
        }
    }

    /// Total number of samples in the window
    pub fn total(&self) -> usize {
        let (before, after) = self.before_after();
        before + after
    }
}

impl Default for SampleCount {
    fn default() -> Self {
        SampleCount::Total(0)
    }
}

/// Compute the `[start, end)` sample range around `index` for a window
/// plus margin
///
/// This is the loader-side slice: `margin` rows on each side are kept
/// so an injected filter sees valid neighboring context, and are trimmed
/// after filtering. The bounds are not clamped; rows outside the trace
/// are zero-filled by the padding utilities.
pub fn window_bounds(index: i64, n_samples: SampleCount, margin: SampleCount) -> (i64, i64) {
    let (before, after) = n_samples.before_after();
    let (margin_before, margin_after) = margin.before_after();
    let start = index - (before + margin_before) as i64;
    let end = index + (after + margin_after) as i64;
    (start, end)
}
