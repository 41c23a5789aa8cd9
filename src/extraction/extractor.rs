//! Waveform extraction pipeline
//!
//! Turns one connected component of threshold crossings plus the raw and
//! filtered traces into a characterized spike: owning group, sub-sample
//! aligned time, aligned waveform, and per-channel mask.
//!
//! The mask and alignment computations run on a *sparse* event waveform
//! that carries amplitude only at the exact crossing points; everything
//! else is zero. This isolates the detected activity from background
//! noise on non-crossing samples and channels.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::WaveformError;
use crate::extraction::component::{Component, ComponentWindow};
use crate::extraction::interp::cubic_resample;
use crate::extraction::topology::ChannelTopology;
use crate::traces::padding::padded_range;

/// Samples prepended to the component's earliest crossing
const WINDOW_MARGIN_BEFORE: usize = 3;
/// Samples appended after the component's latest crossing
const WINDOW_MARGIN_AFTER: usize = 4;

/// Weak/strong detection thresholds used to normalize amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Weak threshold: amplitudes at or below it normalize to 0
    pub weak: f32,
    /// Strong threshold: amplitudes at or above it normalize to 1
    pub strong: f32,
}

impl Thresholds {
    /// Build a validated threshold pair
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::InvalidConfig` unless both values are
    /// finite and `strong > weak`; an inverted pair would silently
    /// produce out-of-order clipping.
    pub fn new(weak: f32, strong: f32) -> Result<Self, WaveformError> {
        if !weak.is_finite() || !strong.is_finite() {
            return Err(WaveformError::InvalidConfig(format!(
                "Thresholds must be finite, got weak={}, strong={}",
                weak, strong
            )));
        }
        if strong <= weak {
            return Err(WaveformError::InvalidConfig(format!(
                "Strong threshold must exceed weak threshold, got weak={}, strong={}",
                weak, strong
            )));
        }
        Ok(Self { weak, strong })
    }
}

/// Extraction window configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Samples kept before the aligned peak
    pub extract_before: usize,
    /// Samples kept after the aligned peak
    pub extract_after: usize,
    /// Exponent applied to normalized amplitudes when computing the
    /// temporal centroid; values above 1 bias toward sharper peaks
    pub weight_power: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            extract_before: 10,
            extract_after: 10,
            weight_power: 1.0,
        }
    }
}

/// One fully characterized spike event
#[derive(Debug, Clone)]
pub struct ExtractedSpike {
    /// Electrode group (shank) the event occurred on
    pub group: usize,
    /// Sub-sample aligned event time, in samples
    pub time: f64,
    /// Aligned waveform, shape `(extract_before + extract_after, n_members)`
    pub waveform: Array2<f32>,
    /// Per-member-channel soft membership in `[0, 1]`
    pub mask: Array1<f32>,
}

/// Extracts aligned waveforms and masks from detected components
///
/// Stateless across calls apart from the threshold configuration, which
/// can be replaced at runtime for adaptive thresholding.
#[derive(Debug, Clone)]
pub struct WaveformExtractor {
    config: ExtractorConfig,
    thresholds: Thresholds,
    topology: ChannelTopology,
}

impl WaveformExtractor {
    /// Build an extractor
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::InvalidConfig` if the extraction window
    /// has zero length.
    pub fn new(
        config: ExtractorConfig,
        thresholds: Thresholds,
        topology: ChannelTopology,
    ) -> Result<Self, WaveformError> {
        if config.extract_before + config.extract_after == 0 {
            return Err(WaveformError::InvalidConfig(
                "Extraction window must contain at least one sample".to_string(),
            ));
        }
        Ok(Self {
            config,
            thresholds,
            topology,
        })
    }

    /// Replace the threshold pair (supports channel-adaptive or
    /// time-varying thresholding by an external caller)
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
    }

    /// Current threshold pair
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Resolve a component against the topology and trace shape
    ///
    /// Splits the component into parallel sample/channel vectors, looks
    /// up the owning group from the first channel (all channels of a
    /// component share a shank), and computes the time window
    /// `[min - 3, max + 4)` clipped to `[0, n_samples)`.
    ///
    /// # Errors
    ///
    /// `DeadChannel` if the first channel is absent from the topology;
    /// `InvalidConfig` if the component is empty; `ShapeMismatch` if any
    /// point falls outside the traces (a detector/trace mismatch).
    pub fn resolve_component(
        &self,
        component: &Component,
        n_samples: usize,
        n_channels: usize,
    ) -> Result<ComponentWindow, WaveformError> {
        if component.is_empty() {
            return Err(WaveformError::InvalidConfig(
                "Empty component".to_string(),
            ));
        }
        let samples: Vec<usize> = component.points.iter().map(|&(s, _)| s).collect();
        let channels_hit: Vec<usize> = component.points.iter().map(|&(_, c)| c).collect();

        let (group, members) = self.topology.group_of(channels_hit[0])?;

        for &(s, c) in &component.points {
            if s >= n_samples || c >= n_channels {
                return Err(WaveformError::ShapeMismatch(format!(
                    "Component point ({}, {}) outside traces of shape ({}, {})",
                    s, c, n_samples, n_channels
                )));
            }
        }

        let (first, last) = samples
            .iter()
            .fold((usize::MAX, 0), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        let s_min = first.saturating_sub(WINDOW_MARGIN_BEFORE);
        let s_max = (last + WINDOW_MARGIN_AFTER).min(n_samples);
        if s_min >= s_max {
            return Err(WaveformError::ShapeMismatch(format!(
                "Degenerate component window [{}, {}) over {} samples",
                s_min, s_max, n_samples
            )));
        }

        Ok(ComponentWindow {
            samples,
            channels_hit,
            s_min,
            s_max,
            members: members.to_vec(),
            group,
        })
    }

    /// Build the sparse event waveform over all trace channels
    ///
    /// A zeroed `(window_length, n_channels)` buffer where only the
    /// exact crossing points carry the filtered-trace amplitude.
    pub fn component_waveform(
        &self,
        filtered: ArrayView2<f32>,
        window: &ComponentWindow,
    ) -> Array2<f32> {
        let mut wave = Array2::<f32>::zeros((window.len(), filtered.ncols()));
        for (&s, &c) in window.samples.iter().zip(&window.channels_hit) {
            wave[(s - window.s_min, c)] = filtered[(s, c)];
        }
        wave
    }

    /// Linearly map an amplitude into `[0, 1]` between the weak and
    /// strong thresholds
    #[inline]
    pub fn normalize(&self, x: f32) -> f32 {
        ((x - self.thresholds.weak) / (self.thresholds.strong - self.thresholds.weak))
            .clamp(0.0, 1.0)
    }

    /// Compute the per-member-channel soft mask
    ///
    /// Each channel touched by the component contributes its peak
    /// filtered amplitude (taken at the argmax sample of the sparse
    /// waveform); untouched channels contribute zero. Peaks are
    /// normalized into `[0, 1]` and restricted to the group's member
    /// channels.
    pub fn masks(
        &self,
        filtered: ArrayView2<f32>,
        sparse: &Array2<f32>,
        window: &ComponentWindow,
    ) -> Array1<f32> {
        let nc = filtered.ncols();

        let mut touched = vec![false; nc];
        for &c in &window.channels_hit {
            touched[c] = true;
        }

        // Per-channel argmax of the sparse waveform, as an absolute
        // sample index.
        let mut peak_values = Array1::<f32>::zeros(nc);
        for c in 0..nc {
            if !touched[c] {
                continue;
            }
            let column = sparse.index_axis(Axis(1), c);
            let mut best_row = 0;
            for (row, &v) in column.iter().enumerate() {
                if v > column[best_row] {
                    best_row = row;
                }
            }
            peak_values[c] = filtered[(best_row + window.s_min, c)];
        }

        window
            .members
            .iter()
            .map(|&c| self.normalize(peak_values[c]))
            .collect()
    }

    /// Compute the sub-sample aligned event time
    ///
    /// The amplitude-weighted temporal centroid of the normalized sparse
    /// waveform, raised to `weight_power`, across all channels and
    /// samples of the window. More robust to noise than the argmax of a
    /// single channel.
    pub fn aligned_sample(&self, sparse: &Array2<f32>, window: &ComponentWindow) -> f64 {
        let mut weight_sum = 0.0f64;
        let mut weighted_rows = 0.0f64;
        for (row, samples) in sparse.axis_iter(Axis(0)).enumerate() {
            for &v in samples {
                let w = (self.normalize(v) as f64).powf(self.config.weight_power);
                weight_sum += w;
                weighted_rows += w * row as f64;
            }
        }
        if weight_sum > 0.0 {
            weighted_rows / weight_sum + window.s_min as f64
        } else {
            // No point exceeded the weak threshold; fall back to the
            // plain mean of the component's sample indices.
            let total: usize = window.samples.iter().sum();
            total as f64 / window.samples.len() as f64
        }
    }

    /// Extract the fixed-size raw window around the aligned time
    ///
    /// The window is `[s - before - 1, s + after + 2)` where `s` is the
    /// truncated aligned time; the extra row on each side provides
    /// support points for the sub-sample shift. Restricted to the
    /// group's member channels.
    ///
    /// # Errors
    ///
    /// Propagates `WaveformError::Internal` if the window overhangs both
    /// trace ends at once (cannot happen for windows produced by
    /// `resolve_component` on realistic traces).
    pub fn extract(
        &self,
        raw: ArrayView2<f32>,
        aligned: f64,
        members: &[usize],
    ) -> Result<Array2<f32>, WaveformError> {
        let s = aligned as i64;
        let start = s - self.config.extract_before as i64 - 1;
        let end = s + self.config.extract_after as i64 + 2;
        let window = padded_range(raw, start, end)?;
        Ok(window.select(Axis(1), members))
    }

    /// Shift the extracted window by the fractional part of the aligned
    /// time
    ///
    /// Cubic-splines each channel from the integer support grid onto the
    /// grid shifted by `aligned - trunc(aligned)`, producing exactly
    /// `extract_before + extract_after` rows. On interpolation failure a
    /// warning naming the integer time is logged and the unshifted
    /// central rows are returned instead.
    pub fn align(&self, window: &Array2<f32>, aligned: f64) -> Array2<f32> {
        let s = aligned as i64;
        let shift = aligned - s as f64;
        let n_out = self.config.extract_before + self.config.extract_after;
        // Window rows cover [s - before - 1, s + after + 1]; output row k
        // sits at s - before + k + shift, i.e. k + 1 + shift relative to
        // the window start.
        let positions: Vec<f64> = (0..n_out).map(|k| (k + 1) as f64 + shift).collect();
        match cubic_resample(window.view(), &positions) {
            Ok(shifted) => shifted,
            Err(err) => {
                log::warn!("Interpolation error at time {}: {}", s, err);
                window
                    .slice(ndarray::s![1..1 + n_out, ..])
                    .to_owned()
            }
        }
    }

    /// Run the full extraction pipeline for one component
    ///
    /// # Arguments
    ///
    /// * `component` - The detected threshold-crossing component
    /// * `raw` - Unfiltered traces, shape `(n_samples, n_channels)`
    /// * `filtered` - Filtered traces, identical shape
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the trace shapes differ; `DeadChannel` /
    /// `InvalidConfig` from component resolution.
    pub fn extract_spike(
        &self,
        component: &Component,
        raw: ArrayView2<f32>,
        filtered: ArrayView2<f32>,
    ) -> Result<ExtractedSpike, WaveformError> {
        if raw.dim() != filtered.dim() {
            return Err(WaveformError::ShapeMismatch(format!(
                "Raw traces are {:?} but filtered traces are {:?}",
                raw.dim(),
                filtered.dim()
            )));
        }

        let window = self.resolve_component(component, filtered.nrows(), filtered.ncols())?;
        let sparse = self.component_waveform(filtered, &window);
        let mask = self.masks(filtered, &sparse, &window);
        let time = self.aligned_sample(&sparse, &window);

        let unaligned = self.extract(raw, time, &window.members)?;
        let waveform = self.align(&unaligned, time);

        assert_eq!(waveform.ncols(), mask.len());

        Ok(ExtractedSpike {
            group: window.group,
            time,
            waveform,
            mask,
        })
    }
}
