//! Windowed waveform loader
//!
//! Random-access retrieval of fixed-length waveform windows from a trace
//! buffer at arbitrary integer sample times. The buffer is externally
//! owned (possibly memory-mapped upstream) and never mutated here.

use std::sync::Arc;

use ndarray::{s, Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::WaveformError;
use crate::traces::padding::padded_window;
use crate::traces::window::{window_bounds, SampleCount};

/// Filter strategy: a transform from a window to a filtered window of
/// the same shape, injected at construction
pub type FilterTransform = Arc<dyn Fn(ArrayView2<f32>) -> Array2<f32> + Send + Sync>;

/// Identity transform, the default when no filter is configured
fn identity_filter() -> FilterTransform {
    Arc::new(|window: ArrayView2<f32>| window.to_owned())
}

/// Loader configuration
///
/// Everything except `n_samples` is optional and independently
/// toggleable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Time (in samples) of the buffer's first sample, for time-base
    /// translation
    pub offset: i64,
    /// Target window length
    pub n_samples: SampleCount,
    /// Extra samples kept on each side so the filter produces valid
    /// output over the requested window; trimmed after filtering
    pub filter_margin: SampleCount,
    /// Channel subset to keep, in order; `None` keeps all channels
    pub channels: Option<Vec<usize>>,
    /// Linear scale factor applied to loaded batches
    pub scale_factor: Option<f32>,
    /// DC offset subtracted from loaded batches (before scaling)
    pub dc_offset: Option<f32>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            offset: 0,
            n_samples: SampleCount::default(),
            filter_margin: SampleCount::Total(0),
            channels: None,
            scale_factor: None,
            dc_offset: None,
        }
    }
}

/// Loads fixed-length waveform windows from traces
///
/// Stateless across calls apart from the attached trace buffer; safe to
/// share between threads as long as the buffer is not swapped
/// concurrently with loads.
#[derive(Clone)]
pub struct WaveformLoader {
    config: LoaderConfig,
    filter: FilterTransform,
    traces: Option<Arc<Array2<f32>>>,
}

impl WaveformLoader {
    /// Build a loader without a filter (identity transform)
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::InvalidConfig` if the target window has
    /// zero length.
    pub fn new(config: LoaderConfig) -> Result<Self, WaveformError> {
        Self::with_filter(config, identity_filter())
    }

    /// Build a loader with an injected filter transform
    ///
    /// The filter sees the full margin-inclusive window and must return
    /// a window of the same shape.
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::InvalidConfig` if the target window has
    /// zero length.
    pub fn with_filter(
        config: LoaderConfig,
        filter: FilterTransform,
    ) -> Result<Self, WaveformError> {
        if config.n_samples.total() == 0 {
            return Err(WaveformError::InvalidConfig(
                "'n_samples' must be specified and non-zero".to_string(),
            ));
        }
        Ok(Self {
            config,
            filter,
            traces: None,
        })
    }

    /// Attach a trace buffer
    pub fn set_traces(&mut self, traces: Arc<Array2<f32>>) {
        self.traces = Some(traces);
    }

    /// Detach the trace buffer; subsequent batch loads return zeros
    pub fn clear_traces(&mut self) {
        self.traces = None;
    }

    /// Number of samples in the attached trace buffer (0 when unset)
    pub fn n_samples_trace(&self) -> usize {
        self.traces.as_ref().map_or(0, |t| t.nrows())
    }

    /// Number of samples in each returned waveform
    pub fn n_samples_out(&self) -> usize {
        self.config.n_samples.total()
    }

    /// Number of channels in each returned waveform (subset size, or the
    /// full trace channel count)
    pub fn n_channels_out(&self) -> usize {
        match &self.config.channels {
            Some(channels) => channels.len(),
            None => self.traces.as_ref().map_or(0, |t| t.ncols()),
        }
    }

    /// Load a single waveform at an absolute sample time
    ///
    /// The time is translated into buffer coordinates via the configured
    /// offset. The margin-inclusive window is extracted (zero-padded at
    /// the buffer boundaries), filtered, trimmed of its margin, and
    /// restricted to the channel subset.
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::InvalidTime` if the translated time falls
    /// outside the buffer, or `WaveformError::InvalidConfig` if no
    /// buffer is attached.
    pub fn load_at(&self, time: i64) -> Result<Array2<f32>, WaveformError> {
        let traces = self.traces.as_ref().ok_or_else(|| {
            WaveformError::InvalidConfig("No traces attached".to_string())
        })?;
        let n_trace = traces.nrows();
        let time_o = time - self.config.offset;
        if time_o < 0 || time_o >= n_trace as i64 {
            return Err(WaveformError::InvalidTime {
                time: time_o,
                n_samples: n_trace,
            });
        }

        let (start, end) = window_bounds(time_o, self.config.n_samples, self.config.filter_margin);
        let extract = padded_window(traces.view(), start, end);

        // The filter sees the margin-inclusive window so it has valid
        // neighboring context; its edge effects land in the margin.
        let filtered = (self.filter)(extract.view());
        if filtered.dim() != extract.dim() {
            return Err(WaveformError::ShapeMismatch(format!(
                "Filter changed the window shape from {:?} to {:?}",
                extract.dim(),
                filtered.dim()
            )));
        }

        let (margin_before, _) = self.config.filter_margin.before_after();
        let n_out = self.n_samples_out();
        let trimmed = filtered.slice(s![margin_before..margin_before + n_out, ..]);

        let out = match &self.config.channels {
            Some(channels) => trimmed.select(Axis(1), channels),
            None => trimmed.to_owned(),
        };
        debug_assert_eq!(out.nrows(), n_out);
        Ok(out)
    }

    /// Load a batch of waveforms at the given absolute sample times
    ///
    /// The output is zero-initialized; a time outside the buffer logs a
    /// warning and leaves its slot zero rather than aborting the batch.
    /// When no trace buffer is attached the whole batch is zeros. DC
    /// offset subtraction and scale factor multiplication apply
    /// uniformly across the batch after loading.
    ///
    /// # Errors
    ///
    /// Only invalid times are recoverable per item; any other per-item
    /// failure (a misbehaving filter transform, for one) is a contract
    /// violation and aborts the batch.
    pub fn load_batch(&self, times: &[i64]) -> Result<Array3<f32>, WaveformError> {
        let shape = (times.len(), self.n_samples_out(), self.n_channels_out());
        let mut waveforms = Array3::<f32>::zeros(shape);
        if self.n_samples_trace() == 0 {
            return Ok(waveforms);
        }

        for (i, &time) in times.iter().enumerate() {
            match self.load_at(time) {
                Ok(waveform) => waveforms.index_axis_mut(Axis(0), i).assign(&waveform),
                Err(err @ WaveformError::InvalidTime { .. }) => {
                    // Skip-and-continue: the slot stays explicitly zero.
                    log::warn!("Error while loading waveform: {}", err);
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(dc_offset) = self.config.dc_offset {
            waveforms -= dc_offset;
        }
        if let Some(scale_factor) = self.config.scale_factor {
            waveforms *= scale_factor;
        }
        Ok(waveforms)
    }

    /// Scalar convenience around the batch path
    ///
    /// # Errors
    ///
    /// Same as [`load_batch`](Self::load_batch).
    pub fn load(&self, time: i64) -> Result<Array2<f32>, WaveformError> {
        Ok(self
            .load_batch(&[time])?
            .index_axis(Axis(0), 0)
            .to_owned())
    }
}
