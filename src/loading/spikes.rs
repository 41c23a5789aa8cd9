//! Spike-id indexed waveform retrieval
//!
//! Thin translation layer: maps spike identifiers to the sample times
//! recorded for them and delegates the actual loading to a
//! [`WaveformLoader`].

use std::sync::Arc;

use ndarray::Array3;

use crate::error::WaveformError;
use crate::loading::loader::WaveformLoader;

/// Translates spike-id selections into absolute-time selections
#[derive(Clone)]
pub struct SpikeLoader {
    loader: Arc<WaveformLoader>,
    spike_samples: Vec<i64>,
}

impl SpikeLoader {
    /// Build a spike loader over a per-spike sample time table
    pub fn new(loader: Arc<WaveformLoader>, spike_samples: Vec<i64>) -> Self {
        Self {
            loader,
            spike_samples,
        }
    }

    /// Number of spikes in the time table
    pub fn len(&self) -> usize {
        self.spike_samples.len()
    }

    /// Whether the time table is empty
    pub fn is_empty(&self) -> bool {
        self.spike_samples.is_empty()
    }

    /// Composite shape: (n_spikes, window_length, n_output_channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.spike_samples.len(),
            self.loader.n_samples_out(),
            self.loader.n_channels_out(),
        )
    }

    /// Load the waveforms for the given spike ids
    ///
    /// # Errors
    ///
    /// Returns `WaveformError::InvalidConfig` if an id is outside the
    /// time table, and propagates batch-load contract violations from
    /// the underlying loader.
    pub fn load(&self, spike_ids: &[usize]) -> Result<Array3<f32>, WaveformError> {
        let times = spike_ids
            .iter()
            .map(|&id| {
                self.spike_samples.get(id).copied().ok_or_else(|| {
                    WaveformError::InvalidConfig(format!(
                        "Spike id {} outside the time table of length {}",
                        id,
                        self.spike_samples.len()
                    ))
                })
            })
            .collect::<Result<Vec<i64>, _>>()?;
        self.loader.load_batch(&times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::loader::LoaderConfig;
    use crate::traces::window::SampleCount;
    use ndarray::Array2;

    fn loader_with_traces() -> Arc<WaveformLoader> {
        let mut loader = WaveformLoader::new(LoaderConfig {
            n_samples: SampleCount::BeforeAfter(1, 1),
            ..LoaderConfig::default()
        })
        .unwrap();
        let traces = Array2::from_shape_fn((50, 2), |(s, c)| (s * 10 + c) as f32);
        loader.set_traces(Arc::new(traces));
        Arc::new(loader)
    }

    #[test]
    fn test_shape_and_len() {
        let spikes = SpikeLoader::new(loader_with_traces(), vec![10, 20, 30]);
        assert_eq!(spikes.len(), 3);
        assert!(!spikes.is_empty());
        assert_eq!(spikes.shape(), (3, 2, 2));
    }

    #[test]
    fn test_load_matches_direct_loader_call() {
        let loader = loader_with_traces();
        let spikes = SpikeLoader::new(loader.clone(), vec![10, 20, 30]);
        let by_id = spikes.load(&[0, 2]).unwrap();
        let by_time = loader.load_batch(&[10, 30]).unwrap();
        assert_eq!(by_id.dim(), (2, 2, 2));
        assert_eq!(by_id, by_time);
    }

    #[test]
    fn test_out_of_range_id() {
        let spikes = SpikeLoader::new(loader_with_traces(), vec![10]);
        assert!(spikes.load(&[1]).is_err());
    }
}
