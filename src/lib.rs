//! # Spikewave
//!
//! Waveform extraction, sub-sample alignment, and channel masking for
//! extracellular spike sorting.
//!
//! ## Features
//!
//! - **Extraction**: decodes connected components of threshold crossings
//!   into a time window and channel group, with a sparse event waveform
//! - **Alignment**: amplitude-weighted temporal centroid plus cubic
//!   interpolation for sub-sample peak alignment
//! - **Masks**: continuous per-channel membership in `[0, 1]` from
//!   normalized peak amplitudes
//! - **Loading**: random-access batches of fixed-length, optionally
//!   filtered, optionally channel-subset waveforms with boundary padding
//!
//! ## Quick Start
//!
//! ```
//! use std::collections::BTreeMap;
//! use ndarray::Array2;
//! use spikewave::{
//!     ChannelTopology, Component, ExtractorConfig, Thresholds, WaveformExtractor,
//! };
//!
//! let mut groups = BTreeMap::new();
//! groups.insert(0, vec![0]);
//! let extractor = WaveformExtractor::new(
//!     ExtractorConfig { extract_before: 2, extract_after: 3, weight_power: 1.0 },
//!     Thresholds::new(2.0, 10.0)?,
//!     ChannelTopology::new(groups)?,
//! )?;
//!
//! let mut filtered = Array2::<f32>::zeros((1000, 1));
//! filtered[(100, 0)] = 4.0;
//! filtered[(101, 0)] = 6.0;
//! filtered[(102, 0)] = 9.0;
//! let raw = filtered.clone();
//!
//! let component = Component::new(vec![(100, 0), (101, 0), (102, 0)]);
//! let spike = extractor.extract_spike(&component, raw.view(), filtered.view())?;
//!
//! assert_eq!(spike.waveform.dim(), (5, 1));
//! assert!(spike.time > 100.0 && spike.time < 102.0);
//! # Ok::<(), spikewave::WaveformError>(())
//! ```
//!
//! ## Architecture
//!
//! The detection path flows detector → component → [`WaveformExtractor`]
//! → (group, aligned time, aligned waveform, mask). The random-access
//! path flows caller-supplied times or spike ids → [`SpikeLoader`] /
//! [`WaveformLoader`] → waveform batches, independent of detection.
//!
//! The detector itself, the band-pass filter (injected as a transform),
//! and trace storage are external collaborators.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod extraction;
pub mod loading;
pub mod traces;

// Re-export main types
pub use error::WaveformError;
pub use extraction::component::{Component, ComponentWindow};
pub use extraction::extractor::{
    ExtractedSpike, ExtractorConfig, Thresholds, WaveformExtractor,
};
pub use extraction::topology::ChannelTopology;
pub use loading::loader::{FilterTransform, LoaderConfig, WaveformLoader};
pub use loading::spikes::SpikeLoader;
pub use traces::window::SampleCount;
