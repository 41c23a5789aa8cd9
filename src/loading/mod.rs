//! Random-access waveform retrieval
//!
//! Fixed-length waveform windows loaded from raw or filtered traces at
//! arbitrary sample times, independent of the detection path:
//! - Batch loader with boundary padding, optional filtering, channel
//!   subsetting, and scaling
//! - Spike-id indexed loader delegating to the batch loader

pub mod loader;
pub mod spikes;
