//! Waveform extraction from detected spike events
//!
//! This module turns a connected component of threshold crossings into a
//! characterized spike:
//! - Channel topology (electrode groups / shanks)
//! - Component resolution into a time window
//! - Cubic interpolation for sub-sample alignment
//! - The extraction pipeline itself (sparse wave, masks, aligned time,
//!   aligned waveform)

pub mod component;
pub mod extractor;
pub mod interp;
pub mod topology;
