//! Trace window utilities
//!
//! Bounds-safe extraction of sample ranges from sample×channel trace
//! matrices:
//! - Padding (zero fill outside the trace bounds)
//! - Window specification (total sample count or explicit before/after)

pub mod padding;
pub mod window;
