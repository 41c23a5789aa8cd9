//! Error types for waveform extraction and loading

use std::fmt;

/// Errors that can occur while extracting or loading waveforms
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformError {
    /// A component references a channel absent from the channel topology.
    /// Dead channels must be excluded upstream by the detector.
    DeadChannel(usize),

    /// A requested load time falls outside the trace buffer
    InvalidTime {
        /// Buffer-relative sample time that was requested
        time: i64,
        /// Number of samples in the trace buffer
        n_samples: usize,
    },

    /// Interpolation grid is degenerate (too few support points, or the
    /// evaluation points leave the support range)
    Interpolation(String),

    /// Array shapes violate a documented contract
    ShapeMismatch(String),

    /// Invalid construction parameters
    InvalidConfig(String),

    /// Internal invariant breakage that callers cannot trigger through
    /// the documented API
    Internal(String),
}

impl fmt::Display for WaveformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveformError::DeadChannel(channel) => write!(
                f,
                "Channel {} appears to be dead and should have been \
                 excluded from the threshold crossings",
                channel
            ),
            WaveformError::InvalidTime { time, n_samples } => {
                write!(f, "Invalid time {}/{}", time, n_samples)
            }
            WaveformError::Interpolation(msg) => write!(f, "Interpolation error: {}", msg),
            WaveformError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            WaveformError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            WaveformError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WaveformError {}
