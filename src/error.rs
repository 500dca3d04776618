//! Error types for ACT cells and ponder-cost tracking.

use thiserror::Error;

use crate::state::StateLayout;

/// Result type for ACT operations.
pub type ActResult<T> = Result<T, ActError>;

/// Errors that can occur while building or running an ACT cell.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActError {
    /// Invalid construction parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tensor dimensions do not match what the cell was built for
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A plain state was passed where an LSTM pair is required, or vice versa
    #[error("State layout mismatch: expected {expected:?}, got {got:?}")]
    StateLayoutMismatch {
        expected: StateLayout,
        got: StateLayout,
    },

    /// Ponder cost queried before any timestep was recorded
    #[error("No timesteps recorded - run the cell at least once before computing the ponder cost")]
    NoTimestepsRecorded,
}

impl ActError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
