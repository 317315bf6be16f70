//! Error types for warping operations.
//!
//! Every contract violation is reported eagerly with the name of the
//! offending operand so that a caller bug can be traced back to its source.

use thiserror::Error;

/// Main error type for grid, sampling and transform operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarpError {
    /// An operand does not have the shape required by the operation.
    #[error("Shape mismatch for `{operand}`: expected {expected}, got {actual:?}")]
    ShapeMismatch {
        operand: &'static str,
        expected: String,
        actual: Vec<usize>,
    },

    /// The requested interpolation mode is not implemented.
    #[error("Interpolation `{0}` is not implemented (only `linear` is supported)")]
    UnsupportedInterpolation(String),

    /// The requested boundary mode is not implemented.
    #[error("Boundary mode `{0}` is not implemented (expected `replicate` or `zero`)")]
    UnsupportedBoundary(String),

    /// Invalid configuration or argument value.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Linear-algebra failure while solving for a transform.
    #[error("Solver error: {0}")]
    Solver(String),
}

/// Result type for warping operations.
pub type Result<T, E = WarpError> = std::result::Result<T, E>;

impl WarpError {
    /// Create a shape mismatch error.
    pub fn shape(operand: &'static str, expected: impl Into<String>, actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            operand,
            expected: expected.into(),
            actual: actual.to_vec(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Check that `dims` equals `expected` exactly.
pub fn ensure_dims(operand: &'static str, dims: &[usize], expected: &[usize]) -> Result<()> {
    if dims != expected {
        return Err(WarpError::shape(operand, format!("{expected:?}"), dims));
    }
    Ok(())
}
