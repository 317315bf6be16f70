//! Error types for regularization operations.

use thiserror::Error;
use warpkit_core::WarpError;

/// Main error type for regularization operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// Error raised by the warping kernel, including shape contract violations.
    #[error(transparent)]
    Warp(#[from] WarpError),

    /// The requested deformation energy is not implemented.
    #[error("Deformation energy `{0}` is not implemented (expected `bending`, `gradient-l1` or `gradient-l2`)")]
    UnsupportedEnergy(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for regularization operations.
pub type Result<T, E = RegistrationError> = std::result::Result<T, E>;

impl RegistrationError {
    /// Create a shape mismatch error for `operand`.
    pub fn shape(operand: &'static str, expected: impl Into<String>, actual: &[usize]) -> Self {
        Self::Warp(WarpError::shape(operand, expected, actual))
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistrationError::invalid_configuration("negative weight");
        assert_eq!(err.to_string(), "Invalid configuration: negative weight");
    }

    #[test]
    fn test_warp_error_is_transparent() {
        let err: RegistrationError = WarpError::shape("ddf", "[B, D1, D2, D3, 3]", &[1, 2, 2, 2, 2]).into();
        assert!(err.to_string().starts_with("Shape mismatch for `ddf`"));
        assert!(matches!(
            err,
            RegistrationError::Warp(WarpError::ShapeMismatch { operand: "ddf", .. })
        ));
    }
}
