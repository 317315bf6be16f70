//! Interpolation and boundary modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WarpError;

/// Interpolation scheme used by the sampler.
///
/// Only linear interpolation is implemented. Any other requested mode is
/// rejected when parsed instead of silently degrading to linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// N-linear interpolation over the `2^n` hypercube corners.
    #[default]
    Linear,
}

impl FromStr for Interpolation {
    type Err = WarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            other => Err(WarpError::UnsupportedInterpolation(other.to_string())),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
        }
    }
}

/// How samples outside `[0, D - 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Clamp coordinates to the volume, repeating edge values.
    #[default]
    Replicate,
    /// Corners outside the volume contribute zero.
    Zero,
}

impl FromStr for Boundary {
    type Err = WarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replicate" => Ok(Self::Replicate),
            "zero" => Ok(Self::Zero),
            other => Err(WarpError::UnsupportedBoundary(other.to_string())),
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replicate => f.write_str("replicate"),
            Self::Zero => f.write_str("zero"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interpolation() {
        assert_eq!("linear".parse::<Interpolation>().unwrap(), Interpolation::Linear);
        let err = "nearest".parse::<Interpolation>().unwrap_err();
        assert_eq!(err, WarpError::UnsupportedInterpolation("nearest".to_string()));
    }

    #[test]
    fn test_parse_boundary() {
        assert_eq!("zero".parse::<Boundary>().unwrap(), Boundary::Zero);
        assert_eq!(Boundary::default(), Boundary::Replicate);
        assert!("reflect".parse::<Boundary>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for boundary in [Boundary::Replicate, Boundary::Zero] {
            assert_eq!(boundary.to_string().parse::<Boundary>().unwrap(), boundary);
        }
        assert_eq!(Interpolation::Linear.to_string(), "linear");
    }
}
