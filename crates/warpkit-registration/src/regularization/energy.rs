//! Deformation energy selection.
//!
//! Names the available regularization energies and builds the matching
//! [`Regularizer`] from a serializable configuration.

use std::fmt;
use std::str::FromStr;

use burn::config::Config;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use super::bending_energy::{bending_energy, BendingEnergyRegularizer};
use super::gradient_norm::{gradient_norm, GradientNormRegularizer};
use super::trait_::Regularizer;
use crate::error::{RegistrationError, Result};

/// Deformation energies available for displacement field regularization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeformationEnergy {
    #[default]
    #[serde(rename = "bending")]
    Bending,
    #[serde(rename = "gradient-l1")]
    GradientL1,
    #[serde(rename = "gradient-l2")]
    GradientL2,
}

impl DeformationEnergy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bending => "bending",
            Self::GradientL1 => "gradient-l1",
            Self::GradientL2 => "gradient-l2",
        }
    }
}

impl fmt::Display for DeformationEnergy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeformationEnergy {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bending" => Ok(Self::Bending),
            "gradient-l1" => Ok(Self::GradientL1),
            "gradient-l2" => Ok(Self::GradientL2),
            other => Err(RegistrationError::UnsupportedEnergy(other.to_string())),
        }
    }
}

/// Unweighted deformation energy of `ddf` `[B, D1, D2, D3, 3]`, shape `[B]`.
pub fn local_displacement_energy<B: Backend>(ddf: Tensor<B, 5>, energy: DeformationEnergy) -> Result<Tensor<B, 1>> {
    tracing::trace!(%energy, dims = ?ddf.dims(), "local displacement energy");
    match energy {
        DeformationEnergy::Bending => bending_energy(ddf),
        DeformationEnergy::GradientL1 => gradient_norm(ddf, true),
        DeformationEnergy::GradientL2 => gradient_norm(ddf, false),
    }
}

/// Configuration for a displacement field regularizer.
#[derive(Config, Debug, PartialEq)]
pub struct RegularizationConfig {
    /// Penalised energy.
    #[config(default = "DeformationEnergy::Bending")]
    pub energy: DeformationEnergy,
    /// Scaling factor applied to the per-batch energy.
    #[config(default = "1.0")]
    pub weight: f64,
}

impl RegularizationConfig {
    /// Build the regularizer selected by `energy`.
    pub fn init<B: Backend>(&self) -> Result<Box<dyn Regularizer<B>>> {
        tracing::debug!(energy = %self.energy, weight = self.weight, "built regularizer");
        Ok(match self.energy {
            DeformationEnergy::Bending => Box::new(BendingEnergyRegularizer::new(self.weight)?),
            DeformationEnergy::GradientL1 => Box::new(GradientNormRegularizer::new(self.weight, true)?),
            DeformationEnergy::GradientL2 => Box::new(GradientNormRegularizer::new(self.weight, false)?),
        })
    }
}
