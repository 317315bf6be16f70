//! Bending energy regularization for displacement fields.
//!
//! Bending energy (thin-plate bending energy) penalizes second-order spatial
//! derivatives of the displacement field, encouraging deformations with
//! minimal curvature:
//!
//! R(u) = (∂xx u)² + (∂yy u)² + (∂zz u)² + 2(∂xy u)² + 2(∂yz u)² + 2(∂xz u)²
//!
//! Second derivatives are central differences of central differences, so the
//! field is cropped by two voxels on each side of every spatial axis.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::utils::{batch_mean, ensure_ddf, gradient_dxyz, SpatialAxis};
use super::trait_::Regularizer;
use crate::error::{RegistrationError, Result};

/// Bending energy of a displacement field `[B, D1, D2, D3, 3]`.
///
/// Returns `[B]`. Every spatial axis must hold at least 5 voxels.
pub fn bending_energy<B: Backend>(ddf: Tensor<B, 5>) -> Result<Tensor<B, 1>> {
    ensure_ddf(&ddf.dims(), 5)?;

    let dx = gradient_dxyz(ddf.clone(), SpatialAxis::X)?;
    let dy = gradient_dxyz(ddf.clone(), SpatialAxis::Y)?;
    let dz = gradient_dxyz(ddf, SpatialAxis::Z)?;

    let dxx = gradient_dxyz(dx.clone(), SpatialAxis::X)?;
    let dyy = gradient_dxyz(dy.clone(), SpatialAxis::Y)?;
    let dzz = gradient_dxyz(dz, SpatialAxis::Z)?;
    let dxy = gradient_dxyz(dx.clone(), SpatialAxis::Y)?;
    let dyz = gradient_dxyz(dy, SpatialAxis::Z)?;
    let dxz = gradient_dxyz(dx, SpatialAxis::Z)?;

    let energy = dxx.powf_scalar(2.0)
        + dyy.powf_scalar(2.0)
        + dzz.powf_scalar(2.0)
        + (dxy.powf_scalar(2.0) + dyz.powf_scalar(2.0) + dxz.powf_scalar(2.0)).mul_scalar(2.0);
    Ok(batch_mean(energy))
}

/// Bending energy regularizer for displacement fields.
///
/// # Example
///
/// ```rust,ignore
/// use warpkit_registration::regularization::{BendingEnergyRegularizer, Regularizer};
///
/// let reg = BendingEnergyRegularizer::new(0.1)?;
/// let ddf = Tensor::zeros([1, 32, 32, 32, 3], &device);
/// let loss = reg.compute_loss(ddf)?; // [1]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BendingEnergyRegularizer {
    weight: f64,
}

impl BendingEnergyRegularizer {
    /// Create a new bending energy regularizer.
    ///
    /// # Arguments
    /// * `weight` - The weight (scaling factor) for this regularizer.
    pub fn new(weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(RegistrationError::invalid_configuration(format!(
                "regularization weight must be finite and non-negative, got {weight}"
            )));
        }
        Ok(Self { weight })
    }
}

impl Default for BendingEnergyRegularizer {
    fn default() -> Self {
        Self { weight: 1.0 }
    }
}

impl<B: Backend> Regularizer<B> for BendingEnergyRegularizer {
    fn compute_loss(&self, ddf: Tensor<B, 5>) -> Result<Tensor<B, 1>> {
        Ok(bending_energy(ddf)?.mul_scalar(self.weight))
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}
