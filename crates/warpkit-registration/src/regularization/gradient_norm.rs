//! First-order gradient norm regularization for displacement fields.
//!
//! The penalty is the per-batch mean over the cropped interior of
//!
//! L1: |∂x u| + |∂y u| + |∂z u|
//!
//! L2: (∂x u)² + (∂y u)² + (∂z u)²
//!
//! taken component-wise with central differences.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::utils::{batch_mean, ensure_ddf, gradient_dxyz, SpatialAxis};
use super::trait_::Regularizer;
use crate::error::{RegistrationError, Result};

/// Gradient norm of a displacement field `[B, D1, D2, D3, 3]`.
///
/// Returns `[B]`. Every spatial axis must hold at least 3 voxels.
pub fn gradient_norm<B: Backend>(ddf: Tensor<B, 5>, l1: bool) -> Result<Tensor<B, 1>> {
    ensure_ddf(&ddf.dims(), 3)?;

    let dx = gradient_dxyz(ddf.clone(), SpatialAxis::X)?;
    let dy = gradient_dxyz(ddf.clone(), SpatialAxis::Y)?;
    let dz = gradient_dxyz(ddf, SpatialAxis::Z)?;

    let norms = if l1 {
        dx.abs() + dy.abs() + dz.abs()
    } else {
        dx.powf_scalar(2.0) + dy.powf_scalar(2.0) + dz.powf_scalar(2.0)
    };
    Ok(batch_mean(norms))
}

/// Gradient norm regularizer.
///
/// Penalises first-order spatial derivatives; the L1 variant is the
/// anisotropic total variation of the field.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientNormRegularizer {
    weight: f64,
    l1: bool,
}

impl GradientNormRegularizer {
    /// Create a new gradient norm regularizer.
    ///
    /// # Arguments
    /// * `weight` - The weight (scaling factor) for this regularizer
    /// * `l1` - Use absolute values instead of squares
    pub fn new(weight: f64, l1: bool) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(RegistrationError::invalid_configuration(format!(
                "regularization weight must be finite and non-negative, got {weight}"
            )));
        }
        Ok(Self { weight, l1 })
    }

    /// Whether the L1 variant is used.
    pub fn is_l1(&self) -> bool {
        self.l1
    }
}

impl<B: Backend> Regularizer<B> for GradientNormRegularizer {
    fn compute_loss(&self, ddf: Tensor<B, 5>) -> Result<Tensor<B, 1>> {
        Ok(gradient_norm(ddf, self.l1)?.mul_scalar(self.weight))
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}
