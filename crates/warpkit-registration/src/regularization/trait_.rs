//! Regularizer trait definition.
//!
//! This module defines the core trait for all deformation regularizers and the
//! finite-difference kernels they are built from.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;

/// Trait for displacement field regularizers.
///
/// Regularizers penalise non-smooth dense displacement fields during
/// registration.
///
/// # Type Parameters
/// * `B` - The backend type
pub trait Regularizer<B: Backend> {
    /// Compute the weighted regularization loss for a displacement field.
    ///
    /// # Arguments
    /// * `ddf` - Displacement field of shape `[B, D1, D2, D3, 3]`
    ///
    /// # Returns
    /// Per-batch loss of shape `[B]`, already multiplied by [`Self::weight`].
    fn compute_loss(&self, ddf: Tensor<B, 5>) -> Result<Tensor<B, 1>>;

    /// Get the weight (scaling factor) for this regularizer.
    fn weight(&self) -> f64;

    /// Set the weight (scaling factor) for this regularizer.
    fn set_weight(&mut self, weight: f64);
}

/// Utility functions for computing spatial gradients.
pub mod utils {
    use std::ops::Range;

    use burn::tensor::backend::Backend;
    use burn::tensor::Tensor;

    use crate::error::{RegistrationError, Result};

    /// One of the three spatial axes of a `[B, D1, D2, D3, ...]` tensor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SpatialAxis {
        X,
        Y,
        Z,
    }

    impl SpatialAxis {
        /// Tensor dimension of this axis, counting the batch axis.
        pub fn dim(self) -> usize {
            match self {
                Self::X => 1,
                Self::Y => 2,
                Self::Z => 3,
            }
        }
    }

    /// Check that every spatial axis of `dims` holds at least `min_extent` voxels.
    pub fn ensure_spatial_extent(operand: &'static str, dims: &[usize], min_extent: usize) -> Result<()> {
        if dims.len() < 4 || dims[1..4].iter().any(|&extent| extent < min_extent) {
            return Err(RegistrationError::shape(
                operand,
                format!("[B, D1, D2, D3, ...] with every Di >= {min_extent}"),
                dims,
            ));
        }
        Ok(())
    }

    /// Check that `dims` is a displacement field `[B, D1, D2, D3, 3]` whose
    /// spatial axes hold at least `min_extent` voxels.
    pub fn ensure_ddf(dims: &[usize; 5], min_extent: usize) -> Result<()> {
        if dims[4] != 3 {
            return Err(RegistrationError::shape("ddf", "[B, D1, D2, D3, 3]", dims));
        }
        ensure_spatial_extent("ddf", dims, min_extent)
    }

    /// Central difference along `axis`, cropped by one voxel at both ends of
    /// every spatial axis. Trailing (channel) axes are kept whole.
    fn central_difference<B: Backend, const D: usize>(field: Tensor<B, D>, axis: SpatialAxis) -> Tensor<B, D> {
        let dims = field.dims();
        let window = |offset: usize| -> [Range<usize>; D] {
            std::array::from_fn(|dim| match dim {
                1..=3 if dim == axis.dim() => offset..dims[dim] - 2 + offset,
                1..=3 => 1..dims[dim] - 1,
                _ => 0..dims[dim],
            })
        };
        (field.clone().slice(window(2)) - field.slice(window(0))).div_scalar(2.0)
    }

    /// Gradient along the first spatial axis of a scalar field `[B, D1, D2, D3]`.
    ///
    /// `out[b, i, j, k] = (f[b, i+2, j+1, k+1] - f[b, i, j+1, k+1]) / 2`,
    /// shape `[B, D1-2, D2-2, D3-2]`.
    pub fn gradient_dx<B: Backend>(field: Tensor<B, 4>) -> Result<Tensor<B, 4>> {
        ensure_spatial_extent("field", &field.dims(), 3)?;
        Ok(central_difference(field, SpatialAxis::X))
    }

    /// Gradient along the second spatial axis, see [`gradient_dx`].
    pub fn gradient_dy<B: Backend>(field: Tensor<B, 4>) -> Result<Tensor<B, 4>> {
        ensure_spatial_extent("field", &field.dims(), 3)?;
        Ok(central_difference(field, SpatialAxis::Y))
    }

    /// Gradient along the third spatial axis, see [`gradient_dx`].
    pub fn gradient_dz<B: Backend>(field: Tensor<B, 4>) -> Result<Tensor<B, 4>> {
        ensure_spatial_extent("field", &field.dims(), 3)?;
        Ok(central_difference(field, SpatialAxis::Z))
    }

    /// Component-wise gradient of a vector field `[B, D1, D2, D3, C]` along `axis`.
    ///
    /// Returns `[B, D1-2, D2-2, D3-2, C]`.
    pub fn gradient_dxyz<B: Backend>(field: Tensor<B, 5>, axis: SpatialAxis) -> Result<Tensor<B, 5>> {
        ensure_spatial_extent("field", &field.dims(), 3)?;
        Ok(central_difference(field, axis))
    }

    /// Mean over every axis but the batch axis, `[B, ...] -> [B]`.
    pub fn batch_mean<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Tensor<B, 1> {
        let dims = tensor.dims();
        let batch = dims[0];
        let rest: usize = dims[1..].iter().product();
        tensor.reshape([batch, rest]).mean_dim(1).reshape([batch])
    }
}
