//! Dense displacement field warping.
//!
//! A DDF of shape `[B, F1, F2, F3, 3]` lives in fixed-image space: voxel
//! `(i, j, k)` of the warped output reads the moving image at
//! `(i, j, k) + ddf[b, i, j, k]`.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, WarpError};
use crate::grid::reference_grid;
use crate::interpolation::{Boundary, Interpolation, Resampler};

/// Configuration for [`DdfWarper`].
#[derive(Config, Debug, PartialEq)]
pub struct DdfWarperConfig {
    /// Spatial shape `[F1, F2, F3]` of the fixed image.
    pub fixed_shape: [usize; 3],
    /// Boundary handling when the DDF points outside the moving image.
    #[config(default = "Boundary::Replicate")]
    pub boundary: Boundary,
}

impl DdfWarperConfig {
    /// Build the warper and its reference grid.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<DdfWarper<B>> {
        Ok(DdfWarper::new(self.fixed_shape, device)?.with_boundary(self.boundary))
    }
}

/// Warps moving volumes into fixed space with a dense displacement field.
///
/// The fixed-space reference grid is built once and reused for every batch.
#[derive(Module, Debug)]
pub struct DdfWarper<B: Backend> {
    grid: Tensor<B, 4>,
    boundary: Ignored<Boundary>,
}

impl<B: Backend> DdfWarper<B> {
    /// Create a warper for the given fixed shape.
    ///
    /// # Errors
    /// Fails unless `fixed_shape` holds three positive extents.
    pub fn new(fixed_shape: [usize; 3], device: &B::Device) -> Result<Self> {
        let grid = reference_grid(&fixed_shape, device)?;
        tracing::debug!(?fixed_shape, "built DDF warper reference grid");
        Ok(Self {
            grid,
            boundary: Ignored(Boundary::Replicate),
        })
    }

    /// Select the boundary mode explicitly.
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Ignored(boundary);
        self
    }

    /// Spatial shape `[F1, F2, F3]` of the fixed image.
    pub fn fixed_shape(&self) -> [usize; 3] {
        let [d1, d2, d3, _] = self.grid.dims();
        [d1, d2, d3]
    }

    /// The boundary mode in use.
    pub fn boundary(&self) -> Boundary {
        *self.boundary
    }

    /// The fixed-space reference grid `[F1, F2, F3, 3]`.
    pub fn reference_grid(&self) -> Tensor<B, 4> {
        self.grid.clone()
    }

    /// Sampling coordinates `grid + ddf`, shape `[B, F1, F2, F3, 3]`.
    ///
    /// # Errors
    /// Fails if `ddf` is not `[B, F1, F2, F3, 3]` for this warper's fixed shape.
    pub fn sample_coords(&self, ddf: Tensor<B, 5>) -> Result<Tensor<B, 5>> {
        let dims = ddf.dims();
        let [f1, f2, f3] = self.fixed_shape();
        if dims[1..] != [f1, f2, f3, 3] {
            return Err(WarpError::shape("ddf", format!("[B, {f1}, {f2}, {f3}, 3]"), &dims));
        }
        Ok(ddf + self.grid.clone().unsqueeze_dim::<5>(0))
    }

    /// Warp a single-channel moving image.
    ///
    /// # Arguments
    /// * `ddf` - Displacement field `[B, F1, F2, F3, 3]`
    /// * `moving` - Moving image `[B, M1, M2, M3]` or `[B, M1, M2, M3, 1]`
    ///
    /// # Returns
    /// Warped image `[B, F1, F2, F3]`; a trivial channel axis is dropped.
    pub fn warp<const DM: usize>(&self, ddf: Tensor<B, 5>, moving: Tensor<B, DM>) -> Result<Tensor<B, 4>> {
        let dims = moving.dims();
        let single_channel = match DM {
            4 => true,
            5 => dims[DM - 1] == 1,
            _ => false,
        };
        if !single_channel {
            return Err(WarpError::shape(
                "moving",
                "[B, M1, M2, M3] or [B, M1, M2, M3, 1]; use `warp_channels` for multi-channel volumes",
                &dims,
            ));
        }

        let moving: Tensor<B, 4> = moving.reshape([dims[0], dims[1], dims[2], dims[3]]);
        let coords = self.sample_coords(ddf)?;
        self.resampler().resample(moving, coords)
    }

    /// Warp a multi-channel moving volume `[B, M1, M2, M3, C]`, keeping the channel axis.
    ///
    /// Returns `[B, F1, F2, F3, C]`.
    pub fn warp_channels(&self, ddf: Tensor<B, 5>, moving: Tensor<B, 5>) -> Result<Tensor<B, 5>> {
        let coords = self.sample_coords(ddf)?;
        self.resampler().resample(moving, coords)
    }

    fn resampler(&self) -> Resampler {
        Resampler::new(Interpolation::Linear).with_boundary(*self.boundary)
    }
}
