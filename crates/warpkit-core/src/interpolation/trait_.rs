//! Interpolator trait for sampling values at continuous coordinates.
//!
//! This module defines the core Interpolator trait that all interpolation methods must implement.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;

/// Interpolator trait for sampling values at continuous coordinates.
///
/// Implementations work on a flattened, rank-erased layout so that a single
/// kernel serves every spatial rank. Shape validation and reshaping from the
/// caller's layout happen in [`Resampler`](super::Resampler).
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait Interpolator<B: Backend> {
    /// Interpolate values from a batched volume at continuous indices.
    ///
    /// # Arguments
    /// * `volume` - Source values `[Batch, Voxels, Channels]`, voxels stored
    ///   row-major over `spatial`
    /// * `coords` - Sample locations `[Batch, Locations, Rank]`
    /// * `spatial` - Source extents `[D1, ..., Dn]`, `n == Rank`
    ///
    /// # Returns
    /// Tensor of sampled values `[Batch, Locations, Channels]`
    fn interpolate(
        &self,
        volume: Tensor<B, 3>,
        coords: Tensor<B, 3>,
        spatial: &[usize],
    ) -> Result<Tensor<B, 3>>;
}
