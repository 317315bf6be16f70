use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, WarpError};
use crate::grid::{batch_grid, reference_grid, spatial_shape};
use crate::interpolation::{Interpolation, Resampler};

/// Resize a batched 3D volume with corner-aligned linear interpolation.
///
/// Target index `t` along an axis of source extent `D` and target extent `T`
/// reads the source at `t * (D - 1) / (T - 1)` (or `0` when `T == 1`), so the
/// first and last voxels of both volumes coincide.
///
/// # Arguments
/// * `volume` - `[B, D1, D2, D3]` or `[B, D1, D2, D3, C]`
/// * `target_shape` - `[T1, T2, T3]`
///
/// # Returns
/// `[B, T1, T2, T3]` or `[B, T1, T2, T3, C]`
pub fn resize<B: Backend, const D: usize>(volume: Tensor<B, D>, target_shape: [usize; 3]) -> Result<Tensor<B, D>> {
    let dims = volume.dims();
    if D != 4 && D != 5 {
        return Err(WarpError::shape("volume", "[B, D1, D2, D3] or [B, D1, D2, D3, C]", &dims));
    }
    let target = spatial_shape(&target_shape)?;
    let source = [dims[1], dims[2], dims[3]];
    if source == target {
        return Ok(volume);
    }

    let device = volume.device();
    let factors: Vec<f32> = source
        .iter()
        .zip(target.iter())
        .map(|(&from, &to)| if to > 1 { (from - 1) as f32 / (to - 1) as f32 } else { 0.0 })
        .collect();
    let factors = Tensor::<B, 1>::from_floats(factors.as_slice(), &device).reshape([1, 1, 1, 3]);

    let coords = reference_grid::<B>(&target, &device)? * factors;
    let coords = batch_grid(coords, dims[0]);

    tracing::trace!(?source, ?target, "resize");
    Resampler::new(Interpolation::Linear).resample(volume, coords)
}
