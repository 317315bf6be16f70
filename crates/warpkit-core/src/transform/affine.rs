//! Affine grid warping.
//!
//! Affines are batched `[B, 4, 3]` matrices in homogeneous row-vector form:
//! `[x y z 1] · A = [x' y' z']`.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, WarpError};

/// Batched identity affine `[B, 4, 3]`.
pub fn identity_affine<B: Backend>(batch: usize, device: &B::Device) -> Tensor<B, 3> {
    Tensor::<B, 2>::from_floats(
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]],
        device,
    )
    .unsqueeze_dim::<3>(0)
    .repeat_dim(0, batch)
}

/// Apply a batch of affines to an unbatched grid.
///
/// Pads `grid` to homogeneous coordinates `[D1, D2, D3, 4]` and computes
/// `out[b, i, j, k, p] = Σ_q grid[i, j, k, q] · theta[b, q, p]`.
///
/// # Arguments
/// * `grid` - Grid of shape `[D1, D2, D3, 3]`, typically a reference grid
/// * `theta` - Affines of shape `[B, 4, 3]`
///
/// # Returns
/// Sample coordinates of shape `[B, D1, D2, D3, 3]`
pub fn warp_grid<B: Backend>(grid: Tensor<B, 4>, theta: Tensor<B, 3>) -> Result<Tensor<B, 5>> {
    let [d1, d2, d3, components] = grid.dims();
    if components != 3 {
        return Err(WarpError::shape("grid", "[D1, D2, D3, 3]", &grid.dims()));
    }
    let [batch, rows, cols] = theta.dims();
    if rows != 4 || cols != 3 {
        return Err(WarpError::shape("theta", "[B, 4, 3]", &theta.dims()));
    }

    let points = d1 * d2 * d3;
    let device = grid.device();
    let homogeneous = Tensor::cat(
        vec![grid.reshape([points, 3]), Tensor::ones([points, 1], &device)],
        1,
    );

    let warped = homogeneous
        .unsqueeze_dim::<3>(0)
        .repeat_dim(0, batch)
        .matmul(theta);

    Ok(warped.reshape([batch, d1, d2, d3, 3]))
}

/// Dense displacement field equivalent to a batch of affines.
///
/// Returns `warp_grid(grid, theta) - grid`, shape `[B, D1, D2, D3, 3]`.
pub fn ddf_from_affine<B: Backend>(grid: Tensor<B, 4>, theta: Tensor<B, 3>) -> Result<Tensor<B, 5>> {
    let warped = warp_grid(grid.clone(), theta)?;
    Ok(warped - grid.unsqueeze_dim::<5>(0))
}
