use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

use crate::error::{Result, WarpError};

/// Validate a 3D spatial shape and return it as an array.
///
/// Fails unless `shape` holds exactly three positive extents.
pub fn spatial_shape(shape: &[usize]) -> Result<[usize; 3]> {
    match shape {
        &[d1, d2, d3] if d1 > 0 && d2 > 0 && d3 > 0 => Ok([d1, d2, d3]),
        _ => Err(WarpError::invalid_configuration(format!(
            "spatial shape must contain exactly three positive extents, got {shape:?}"
        ))),
    }
}

/// Generate the identity sampling lattice for a 3D output shape.
///
/// Returns a dense tensor of shape `[D1, D2, D3, 3]` with
/// `grid[i, j, k] = (i, j, k)` (`ij` indexing, row-major over the spatial axes).
///
/// # Arguments
/// * `shape` - The output shape `[D1, D2, D3]`
/// * `device` - The device to create the tensor on
///
/// # Errors
/// Fails if `shape` does not contain exactly three positive integers.
pub fn reference_grid<B: Backend>(shape: &[usize], device: &B::Device) -> Result<Tensor<B, 4>> {
    let [d1, d2, d3] = spatial_shape(shape)?;
    let total = d1 * d2 * d3;

    let mut grid = Vec::with_capacity(total * 3);
    for i in 0..d1 {
        for j in 0..d2 {
            for k in 0..d3 {
                grid.push(i as f32);
                grid.push(j as f32);
                grid.push(k as f32);
            }
        }
    }

    Ok(Tensor::<B, 4>::from_data(
        TensorData::new(grid, Shape::new([d1, d2, d3, 3])),
        device,
    ))
}

/// Broadcast an unbatched grid `[D1, D2, D3, N]` to `[B, D1, D2, D3, N]`.
pub fn batch_grid<B: Backend>(grid: Tensor<B, 4>, batch: usize) -> Tensor<B, 5> {
    grid.unsqueeze_dim::<5>(0).repeat_dim(0, batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_reference_grid_values() {
        let device = Default::default();
        let grid = reference_grid::<TestBackend>(&[1, 2, 3], &device).unwrap();
        assert_eq!(grid.dims(), [1, 2, 3, 3]);

        let data = grid.into_data();
        let values = data.as_slice::<f32>().unwrap();
        let expected = [
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, //
            0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 2.0,
        ];
        assert_eq!(values, &expected);
    }

    #[test]
    fn test_reference_grid_rejects_bad_shapes() {
        let device = Default::default();
        assert!(reference_grid::<TestBackend>(&[2, 2], &device).is_err());
        assert!(reference_grid::<TestBackend>(&[2, 2, 2, 2], &device).is_err());
        assert!(reference_grid::<TestBackend>(&[2, 0, 2], &device).is_err());
    }

    #[test]
    fn test_batch_grid() {
        let device = Default::default();
        let grid = reference_grid::<TestBackend>(&[2, 3, 4], &device).unwrap();
        let batched = batch_grid(grid.clone(), 3);
        assert_eq!(batched.dims(), [3, 2, 3, 4, 3]);

        let last = batched.slice([2..3, 0..2, 0..3, 0..4, 0..3]).reshape([2, 3, 4, 3]);
        assert_eq!(
            last.into_data().to_vec::<f32>().unwrap(),
            grid.into_data().to_vec::<f32>().unwrap()
        );
    }
}
