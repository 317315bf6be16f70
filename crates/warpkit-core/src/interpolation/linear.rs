//! Linear interpolation implementation.
//!
//! This module provides N-linear interpolation for volumes of any spatial rank.
//! Corner values are gathered with an explicit batch offset and combined with
//! [`pyramid_combination`].

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

use super::mode::Boundary;
use super::pyramid::pyramid_combination;
use super::trait_::Interpolator;
use crate::error::Result;

/// Linear Interpolator.
///
/// Performs N-linear interpolation (bilinear for 2D, trilinear for 3D).
///
/// For each axis the coordinate is resolved to a pair of integer neighbours
/// using `ceil` first and `floor = ceil - 1`, so an integer coordinate `x`
/// reads exactly `volume[x]` and the upper edge `D - 1` has no dead zone.
/// Integer indices are detached; gradients reach the coordinates through the
/// interpolation weights only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearInterpolator {
    boundary: Boundary,
}

/// Integer neighbours and floor weight of one axis, `[Batch, Locations]` each.
struct AxisCorners<B: Backend> {
    floor: Tensor<B, 2, Int>,
    ceil: Tensor<B, 2, Int>,
    weight_floor: Tensor<B, 2>,
    /// `1.0` where the (floor, ceil) neighbour lies inside the volume. Zero boundary only.
    inside: Option<(Tensor<B, 2>, Tensor<B, 2>)>,
}

impl LinearInterpolator {
    /// Create a new linear interpolator with replicate-edge boundary handling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a linear interpolator with an explicit boundary mode.
    pub fn with_boundary(boundary: Boundary) -> Self {
        Self { boundary }
    }

    /// The boundary mode in use.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    fn axis_corners<B: Backend>(&self, coord: Tensor<B, 2>, size: usize) -> AxisCorners<B> {
        let max = (size - 1) as f64;
        match self.boundary {
            Boundary::Replicate => {
                let clamped = coord.clamp(0.0, max);
                let ceil = upper_neighbour(clamped.clone());
                let floor = (ceil.clone() - 1.0).clamp_min(0.0);
                let weight_floor = ceil.clone() - clamped;
                AxisCorners {
                    floor: floor.int(),
                    ceil: ceil.int(),
                    weight_floor,
                    inside: None,
                }
            }
            Boundary::Zero => {
                let ceil = upper_neighbour(coord.clone());
                let floor = ceil.clone() - 1.0;
                let weight_floor = ceil.clone() - coord;
                let inside_floor = Self::inside(floor.clone(), max);
                let inside_ceil = Self::inside(ceil.clone(), max);
                AxisCorners {
                    floor: floor.clamp(0.0, max).int(),
                    ceil: ceil.clamp(0.0, max).int(),
                    weight_floor,
                    inside: Some((inside_floor, inside_ceil)),
                }
            }
        }
    }

    fn inside<B: Backend>(index: Tensor<B, 2>, max: f64) -> Tensor<B, 2> {
        let lower = index.clone().greater_equal_elem(0.0).float();
        let upper = index.lower_equal_elem(max).float();
        lower * upper
    }
}

/// Detached `ceil(x)`, computed as `-floor(-x)`.
///
/// `Tensor::ceil` on the autodiff backend of burn 0.16 rounds down, so the
/// upper neighbour is derived from `floor` instead.
fn upper_neighbour<B: Backend>(coord: Tensor<B, 2>) -> Tensor<B, 2> {
    coord.detach().neg().floor().neg()
}

/// Row-major strides of `spatial`.
fn strides(spatial: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; spatial.len()];
    for axis in (0..spatial.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * spatial[axis + 1];
    }
    strides
}

impl<B: Backend> Interpolator<B> for LinearInterpolator {
    fn interpolate(
        &self,
        volume: Tensor<B, 3>,
        coords: Tensor<B, 3>,
        spatial: &[usize],
    ) -> Result<Tensor<B, 3>> {
        let [batch, voxels, channels] = volume.dims();
        let [_, locations, rank] = coords.dims();
        let device = coords.device();

        let flat_volume = volume.reshape([batch * voxels, channels]);
        let strides = strides(spatial);

        // Explicit batch coordinate: offset of each sample's volume in the flat layout.
        let batch_offset = Tensor::<B, 1, Int>::arange(0..batch as i64, &device)
            .mul_scalar(voxels as i64)
            .reshape([batch, 1])
            .repeat_dim(1, locations);

        let corners: Vec<AxisCorners<B>> = spatial
            .iter()
            .enumerate()
            .map(|(axis, &size)| {
                let coord = coords.clone().narrow(2, axis, 1).reshape([batch, locations]);
                self.axis_corners(coord, size)
            })
            .collect();

        let corner_count = 1usize << rank;
        let mut values = Vec::with_capacity(corner_count);
        for corner in 0..corner_count {
            let mut index = batch_offset.clone();
            let mut inside: Option<Tensor<B, 2>> = None;

            for (axis, axis_corners) in corners.iter().enumerate() {
                let upper = (corner >> (rank - 1 - axis)) & 1 == 1;
                let neighbour = if upper {
                    axis_corners.ceil.clone()
                } else {
                    axis_corners.floor.clone()
                };
                index = index + neighbour.mul_scalar(strides[axis] as i64);

                if let Some((inside_floor, inside_ceil)) = &axis_corners.inside {
                    let valid = (if upper { inside_ceil } else { inside_floor }).clone();
                    inside = Some(match inside {
                        Some(mask) => mask * valid,
                        None => valid,
                    });
                }
            }

            let gathered = flat_volume
                .clone()
                .select(0, index.reshape([batch * locations]))
                .reshape([batch, locations, channels]);
            let gathered = match inside {
                Some(mask) => gathered * mask.unsqueeze_dim::<3>(2),
                None => gathered,
            };
            values.push(gathered);
        }

        let weights: Vec<Tensor<B, 3>> = corners
            .into_iter()
            .map(|axis_corners| axis_corners.weight_floor.unsqueeze_dim::<3>(2))
            .collect();

        pyramid_combination(values, &weights)
    }
}
