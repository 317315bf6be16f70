//! N-linear combination of hypercube corner values.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, WarpError};

/// Combine `2^n` corner values with `n` floor weights.
///
/// Corners are ordered in binary with the first axis as the most significant
/// bit; bit `0` selects the floor neighbour and bit `1` the ceil neighbour.
/// The result equals the recursive rule
/// `P(v, w) = P(evens, w[..n-1]) * w[n-1] + P(odds, w[..n-1]) * (1 - w[n-1])`
/// but is evaluated as `n` flat reduction stages, last axis first.
///
/// # Arguments
/// * `values` - Corner values, all of the same shape
/// * `weight_floor` - Per-axis weights of the floor neighbour, broadcastable to the values
///
/// # Errors
/// Fails if `weight_floor` is empty or `values.len() != 2^weight_floor.len()`.
pub fn pyramid_combination<B: Backend, const D: usize>(
    values: Vec<Tensor<B, D>>,
    weight_floor: &[Tensor<B, D>],
) -> Result<Tensor<B, D>> {
    if weight_floor.is_empty() {
        return Err(WarpError::invalid_configuration(
            "pyramid combination needs at least one axis weight",
        ));
    }
    let corners = 1usize
        .checked_shl(weight_floor.len() as u32)
        .unwrap_or(usize::MAX);
    if values.len() != corners {
        return Err(WarpError::invalid_configuration(format!(
            "pyramid combination over {} axes needs {} corner values, got {}",
            weight_floor.len(),
            corners,
            values.len()
        )));
    }

    let mut level = values;
    for weight in weight_floor.iter().rev() {
        let weight_ceil = weight.clone().neg().add_scalar(1.0);
        level = level
            .chunks_exact(2)
            .map(|pair| pair[0].clone() * weight.clone() + pair[1].clone() * weight_ceil.clone())
            .collect();
    }

    level
        .pop()
        .ok_or_else(|| WarpError::invalid_configuration("pyramid combination produced no value"))
}
