//! Shape-validating front end of the sampler.

use burn::config::Config;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::linear::LinearInterpolator;
use super::mode::{Boundary, Interpolation};
use super::trait_::Interpolator;
use crate::error::{Result, WarpError};

/// Configuration for [`Resampler`].
#[derive(Config, Debug, PartialEq)]
pub struct ResampleConfig {
    /// Interpolation scheme.
    #[config(default = "Interpolation::Linear")]
    pub interpolation: Interpolation,
    /// Boundary handling for out-of-range coordinates.
    #[config(default = "Boundary::Replicate")]
    pub boundary: Boundary,
}

impl ResampleConfig {
    /// Build the resampler.
    pub fn init(&self) -> Resampler {
        Resampler {
            interpolation: self.interpolation,
            boundary: self.boundary,
        }
    }
}

/// Batched, differentiable volume sampler.
///
/// Samples `volume` of shape `[B, D1, ..., Dn]` (single channel) or
/// `[B, D1, ..., Dn, C]` at continuous coordinates `[B, L1, ..., Lm, n]`.
/// The output has shape `[B, L1, ..., Lm]` or `[B, L1, ..., Lm, C]`: the
/// channel axis is present in the output exactly when it is present in the
/// volume. The output rank `DO` is chosen by the caller and validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resampler {
    interpolation: Interpolation,
    boundary: Boundary,
}

impl Resampler {
    /// Create a resampler with replicate-edge boundary handling.
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            boundary: Boundary::Replicate,
        }
    }

    /// Select the boundary mode explicitly.
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// The interpolation scheme in use.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// The boundary mode in use.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Sample `volume` at `coords`.
    ///
    /// # Errors
    /// * `volume` and `coords` disagree on batch size
    /// * the last axis of `coords` is not the spatial rank of `volume`
    /// * `DO` is not the rank implied by `coords` and the channel convention
    pub fn resample<B: Backend, const DV: usize, const DC: usize, const DO: usize>(
        &self,
        volume: Tensor<B, DV>,
        coords: Tensor<B, DC>,
    ) -> Result<Tensor<B, DO>> {
        let volume_dims = volume.dims();
        let coord_dims = coords.dims();

        if DC < 2 {
            return Err(WarpError::shape("coords", "[B, L1, ..., Lm, n]", &coord_dims));
        }
        let rank = coord_dims[DC - 1];
        if rank == 0 {
            return Err(WarpError::shape("coords", "a non-empty coordinate axis", &coord_dims));
        }

        let (spatial, channels, has_channels) = if DV == rank + 1 {
            (&volume_dims[1..], 1, false)
        } else if DV == rank + 2 {
            (&volume_dims[1..DV - 1], volume_dims[DV - 1], true)
        } else {
            return Err(WarpError::shape(
                "volume",
                format!("[B, D1, ..., D{rank}] or [B, D1, ..., D{rank}, C] to match {rank} coordinates"),
                &volume_dims,
            ));
        };

        if volume_dims[0] != coord_dims[0] {
            return Err(WarpError::shape(
                "coords",
                format!("batch size {} to match the volume", volume_dims[0]),
                &coord_dims,
            ));
        }
        if spatial.iter().any(|&extent| extent == 0) || channels == 0 {
            return Err(WarpError::shape("volume", "non-empty spatial and channel axes", &volume_dims));
        }

        let expected_rank = if has_channels { DC } else { DC - 1 };
        if DO != expected_rank {
            return Err(WarpError::InvalidConfiguration(format!(
                "sampling a {}volume at coordinates of rank {DC} yields rank {expected_rank}, requested rank {DO}",
                if has_channels { "multi-channel " } else { "" },
            )));
        }

        let batch = coord_dims[0];
        let voxels: usize = spatial.iter().product();
        let locations: usize = coord_dims[1..DC - 1].iter().product();

        tracing::trace!(
            interpolation = %self.interpolation,
            boundary = %self.boundary,
            ?volume_dims,
            ?coord_dims,
            "resample"
        );

        let flat_volume = volume.reshape([batch, voxels, channels]);
        let flat_coords = coords.reshape([batch, locations, rank]);

        let sampled = match self.interpolation {
            Interpolation::Linear => LinearInterpolator::with_boundary(self.boundary)
                .interpolate(flat_volume, flat_coords, spatial)?,
        };

        let mut out_dims = [0usize; DO];
        out_dims[..DC - 1].copy_from_slice(&coord_dims[..DC - 1]);
        if has_channels {
            out_dims[DO - 1] = channels;
        }
        Ok(sampled.reshape(out_dims))
    }
}

/// Sample `volume` at `coords` with replicate-edge boundaries.
///
/// See [`Resampler::resample`] for shapes and failure modes.
pub fn resample<B: Backend, const DV: usize, const DC: usize, const DO: usize>(
    volume: Tensor<B, DV>,
    coords: Tensor<B, DC>,
    interpolation: Interpolation,
) -> Result<Tensor<B, DO>> {
    Resampler::new(interpolation).resample(volume, coords)
}
