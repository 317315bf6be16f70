//! Random affine data augmentation for image pairs.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::transform::{warp_grid, RandomAffineGenerator};
use warpkit_core::{ensure_dims, reference_grid, Interpolation, Resampler, Result, WarpError};

/// Configuration for [`AffineAugmentation`].
#[derive(Config, Debug, PartialEq)]
pub struct AffineAugmentationConfig {
    /// Spatial shape `[M1, M2, M3]` of moving images.
    pub moving_shape: [usize; 3],
    /// Spatial shape `[F1, F2, F3]` of fixed images.
    pub fixed_shape: [usize; 3],
    /// Perturbation magnitude of the random affines, in `[0, 1)`.
    #[config(default = "0.1")]
    pub scale: f64,
    /// Seed for reproducible augmentation.
    pub seed: Option<u64>,
}

impl AffineAugmentationConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<AffineAugmentation<B>> {
        let generator = RandomAffineGenerator::new(self.scale, self.seed)?;
        tracing::debug!(
            moving_shape = ?self.moving_shape,
            fixed_shape = ?self.fixed_shape,
            scale = self.scale,
            seed = ?self.seed,
            "built affine augmentation"
        );
        Ok(AffineAugmentation {
            moving_grid: reference_grid(&self.moving_shape, device)?,
            fixed_grid: reference_grid(&self.fixed_shape, device)?,
            generator: Ignored(generator),
        })
    }
}

/// An augmented image pair; labels keep the rank `DL` they were given with.
#[derive(Debug, Clone)]
pub struct AugmentedPair<B: Backend, const DL: usize> {
    pub moving_image: Tensor<B, 4>,
    pub fixed_image: Tensor<B, 4>,
    pub moving_label: Option<Tensor<B, DL>>,
    pub fixed_label: Option<Tensor<B, DL>>,
}

/// Independently perturbs moving and fixed images with small random affines.
///
/// One generator call draws `2B` affines: the first `B` transform the moving
/// side, the last `B` the fixed side. Each side is resampled on its own
/// reference grid, so image shapes are preserved.
#[derive(Module, Debug)]
pub struct AffineAugmentation<B: Backend> {
    moving_grid: Tensor<B, 4>,
    fixed_grid: Tensor<B, 4>,
    generator: Ignored<RandomAffineGenerator>,
}

impl<B: Backend> AffineAugmentation<B> {
    /// Augment a batch.
    ///
    /// # Arguments
    /// * `moving_image` - `[B, M1, M2, M3]`
    /// * `fixed_image` - `[B, F1, F2, F3]`
    /// * `moving_label` - `[B, M1, M2, M3]` or `[B, M1, M2, M3, C]`
    /// * `fixed_label` - `[B, F1, F2, F3]` or `[B, F1, F2, F3, C]`
    pub fn augment<const DL: usize>(
        &self,
        moving_image: Tensor<B, 4>,
        fixed_image: Tensor<B, 4>,
        moving_label: Option<Tensor<B, DL>>,
        fixed_label: Option<Tensor<B, DL>>,
    ) -> Result<AugmentedPair<B, DL>> {
        let moving_dims = moving_image.dims();
        let batch = moving_dims[0];
        let [m1, m2, m3, _] = self.moving_grid.dims();
        let [f1, f2, f3, _] = self.fixed_grid.dims();
        ensure_dims("moving_image", &moving_dims, &[batch, m1, m2, m3])?;
        ensure_dims("fixed_image", &fixed_image.dims(), &[batch, f1, f2, f3])?;
        if let Some(label) = &moving_label {
            check_label("moving_label", &label.dims(), &moving_dims)?;
        }
        if let Some(label) = &fixed_label {
            check_label("fixed_label", &label.dims(), &fixed_image.dims())?;
        }

        let device = moving_image.device();
        let theta = self.generator.generate::<B>(2 * batch, &device)?;
        let moving_coords = warp_grid(self.moving_grid.clone(), theta.clone().narrow(0, 0, batch))?;
        let fixed_coords = warp_grid(self.fixed_grid.clone(), theta.narrow(0, batch, batch))?;
        tracing::trace!(batch, "augmenting image pair");

        let resampler = Resampler::new(Interpolation::Linear);
        Ok(AugmentedPair {
            moving_image: resampler.resample(moving_image, moving_coords.clone())?,
            fixed_image: resampler.resample(fixed_image, fixed_coords.clone())?,
            moving_label: moving_label
                .map(|label| resampler.resample(label, moving_coords))
                .transpose()?,
            fixed_label: fixed_label
                .map(|label| resampler.resample(label, fixed_coords))
                .transpose()?,
        })
    }
}

/// Labels share the batch and spatial axes of their image, optionally followed by channels.
fn check_label(operand: &'static str, label: &[usize], image: &[usize; 4]) -> Result<()> {
    match label.len() {
        4 | 5 if label[..4] == image[..] => Ok(()),
        _ => Err(WarpError::shape(
            operand,
            format!("{image:?} with an optional trailing channel axis"),
            label,
        )),
    }
}
