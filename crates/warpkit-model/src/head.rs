//! Registration heads.
//!
//! A head turns the raw output of a backbone network into a transformation,
//! and uses the warping kernel to map the moving image (and label) into fixed
//! space. Backbones are not part of this crate; heads take their output
//! tensors directly.

use burn::module::Module;
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::transform::{ddf_from_affine, DdfWarper, DvfIntegrator};
use warpkit_core::{ensure_dims, Result, WarpError};

/// Everything a head produces. Fields that do not apply to a head are `None`.
#[derive(Debug, Clone)]
pub struct HeadOutput<B: Backend> {
    /// Dense displacement field `[B, F1, F2, F3, 3]`.
    pub ddf: Option<Tensor<B, 5>>,
    /// Stationary velocity field `[B, F1, F2, F3, 3]`.
    pub dvf: Option<Tensor<B, 5>>,
    /// Affine parameters `[B, 4, 3]`.
    pub theta: Option<Tensor<B, 3>>,
    /// Moving image warped into fixed space, `[B, F1, F2, F3]`.
    pub pred_fixed_image: Option<Tensor<B, 4>>,
    /// Moving label warped into fixed space, or the predicted fixed label, `[B, F1, F2, F3]`.
    pub pred_fixed_label: Option<Tensor<B, 4>>,
}

impl<B: Backend> HeadOutput<B> {
    fn empty() -> Self {
        Self {
            ddf: None,
            dvf: None,
            theta: None,
            pred_fixed_image: None,
            pred_fixed_label: None,
        }
    }
}

/// Head for backbones that predict a dense displacement field directly.
#[derive(Module, Debug)]
pub struct DdfHead<B: Backend> {
    warper: DdfWarper<B>,
}

impl<B: Backend> DdfHead<B> {
    pub fn new(fixed_shape: [usize; 3], device: &B::Device) -> Result<Self> {
        Ok(Self {
            warper: DdfWarper::new(fixed_shape, device)?,
        })
    }

    /// Spatial shape `[F1, F2, F3]` of the fixed image.
    pub fn fixed_shape(&self) -> [usize; 3] {
        self.warper.fixed_shape()
    }

    /// Warp the moving image and optional label with `ddf` `[B, F1, F2, F3, 3]`.
    ///
    /// `moving_image` and `moving_label` are `[B, M1, M2, M3]`.
    pub fn forward(
        &self,
        ddf: Tensor<B, 5>,
        moving_image: Tensor<B, 4>,
        moving_label: Option<Tensor<B, 4>>,
    ) -> Result<HeadOutput<B>> {
        let pred_fixed_image = self.warper.warp(ddf.clone(), moving_image)?;
        let pred_fixed_label = moving_label
            .map(|label| self.warper.warp(ddf.clone(), label))
            .transpose()?;

        Ok(HeadOutput {
            ddf: Some(ddf),
            pred_fixed_image: Some(pred_fixed_image),
            pred_fixed_label,
            ..HeadOutput::empty()
        })
    }
}

/// Head for backbones that predict a stationary velocity field.
///
/// The velocity is integrated by scaling and squaring before warping, which
/// keeps the resulting transformation diffeomorphic.
#[derive(Module, Debug)]
pub struct DvfHead<B: Backend> {
    integrator: DvfIntegrator<B>,
    head: DdfHead<B>,
}

impl<B: Backend> DvfHead<B> {
    pub fn new(fixed_shape: [usize; 3], steps: usize, device: &B::Device) -> Result<Self> {
        Ok(Self {
            integrator: DvfIntegrator::new(fixed_shape, steps, device)?,
            head: DdfHead::new(fixed_shape, device)?,
        })
    }

    /// Number of scaling-and-squaring steps.
    pub fn steps(&self) -> usize {
        self.integrator.steps()
    }

    pub fn forward(
        &self,
        dvf: Tensor<B, 5>,
        moving_image: Tensor<B, 4>,
        moving_label: Option<Tensor<B, 4>>,
    ) -> Result<HeadOutput<B>> {
        let ddf = self.integrator.integrate(dvf.clone())?;
        let output = self.head.forward(ddf, moving_image, moving_label)?;
        Ok(HeadOutput {
            dvf: Some(dvf),
            ..output
        })
    }
}

/// Head for backbones that regress 12 affine parameters per sample.
///
/// The parameters are read row-major as a `[4, 3]` homogeneous affine; the
/// last row is the translation.
#[derive(Module, Debug)]
pub struct AffineHead<B: Backend> {
    head: DdfHead<B>,
}

impl<B: Backend> AffineHead<B> {
    pub fn new(fixed_shape: [usize; 3], device: &B::Device) -> Result<Self> {
        Ok(Self {
            head: DdfHead::new(fixed_shape, device)?,
        })
    }

    pub fn forward(
        &self,
        params: Tensor<B, 2>,
        moving_image: Tensor<B, 4>,
        moving_label: Option<Tensor<B, 4>>,
    ) -> Result<HeadOutput<B>> {
        let [batch, count] = params.dims();
        if count != 12 {
            return Err(WarpError::shape("params", "[B, 12]", &[batch, count]));
        }
        let theta: Tensor<B, 3> = params.reshape([batch, 4, 3]);
        let ddf = ddf_from_affine(self.head.warper.reference_grid(), theta.clone())?;

        let output = self.head.forward(ddf, moving_image, moving_label)?;
        Ok(HeadOutput {
            theta: Some(theta),
            ..output
        })
    }
}

/// Head for conditional segmentation backbones.
///
/// The backbone predicts fixed-label logits directly; no transformation is
/// produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalHead {
    fixed_shape: [usize; 3],
}

impl ConditionalHead {
    pub fn new(fixed_shape: [usize; 3]) -> Self {
        Self { fixed_shape }
    }

    /// Map logits `[B, F1, F2, F3, 1]` to label probabilities `[B, F1, F2, F3]`.
    pub fn forward<B: Backend>(&self, logits: Tensor<B, 5>) -> Result<HeadOutput<B>> {
        let dims = logits.dims();
        let [f1, f2, f3] = self.fixed_shape;
        ensure_dims("logits", &dims, &[dims[0], f1, f2, f3, 1])?;

        let pred_fixed_label = sigmoid(logits).reshape([dims[0], f1, f2, f3]);
        Ok(HeadOutput {
            pred_fixed_label: Some(pred_fixed_label),
            ..HeadOutput::empty()
        })
    }
}
