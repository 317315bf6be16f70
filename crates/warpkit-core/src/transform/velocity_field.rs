//! Stationary velocity field integration.

use burn::config::Config;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::displacement_field::DdfWarper;
use crate::error::{Result, WarpError};

/// Configuration for [`DvfIntegrator`].
#[derive(Config, Debug, PartialEq)]
pub struct DvfIntegratorConfig {
    /// Spatial shape `[F1, F2, F3]` of the velocity field.
    pub fixed_shape: [usize; 3],
    /// Number of scaling-and-squaring steps (e.g. 7 for 128 sub-steps).
    #[config(default = "7")]
    pub steps: usize,
}

impl DvfIntegratorConfig {
    /// Build the integrator.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<DvfIntegrator<B>> {
        DvfIntegrator::new(self.fixed_shape, self.steps, device)
    }
}

/// Velocity Integration Module (Scaling and Squaring).
///
/// Integrates a stationary velocity field to produce a diffeomorphic
/// displacement field.
///
/// $\phi = \exp(v)$
///
/// Implemented via scaling and squaring:
/// 1. Scale the velocity by $1/2^N$
/// 2. Compose the field with itself $N$ times: $u \leftarrow u + u \circ (x + u)$
///
/// Each squaring is a functional update, so gradients flow through every step.
#[derive(Module, Debug)]
pub struct DvfIntegrator<B: Backend> {
    warper: DdfWarper<B>,
    steps: usize,
}

impl<B: Backend> DvfIntegrator<B> {
    /// Create a new velocity integrator.
    ///
    /// # Arguments
    /// * `fixed_shape` - Spatial shape of the fields to integrate
    /// * `steps` - Number of integration steps, at least 1
    pub fn new(fixed_shape: [usize; 3], steps: usize, device: &B::Device) -> Result<Self> {
        if steps == 0 {
            return Err(WarpError::invalid_configuration(
                "DVF integration needs at least one scaling-and-squaring step",
            ));
        }
        let warper = DdfWarper::new(fixed_shape, device)?;
        tracing::debug!(?fixed_shape, steps, "built DVF integrator");
        Ok(Self { warper, steps })
    }

    /// Number of scaling-and-squaring steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Spatial shape `[F1, F2, F3]` of the fields this integrator accepts.
    pub fn fixed_shape(&self) -> [usize; 3] {
        self.warper.fixed_shape()
    }

    /// Integrate a velocity field.
    ///
    /// # Arguments
    /// * `dvf` - Velocity field `[B, F1, F2, F3, 3]`
    ///
    /// # Returns
    /// Displacement field of the same shape.
    pub fn integrate(&self, dvf: Tensor<B, 5>) -> Result<Tensor<B, 5>> {
        let scale = 0.5f64.powi(self.steps as i32);
        let mut ddf = dvf * scale;

        for _ in 0..self.steps {
            // ddf(x) + ddf(x + ddf(x))
            let composed = self.warper.warp_channels(ddf.clone(), ddf.clone())?;
            ddf = ddf + composed;
        }

        Ok(ddf)
    }
}
