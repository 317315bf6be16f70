//! Random affine generation.
//!
//! A fixed tetrahedron is perturbed corner-wise by multiplicative noise drawn
//! from `U(1 - scale, 1)`; the affine mapping the original tetrahedron onto the
//! perturbed one is recovered by least squares. Small scales therefore yield
//! affines close to the identity.

use burn::config::Config;
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use nalgebra::{SMatrix, SVD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, WarpError};

/// Homogeneous corners of the reference tetrahedron, one per row.
const TETRAHEDRON: [[f64; 4]; 4] = [
    [-1.0, -1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0, 1.0],
];

/// Configuration for [`RandomAffineGenerator`].
#[derive(Config, Debug, PartialEq)]
pub struct RandomAffineConfig {
    /// Magnitude of the perturbation, in `[0, 1)`.
    #[config(default = "0.1")]
    pub scale: f64,
    /// Seed for reproducible draws; fresh entropy on every call when `None`.
    pub seed: Option<u64>,
}

impl RandomAffineConfig {
    /// Build the generator.
    pub fn init(&self) -> Result<RandomAffineGenerator> {
        RandomAffineGenerator::new(self.scale, self.seed)
    }
}

/// Generator of small random affines `[B, 4, 3]`.
///
/// The seed is immutable state: a seeded generator returns bit-identical
/// affines on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomAffineGenerator {
    scale: f64,
    seed: Option<u64>,
}

impl RandomAffineGenerator {
    /// Create a generator.
    ///
    /// # Errors
    /// Fails unless `0 <= scale < 1`.
    pub fn new(scale: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..1.0).contains(&scale) {
            return Err(WarpError::invalid_configuration(format!(
                "random affine scale must lie in [0, 1), got {scale}"
            )));
        }
        tracing::debug!(scale, ?seed, "built random affine generator");
        Ok(Self { scale, seed })
    }

    /// Perturbation magnitude.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw `batch` affines.
    pub fn generate<B: Backend>(&self, batch: usize, device: &B::Device) -> Result<Tensor<B, 3>> {
        if batch == 0 {
            return Err(WarpError::invalid_configuration("random affine batch must be positive"));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let old = SMatrix::<f64, 4, 4>::from_fn(|row, col| TETRAHEDRON[row][col]);
        let svd = SVD::new(old, true, true);

        let mut thetas = Vec::with_capacity(batch * 12);
        for _ in 0..batch {
            let new = SMatrix::<f64, 4, 3>::from_fn(|row, col| {
                let noise = 1.0 - self.scale * rng.random::<f64>();
                old[(row, col)] * noise
            });
            let theta = svd
                .solve(&new, f64::EPSILON)
                .map_err(|e| WarpError::Solver(e.to_string()))?;
            for row in 0..4 {
                for col in 0..3 {
                    thetas.push(theta[(row, col)] as f32);
                }
            }
        }

        Ok(Tensor::from_data(TensorData::new(thetas, [batch, 4, 3]), device))
    }
}

/// Draw `batch` random affines `[B, 4, 3]` with perturbation `scale`.
///
/// With `seed` set, the output is exactly reproducible.
pub fn random_affine<B: Backend>(
    batch: usize,
    scale: f64,
    seed: Option<u64>,
    device: &B::Device,
) -> Result<Tensor<B, 3>> {
    RandomAffineGenerator::new(scale, seed)?.generate(batch, device)
}
