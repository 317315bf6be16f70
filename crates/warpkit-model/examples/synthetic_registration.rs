//! Synthetic Registration Example
//!
//! Builds a pair of shifted spheres, augments them with random affines,
//! warps the moving sphere through a velocity-field head and back-propagates
//! a similarity plus bending-energy loss to the velocity field.
//!
//! Usage:
//!   cargo run -p warpkit-model --example synthetic_registration

use burn::backend::Autodiff;
use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use warpkit_model::{AffineAugmentationConfig, DvfHead, LocalNccConfig};
use warpkit_registration::{DeformationEnergy, RegularizationConfig};

type Backend = Autodiff<NdArray<f32>>;

const SHAPE: [usize; 3] = [16, 16, 16];

fn sphere(center: [f32; 3], radius: f32, device: &<Backend as burn::tensor::backend::Backend>::Device) -> Tensor<Backend, 4> {
    let [d1, d2, d3] = SHAPE;
    let mut data = Vec::with_capacity(d1 * d2 * d3);
    for i in 0..d1 {
        for j in 0..d2 {
            for k in 0..d3 {
                let dist = ((i as f32 - center[0]).powi(2)
                    + (j as f32 - center[1]).powi(2)
                    + (k as f32 - center[2]).powi(2))
                .sqrt();
                data.push((radius - dist).clamp(0.0, 1.0));
            }
        }
    }
    Tensor::from_data(TensorData::new(data, [1, d1, d2, d3]), device)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let device = Default::default();

    let fixed = sphere([8.0, 8.0, 8.0], 5.0, &device);
    let moving = sphere([9.0, 7.5, 8.5], 5.0, &device);

    let augmentation = AffineAugmentationConfig::new(SHAPE, SHAPE)
        .with_scale(0.05)
        .with_seed(Some(42))
        .init::<Backend>(&device)?;
    let pair = augmentation.augment::<4>(moving, fixed, None, None)?;

    let head = DvfHead::<Backend>::new(SHAPE, 7, &device)?;
    let similarity = LocalNccConfig::new().with_kernel_size(5).init::<Backend>(&device)?;
    let regularizer = RegularizationConfig::new()
        .with_energy(DeformationEnergy::Bending)
        .with_weight(0.5)
        .init::<Backend>()?;

    // Stand-in for a backbone prediction.
    let dvf = Tensor::<Backend, 5>::zeros([1, SHAPE[0], SHAPE[1], SHAPE[2], 3], &device).require_grad();

    let output = head.forward(dvf.clone(), pair.moving_image, None)?;
    let warped = output
        .pred_fixed_image
        .ok_or_else(|| anyhow::anyhow!("DVF head returned no warped image"))?;
    let ddf = output
        .ddf
        .ok_or_else(|| anyhow::anyhow!("DVF head returned no displacement field"))?;

    let image_loss = similarity.forward(pair.fixed_image, warped)?;
    let deformation_loss = regularizer.compute_loss(ddf)?;
    let loss = (image_loss.clone() + deformation_loss.clone()).mean();

    tracing::info!(
        image_loss = image_loss.into_scalar(),
        deformation_loss = deformation_loss.into_scalar(),
        "forward pass"
    );

    let grads = loss.backward();
    let grad = dvf
        .grad(&grads)
        .ok_or_else(|| anyhow::anyhow!("velocity field received no gradient"))?;
    let grad_norm = grad.powf_scalar(2.0).sum().sqrt().into_scalar();
    tracing::info!(grad_norm, "velocity field gradient");

    Ok(())
}
