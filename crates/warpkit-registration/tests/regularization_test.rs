use burn::backend::Autodiff;
use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use proptest::prelude::*;
use warpkit_core::{ddf_from_affine, random_affine, reference_grid};
use warpkit_registration::regularization::{BendingEnergyRegularizer, GradientNormRegularizer};
use warpkit_registration::{
    bending_energy, gradient_norm, local_displacement_energy, DeformationEnergy, RegistrationError,
    Regularizer,
};

type Backend = NdArray<f32>;
type AutodiffBackend = Autodiff<NdArray<f32>>;

#[test]
fn test_ones_ddf_has_zero_energy() {
    let ddf = Tensor::<Backend, 5>::ones([1, 6, 6, 6, 3], &Default::default());

    let l1 = gradient_norm(ddf.clone(), true).unwrap();
    let l2 = gradient_norm(ddf.clone(), false).unwrap();
    let bending = bending_energy(ddf).unwrap();

    assert_eq!(l1.into_data().to_vec::<f32>().unwrap(), vec![0.0]);
    assert_eq!(l2.into_data().to_vec::<f32>().unwrap(), vec![0.0]);
    assert_eq!(bending.into_data().to_vec::<f32>().unwrap(), vec![0.0]);
}

#[test]
fn test_zero_ddf_has_zero_energy() {
    let ddf = Tensor::<Backend, 5>::zeros([3, 5, 5, 5, 3], &Default::default());
    for energy in [
        DeformationEnergy::Bending,
        DeformationEnergy::GradientL1,
        DeformationEnergy::GradientL2,
    ] {
        let value = local_displacement_energy(ddf.clone(), energy).unwrap();
        assert_eq!(value.into_data().to_vec::<f32>().unwrap(), vec![0.0; 3]);
    }
}

#[test]
fn test_batch_elements_are_independent() {
    let device = Default::default();
    let smooth = Tensor::<Backend, 5>::zeros([1, 5, 5, 5, 3], &device);
    let rough = Tensor::<Backend, 5>::random([1, 5, 5, 5, 3], Distribution::Uniform(-1.0, 1.0), &device);
    let ddf = Tensor::cat(vec![smooth, rough.clone()], 0);

    let batched = bending_energy(ddf).unwrap().into_data().to_vec::<f32>().unwrap();
    let alone = bending_energy(rough).unwrap().into_scalar();
    assert_eq!(batched[0], 0.0);
    assert!((batched[1] - alone).abs() < 1e-6);
}

#[test]
fn test_energy_gradient_reaches_field() {
    let device = Default::default();
    let ddf = Tensor::<AutodiffBackend, 5>::random([1, 5, 5, 5, 3], Distribution::Default, &device).require_grad();

    let reg = BendingEnergyRegularizer::new(0.5).unwrap();
    let loss = reg.compute_loss(ddf.clone()).unwrap().sum();
    let grads = loss.backward();
    let grad = ddf.grad(&grads).expect("ddf should receive a gradient");

    assert_eq!(grad.dims(), [1, 5, 5, 5, 3]);
    assert!(grad.into_data().to_vec::<f32>().unwrap().iter().all(|v| v.is_finite()));
}

#[test]
fn test_trait_objects_share_interface() {
    let device = Default::default();
    let regularizers: Vec<Box<dyn Regularizer<Backend>>> = vec![
        Box::new(GradientNormRegularizer::new(1.0, true).unwrap()),
        Box::new(GradientNormRegularizer::new(1.0, false).unwrap()),
        Box::new(BendingEnergyRegularizer::default()),
    ];
    let ddf = Tensor::<Backend, 5>::zeros([2, 5, 5, 5, 3], &device);
    for reg in &regularizers {
        assert_eq!(reg.compute_loss(ddf.clone()).unwrap().dims(), [2]);
    }
}

#[test]
fn test_shape_errors_name_the_ddf() {
    let ddf = Tensor::<Backend, 5>::zeros([1, 4, 4, 4, 3], &Default::default());
    let err = bending_energy(ddf).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Warp(warpkit_core::WarpError::ShapeMismatch { operand: "ddf", .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_affine_ddf_has_no_bending(seed in any::<u64>()) {
        let device = Default::default();
        let grid = reference_grid::<Backend>(&[5, 6, 7], &device).unwrap();
        let theta = random_affine::<Backend>(2, 0.2, Some(seed), &device).unwrap();
        let ddf = ddf_from_affine(grid, theta).unwrap();

        let energy = bending_energy(ddf).unwrap().into_data().to_vec::<f32>().unwrap();
        for value in energy {
            prop_assert!(value.abs() < 1e-6, "bending energy {}", value);
        }
    }

    #[test]
    fn test_l2_scales_quadratically(factor in 0.1f32..4.0) {
        let device = Default::default();
        let ddf = Tensor::<Backend, 5>::random([1, 4, 4, 4, 3], Distribution::Uniform(-1.0, 1.0), &device);

        let base = gradient_norm(ddf.clone(), false).unwrap().into_scalar();
        let scaled = gradient_norm(ddf.mul_scalar(factor), false).unwrap().into_scalar();
        let expected = base * factor * factor;
        prop_assert!((scaled - expected).abs() <= 1e-4 * expected.max(1.0));
    }
}
