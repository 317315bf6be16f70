use burn::tensor::{Distribution, Tensor, TensorData};
use burn_ndarray::NdArray;
use proptest::prelude::*;
use warpkit_core::filter::resize;
use warpkit_core::transform::{DdfWarperConfig, DvfIntegratorConfig, RandomAffineConfig};
use warpkit_core::{
    ddf_from_affine, identity_affine, random_affine, reference_grid, resample, warp_grid, DdfWarper,
    Interpolation,
};

type Backend = NdArray<f32>;

fn assert_close(actual: Vec<f32>, expected: Vec<f32>, tolerance: f32) {
    assert_eq!(actual.len(), expected.len());
    for (index, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!((a - e).abs() <= tolerance, "index {index}: expected {e}, got {a}");
    }
}

#[test]
fn test_identity_affine_reproduces_grid() {
    let device = Default::default();
    let grid = reference_grid::<Backend>(&[3, 4, 5], &device).unwrap();
    let theta = identity_affine::<Backend>(2, &device);

    let warped = warp_grid(grid.clone(), theta).unwrap();
    assert_eq!(warped.dims(), [2, 3, 4, 5, 3]);

    let expected = grid.into_data().to_vec::<f32>().unwrap();
    let warped = warped.into_data().to_vec::<f32>().unwrap();
    assert_close(warped[..expected.len()].to_vec(), expected.clone(), 0.0);
    assert_close(warped[expected.len()..].to_vec(), expected, 0.0);
}

#[test]
fn test_ddf_warp_matches_direct_affine_warp() {
    let device = Default::default();
    let shape = [4, 5, 6];
    let grid = reference_grid::<Backend>(&shape, &device).unwrap();
    let theta = Tensor::<Backend, 3>::from_floats(
        [[
            [0.95, 0.05, 0.0],
            [-0.05, 1.02, 0.03],
            [0.0, -0.02, 0.98],
            [0.3, -0.4, 0.25],
        ]],
        &device,
    );
    let moving = Tensor::<Backend, 4>::random([1, 4, 5, 6], Distribution::Default, &device);

    let direct: Tensor<Backend, 4> = resample(
        moving.clone(),
        warp_grid(grid.clone(), theta.clone()).unwrap(),
        Interpolation::Linear,
    )
    .unwrap();

    let warper = DdfWarper::<Backend>::new(shape, &device).unwrap();
    let ddf = ddf_from_affine(grid, theta).unwrap();
    let via_ddf = warper.warp(ddf, moving).unwrap();

    assert_close(
        via_ddf.into_data().to_vec::<f32>().unwrap(),
        direct.into_data().to_vec::<f32>().unwrap(),
        1e-4,
    );
}

#[test]
fn test_integrated_zero_velocity_warps_to_identity() {
    let device = Default::default();
    let shape = [3, 4, 5];
    let integrator = DvfIntegratorConfig::new(shape).init::<Backend>(&device).unwrap();
    let warper = DdfWarperConfig::new(shape).init::<Backend>(&device).unwrap();

    let dvf = Tensor::<Backend, 5>::zeros([2, 3, 4, 5, 3], &device);
    let moving = Tensor::<Backend, 5>::random([2, 3, 4, 5, 2], Distribution::Default, &device);

    let ddf = integrator.integrate(dvf).unwrap();
    let warped = warper.warp_channels(ddf, moving.clone()).unwrap();

    assert_eq!(
        warped.into_data().to_vec::<f32>().unwrap(),
        moving.into_data().to_vec::<f32>().unwrap()
    );
}

#[test]
fn test_random_affine_warp_stays_inside_envelope() {
    let device = Default::default();
    let generator = RandomAffineConfig::new().with_scale(0.2).with_seed(Some(0)).init().unwrap();
    let theta = generator.generate::<Backend>(3, &device).unwrap();
    assert_eq!(theta.dims(), [3, 4, 3]);

    // Tetrahedron corners laid out as a [4, 1, 1, 3] grid.
    let corners = [
        [-1.0f32, -1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [1.0, -1.0, -1.0],
    ];
    let grid = Tensor::<Backend, 4>::from_data(
        TensorData::new(corners.concat(), [4, 1, 1, 3]),
        &device,
    );
    let warped = warp_grid(grid, theta).unwrap().into_data().to_vec::<f32>().unwrap();
    assert_eq!(warped.len(), 3 * 12);

    for (index, mapped) in warped.iter().enumerate() {
        let original = corners[(index / 3) % 4][index % 3];
        let ratio = mapped / original;
        assert!(ratio > 0.8 - 1e-4 && ratio <= 1.0 + 1e-4, "index {index}: ratio {ratio}");
    }
}

#[test]
fn test_resize_then_warp_pipeline() {
    let device = Default::default();
    let moving = Tensor::<Backend, 4>::ones([1, 8, 8, 8], &device) * 2.0;
    let moving = resize(moving, [4, 4, 4]).unwrap();

    let warper = DdfWarper::<Backend>::new([4, 4, 4], &device).unwrap();
    let ddf = Tensor::<Backend, 5>::random([1, 4, 4, 4, 3], Distribution::Uniform(-2.0, 2.0), &device);
    let warped = warper.warp(ddf, moving).unwrap();

    assert_close(warped.into_data().to_vec::<f32>().unwrap(), vec![2.0; 64], 1e-5);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_random_affine_approaches_identity(scale in 0.0f64..1e-4, seed in any::<u64>()) {
        let theta = random_affine::<Backend>(1, scale, Some(seed), &Default::default()).unwrap();
        let values = theta.into_data().to_vec::<f32>().unwrap();
        let identity = [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        for (value, expected) in values.iter().zip(identity.iter()) {
            prop_assert!((value - expected).abs() < 1e-3, "expected {}, got {}", expected, value);
        }
    }

    #[test]
    fn test_constant_ddf_is_translation(shift in -0.9f32..0.9) {
        let device = Default::default();
        let warper = DdfWarper::<Backend>::new([1, 1, 5], &device).unwrap();
        let moving = Tensor::<Backend, 4>::from_floats([[[[0.0, 1.0, 2.0, 3.0, 4.0]]]], &device);
        let ddf = Tensor::<Backend, 5>::zeros([1, 1, 1, 5, 3], &device)
            + Tensor::<Backend, 1>::from_floats([0.0, 0.0, shift], &device).reshape([1, 1, 1, 1, 3]);

        let warped = warper.warp(ddf, moving).unwrap().into_data().to_vec::<f32>().unwrap();
        // Interior voxels shift linearly; edges replicate.
        for (k, value) in warped.iter().enumerate().take(4).skip(1) {
            let expected = k as f32 + shift;
            prop_assert!((value - expected).abs() < 1e-4, "voxel {}: expected {}, got {}", k, expected, value);
        }
    }
}
