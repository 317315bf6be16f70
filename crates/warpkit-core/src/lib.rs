pub mod error;
pub mod grid;
pub mod interpolation;
pub mod transform;
pub mod filter;

pub use error::{ensure_dims, Result, WarpError};
pub use grid::reference_grid;
pub use interpolation::{resample, Boundary, Interpolation, Resampler};
pub use transform::{
    ddf_from_affine, identity_affine, random_affine, warp_grid, DdfWarper, DvfIntegrator,
    RandomAffineGenerator,
};
