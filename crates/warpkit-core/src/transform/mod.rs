//! Transform types and operations.
//!
//! This module provides the spatial transforms of the registration kernel:
//! affine grid warping, dense displacement field warping, stationary velocity
//! field integration, and random affine generation.

pub mod affine;
pub mod displacement_field;
pub mod velocity_field;
pub mod random;

pub use affine::{ddf_from_affine, identity_affine, warp_grid};
pub use displacement_field::{DdfWarper, DdfWarperConfig};
pub use velocity_field::{DvfIntegrator, DvfIntegratorConfig};
pub use random::{random_affine, RandomAffineConfig, RandomAffineGenerator};
