//! Interpolation types and operations.
//!
//! This module provides the batched N-linear sampler used by every warper,
//! together with the interpolation and boundary modes it understands.

pub mod trait_;
pub mod mode;
pub mod pyramid;
pub mod linear;
pub mod resample;

pub use trait_::Interpolator;
pub use mode::{Boundary, Interpolation};
pub use pyramid::pyramid_combination;
pub use linear::LinearInterpolator;
pub use resample::{resample, ResampleConfig, Resampler};
