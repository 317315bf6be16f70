//! Image filters built on the sampler.

pub mod resize;

pub use resize::resize;
