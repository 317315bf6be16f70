//! Regularization module for dense displacement fields.
//!
//! This module provides smoothness penalties for displacement fields
//! predicted during registration.
//!
//! # Available Regularizers
//!
//! * **GradientNormRegularizer**: First-order smoothness, L1 or L2 norm of the
//!   central-difference gradients
//! * **BendingEnergyRegularizer**: Second-order smoothness (thin-plate bending)
//!
//! All penalties reduce to one value per batch element, shape `[B]`.

pub mod trait_;
pub mod gradient_norm;
pub mod bending_energy;
pub mod energy;

pub use trait_::utils::{gradient_dx, gradient_dxyz, gradient_dy, gradient_dz, SpatialAxis};
pub use trait_::Regularizer;
pub use gradient_norm::{gradient_norm, GradientNormRegularizer};
pub use bending_energy::{bending_energy, BendingEnergyRegularizer};
pub use energy::{local_displacement_energy, DeformationEnergy, RegularizationConfig};
