pub mod error;
pub mod regularization;

pub use error::{RegistrationError, Result};
pub use regularization::{
    bending_energy, gradient_norm, local_displacement_energy, DeformationEnergy, Regularizer,
    RegularizationConfig,
};
