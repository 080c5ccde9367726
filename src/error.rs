//! Error type shared by construction, factorization and stepping.

use nalgebra_sparse::factorization::CholeskyError;
use thiserror::Error;

use crate::math::Real;

#[derive(Debug, Error)]
pub enum ClothError {
    #[error("a {width}x{height} grid cannot be anchored (width must be >= 2, height >= 1)")]
    InvalidTopology { width: usize, height: usize },

    #[error("spring joins particle {index} to itself")]
    SelfLoopSpring { index: usize },

    #[error("spring ({index_a}, {index_b}) is invalid for {particle_count} particles")]
    InvalidSpring {
        index_a: usize,
        index_b: usize,
        particle_count: usize,
    },

    #[error("parameter `{name}` has invalid value {value}")]
    InvalidParameter { name: &'static str, value: Real },

    #[error("initial layout has {actual} positions, expected {expected}")]
    LayoutMismatch { expected: usize, actual: usize },

    #[error("external force slice has {actual} entries, expected {expected}")]
    ForceLengthMismatch { expected: usize, actual: usize },

    #[error("system matrix M + dt^2 L could not be factorized: {0}")]
    SingularSystem(#[from] CholeskyError),

    #[error("linear solve produced {non_finite} non-finite values")]
    SolveFailure { non_finite: usize },
}

pub type ClothResult<T> = Result<T, ClothError>;
