use crate::error::{ClothError, ClothResult};
use crate::math::Real;

/// Structural spring between two particles, stored by particle index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    /// Index to Particle, +1 entry of the incidence vector
    index_a: usize,
    /// Index to Particle, -1 entry of the incidence vector
    index_b: usize,
    pub stiffness: Real,
    pub rest_length: Real,
}

impl Spring {
    pub fn new(index_a: usize, index_b: usize, stiffness: Real, rest_length: Real) -> ClothResult<Self> {
        if index_a == index_b {
            return Err(ClothError::SelfLoopSpring { index: index_a });
        }
        let spring = Self {
            index_a,
            index_b,
            stiffness,
            rest_length,
        };
        spring.check_coefficients()?;
        Ok(spring)
    }

    #[inline(always)]
    pub fn index_a(&self) -> usize {
        self.index_a
    }

    #[inline(always)]
    pub fn index_b(&self) -> usize {
        self.index_b
    }

    #[inline(always)]
    pub fn endpoints(&self) -> (usize, usize) {
        (self.index_a, self.index_b)
    }

    /// Check endpoints against a particle array of `particle_count`, and
    /// stiffness / rest length (both public, so they may have changed since
    /// construction).
    pub fn validate(&self, particle_count: usize) -> ClothResult<()> {
        if self.index_a == self.index_b {
            return Err(ClothError::SelfLoopSpring { index: self.index_a });
        }
        if self.index_a >= particle_count || self.index_b >= particle_count {
            return Err(ClothError::InvalidSpring {
                index_a: self.index_a,
                index_b: self.index_b,
                particle_count,
            });
        }
        self.check_coefficients()
    }

    fn check_coefficients(&self) -> ClothResult<()> {
        if !(self.stiffness.is_finite() && self.stiffness > 0.0) {
            return Err(ClothError::InvalidParameter {
                name: "stiffness",
                value: self.stiffness,
            });
        }
        if !(self.rest_length.is_finite() && self.rest_length > 0.0) {
            return Err(ClothError::InvalidParameter {
                name: "rest_length",
                value: self.rest_length,
            });
        }
        Ok(())
    }
}
