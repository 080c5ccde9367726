//! Point masses of the cloth
//!
//! Particles carry their current and previous positions; velocity is implicit
//! in the difference between the two.

use crate::config::DEFAULT_PARTICLE_MASS;
use crate::math::{Real, Vector, zero_vector};

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vector,
    pub last_position: Vector, // position before the most recent tick
    pub mass: Real,
    pinned: bool,
}

impl Particle {
    pub fn zeroed() -> Self {
        Self {
            position: zero_vector(),
            last_position: zero_vector(),
            mass: DEFAULT_PARTICLE_MASS,
            pinned: false,
        }
    }

    /// Particle at rest at `position`.
    pub fn new(position: Vector) -> Self {
        Self {
            position,
            last_position: position,
            ..Self::zeroed()
        }
    }

    pub fn with_mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_last_position(mut self, last_position: Vector) -> Self {
        self.last_position = last_position;
        self
    }

    /// Fix the particle at `anchor`. There is no way back: a pinned particle
    /// stays pinned for the lifetime of the cloth.
    pub fn pin_at(&mut self, anchor: Vector) {
        self.position = anchor;
        self.last_position = anchor;
        self.pinned = true;
    }

    #[inline(always)]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    #[inline(always)]
    pub fn displacement(&self) -> Vector {
        self.position - self.last_position
    }

    /// Velocity implied by the last tick of length `timestep`.
    #[inline(always)]
    pub fn velocity(&self, timestep: Real) -> Vector {
        self.displacement() / timestep
    }

    /// Verlet-style prediction used as the inertial target of the solve.
    #[inline(always)]
    pub fn inertial_target(&self, damping: Real) -> Vector {
        self.position + self.displacement() * (1.0 - damping)
    }
}
