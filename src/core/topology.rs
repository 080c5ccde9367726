//! Rectangular grid of particles joined by structural springs
//!
//! Particles are stored row-major. Every particle is linked to its right and
//! lower neighbor; there are no shear or bending springs.

use crate::config::ClothParams;
use crate::error::{ClothError, ClothResult};

use super::particle::Particle;
use super::spring::Spring;

#[derive(Clone, Debug)]
pub struct Topology {
    pub width: usize,
    pub height: usize,
    pub particles: Vec<Particle>,
    pub springs: Vec<Spring>,
}

impl Topology {
    pub fn build(params: &ClothParams) -> ClothResult<Self> {
        params.validate()?;

        let width = params.width;
        let count = params.particle_count();

        let mut particles = Vec::with_capacity(count);
        for index in 0..count {
            let position = params.layout_position(index).ok_or(ClothError::LayoutMismatch {
                expected: count,
                actual: index,
            })?;
            particles.push(Particle::new(position).with_mass(params.particle_mass));
        }

        let mut springs = Vec::with_capacity(expected_spring_count(width, params.height));
        for index in 0..count {
            // Right neighbor, unless index + 1 starts the next row
            if (index + 1) % width != 0 {
                springs.push(Spring::new(index, index + 1, params.stiffness, params.cell_spacing)?);
            }
            // Neighbor one row down
            if index + width < count {
                springs.push(Spring::new(index, index + width, params.stiffness, params.cell_spacing)?);
            }
        }

        particles[0].pin_at(params.anchors[0]);
        particles[width - 1].pin_at(params.anchors[1]);

        Ok(Self {
            width,
            height: params.height,
            particles,
            springs,
        })
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }
}

/// All horizontal plus all vertical neighbor links.
pub fn expected_spring_count(width: usize, height: usize) -> usize {
    width.saturating_sub(1) * height + width * height.saturating_sub(1)
}
