//! The cloth: particles, springs, constant operators and per-tick buffers
//!
//! A `Cloth` is built once from [`ClothParams`] (or a hand-made
//! [`Topology`]), factorizes its implicit system a single time, and then only
//! mutates particle state when [`Cloth::advance`] is called.

use std::time::Instant;

use bevy::log::{debug, info};
use bevy::prelude::Resource;

use crate::config::ClothParams;
use crate::error::{ClothError, ClothResult};
use crate::math::{Real, Stacked, Vector, zero_stacked};
use crate::solver::{
    ExternalForce, SystemFactor, SystemMatrices, assemble_rhs, commit_solution, global_step,
};

use super::particle::Particle;
use super::spring::Spring;
use super::topology::Topology;

#[derive(Resource, Debug)]
pub struct Cloth {
    width: usize,
    height: usize,
    particles: Vec<Particle>,
    springs: Vec<Spring>,
    matrices: SystemMatrices,
    factor: SystemFactor,
    damping: Real,
    // Scratch buffers reused every tick
    directions: Stacked,
    prediction: Stacked,
    rhs: Stacked,
    solution: Stacked,
    tick: u64,
}

impl Cloth {
    pub fn new(params: &ClothParams) -> ClothResult<Self> {
        let topology = Topology::build(params)?;
        Self::from_topology(topology, params.timestep, params.damping)
    }

    /// Build from an arbitrary particle/spring set. Springs are checked
    /// against the particle array before any matrix is assembled.
    pub fn from_topology(topology: Topology, timestep: Real, damping: Real) -> ClothResult<Self> {
        if topology.particles.is_empty() {
            return Err(ClothError::InvalidTopology {
                width: topology.width,
                height: topology.height,
            });
        }
        check_timestep(timestep)?;
        if !(0.0..1.0).contains(&damping) {
            return Err(ClothError::InvalidParameter {
                name: "damping",
                value: damping,
            });
        }

        let Topology {
            width,
            height,
            particles,
            springs,
        } = topology;

        let matrices = SystemMatrices::assemble(&particles, &springs)?;

        let start = Instant::now();
        let factor = SystemFactor::factorize(&matrices.mass, &matrices.laplacian, timestep)?;
        let elapsed = start.elapsed().as_secs_f32() * 1000.0;

        info!(
            "cloth: {} particles, {} springs, L nnz {}, J nnz {}, factor nnz {}",
            particles.len(),
            springs.len(),
            matrices.laplacian.nnz(),
            matrices.coupling.nnz(),
            factor.factor_nnz()
        );
        info!("cloth_factorize: {:.3}ms", elapsed);

        let directions = zero_stacked(springs.len());
        let prediction = zero_stacked(particles.len());
        let rhs = zero_stacked(particles.len());
        let solution = zero_stacked(particles.len());

        Ok(Self {
            width,
            height,
            particles,
            springs,
            matrices,
            factor,
            damping,
            directions,
            prediction,
            rhs,
            solution,
            tick: 0,
        })
    }

    /// Run one global step followed by one local step.
    pub fn advance(&mut self) -> ClothResult<()> {
        self.step(ExternalForce::None)
    }

    /// Like [`advance`](Self::advance), with one external force per particle.
    pub fn advance_with_forces(&mut self, forces: &[Vector]) -> ClothResult<()> {
        self.step(ExternalForce::PerParticle(forces))
    }

    /// Like [`advance`](Self::advance), with the same force on every particle.
    pub fn advance_with_force(&mut self, force: Vector) -> ClothResult<()> {
        self.step(ExternalForce::Uniform(force))
    }

    fn step(&mut self, forces: ExternalForce<'_>) -> ClothResult<()> {
        global_step(&self.particles, &self.springs, &mut self.directions);
        assemble_rhs(
            &self.particles,
            &self.matrices.mass,
            &self.matrices.coupling,
            &self.directions,
            self.factor.timestep(),
            self.damping,
            forces,
            &mut self.prediction,
            &mut self.rhs,
        )?;

        // Nothing is written to the particles unless the whole solve succeeded
        self.factor.solve_into(&self.rhs, &mut self.solution)?;
        commit_solution(&mut self.particles, &self.solution);

        self.tick += 1;
        Ok(())
    }

    /// Refactorize `M + dt^2 L` for a new timestep. M and L are reused; on
    /// failure the previous factor stays in place.
    pub fn set_timestep(&mut self, timestep: Real) -> ClothResult<()> {
        check_timestep(timestep)?;
        let factor =
            SystemFactor::factorize(&self.matrices.mass, &self.matrices.laplacian, timestep)?;
        debug!(
            "cloth: refactorized for timestep {} (was {})",
            timestep,
            self.factor.timestep()
        );
        self.factor = factor;
        Ok(())
    }

    pub fn timestep(&self) -> Real {
        self.factor.timestep()
    }

    pub fn damping(&self) -> Real {
        self.damping
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn matrices(&self) -> &SystemMatrices {
        &self.matrices
    }

    /// Row-major particle positions.
    pub fn positions(&self) -> impl Iterator<Item = Vector> + '_ {
        self.particles.iter().map(|particle| particle.position)
    }

    /// Endpoint index pairs, one per spring, for drawing segments.
    pub fn spring_segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.springs.iter().map(Spring::endpoints)
    }

    pub fn velocity(&self, index: usize) -> Option<Vector> {
        let timestep = self.timestep();
        self.particles
            .get(index)
            .map(|particle| particle.velocity(timestep))
    }

    pub fn kinetic_energy(&self) -> Real {
        let timestep = self.timestep();
        self.particles
            .iter()
            .map(|particle| 0.5 * particle.mass * particle.velocity(timestep).length_squared())
            .sum()
    }
}

fn check_timestep(timestep: Real) -> ClothResult<()> {
    if timestep.is_finite() && timestep > 0.0 {
        Ok(())
    } else {
        Err(ClothError::InvalidParameter {
            name: "timestep",
            value: timestep,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pair_topology(mass: Real) -> Topology {
        let mut anchor = Particle::new(Vector::ZERO).with_mass(mass);
        anchor.pin_at(Vector::ZERO);
        Topology {
            width: 2,
            height: 1,
            particles: vec![anchor, Particle::new(Vector::new(2.0, 0.0)).with_mass(mass)],
            springs: vec![Spring::new(0, 1, 10.0, 1.0).unwrap()],
        }
    }

    #[test]
    fn stretched_spring_pulls_free_end_toward_rest_length() {
        let mut cloth = Cloth::from_topology(pair_topology(1.0), 0.1, 0.0).unwrap();
        cloth.advance().unwrap();

        let free = cloth.particle(1).unwrap();
        assert!(free.position.x < 2.0);
        assert!(free.position.x > 1.0);
        assert_relative_eq!(free.position.x, 2.3 / 1.2, epsilon = 1e-12);
        assert_relative_eq!(free.position.y, 0.0, epsilon = 1e-12);
        assert_eq!(free.last_position, Vector::new(2.0, 0.0));
        assert_eq!(cloth.particle(0).unwrap().position, Vector::ZERO);
        assert_eq!(cloth.tick(), 1);
    }

    #[test]
    fn hand_built_spring_with_negative_rest_length_is_rejected() {
        let mut topology = pair_topology(1.0);
        topology.springs[0].rest_length = -1.0;
        assert!(matches!(
            Cloth::from_topology(topology, 0.1, 0.0),
            Err(ClothError::InvalidParameter { name: "rest_length", .. })
        ));

        let mut topology = pair_topology(1.0);
        topology.springs[0].stiffness = Real::NAN;
        assert!(matches!(
            Cloth::from_topology(topology, 0.1, 0.0),
            Err(ClothError::InvalidParameter { name: "stiffness", .. })
        ));
    }

    #[test]
    fn uniform_force_matches_per_particle_forces() {
        let gravity = Vector::new(0.0, -9.8);
        let mut uniform = Cloth::from_topology(pair_topology(1.0), 0.1, 0.0).unwrap();
        let mut sliced = Cloth::from_topology(pair_topology(1.0), 0.1, 0.0).unwrap();
        for _ in 0..5 {
            uniform.advance_with_force(gravity).unwrap();
            sliced.advance_with_forces(&[gravity, gravity]).unwrap();
        }
        assert_eq!(uniform.particles(), sliced.particles());
        assert!(uniform.particle(1).unwrap().position.y < 0.0);
    }

    #[test]
    fn massless_free_particles_cannot_be_factorized() {
        let topology = Topology {
            width: 2,
            height: 1,
            particles: vec![Particle::zeroed().with_mass(0.0), Particle::zeroed().with_mass(0.0)],
            springs: Vec::new(),
        };
        assert!(matches!(
            Cloth::from_topology(topology, 0.1, 0.0),
            Err(ClothError::SingularSystem(_))
        ));
    }

    #[test]
    fn timestep_change_keeps_old_factor_on_error() {
        let mut cloth = Cloth::from_topology(pair_topology(1.0), 0.1, 0.0).unwrap();
        assert!(cloth.set_timestep(-1.0).is_err());
        assert_eq!(cloth.timestep(), 0.1);

        cloth.set_timestep(0.05).unwrap();
        assert_eq!(cloth.timestep(), 0.05);
        cloth.advance().unwrap();
        assert!(cloth.particle(1).unwrap().position.x < 2.0);
    }

    #[test]
    fn velocity_and_energy_follow_last_tick() {
        let mut cloth = Cloth::from_topology(pair_topology(2.0), 0.1, 0.0).unwrap();
        assert_eq!(cloth.kinetic_energy(), 0.0);
        cloth.advance().unwrap();

        let velocity = cloth.velocity(1).unwrap();
        assert!(velocity.x < 0.0);
        assert_relative_eq!(cloth.kinetic_energy(), velocity.length_squared(), epsilon = 1e-9);
        assert_eq!(cloth.velocity(0), Some(Vector::ZERO));
        assert_eq!(cloth.velocity(2), None);
    }
}
