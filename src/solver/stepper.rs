//! Per-tick global/local step
//!
//! The global step projects every spring onto its rest length along its
//! current direction; the local step blends those targets with the inertial
//! prediction through one prefactored sparse solve.

use nalgebra_sparse::CscMatrix;
use nalgebra_sparse::ops::Op;
use nalgebra_sparse::ops::serial::spmm_csc_dense;

use crate::core::{Particle, Spring};
use crate::error::{ClothError, ClothResult};
use crate::math::{Real, Stacked, Vector, direction_or_zero, read_stacked, write_stacked};

/// Write each spring's target displacement into `directions` (2 rows per
/// spring). Targets point from `index_b` to `index_a` so they line up with the
/// +1/-1 incidence orientation of L and J; a spring whose endpoints coincide
/// gets the zero vector.
pub fn global_step(particles: &[Particle], springs: &[Spring], directions: &mut Stacked) {
    for (index, spring) in springs.iter().enumerate() {
        let (a, b) = spring.endpoints();
        let delta = particles[a].position - particles[b].position;
        write_stacked(directions, index, direction_or_zero(delta) * spring.rest_length);
    }
}

/// Force term of a single tick.
#[derive(Clone, Copy, Debug, Default)]
pub enum ExternalForce<'a> {
    #[default]
    None,
    /// Same force on every particle
    Uniform(Vector),
    /// One force per particle, row-major
    PerParticle(&'a [Vector]),
}

impl ExternalForce<'_> {
    fn check_len(&self, particle_count: usize) -> ClothResult<()> {
        match self {
            Self::PerParticle(forces) if forces.len() != particle_count => {
                Err(ClothError::ForceLengthMismatch {
                    expected: particle_count,
                    actual: forces.len(),
                })
            }
            _ => Ok(()),
        }
    }

    #[inline(always)]
    fn at(&self, index: usize) -> Option<Vector> {
        match self {
            Self::None => None,
            Self::Uniform(force) => Some(*force),
            Self::PerParticle(forces) => forces.get(index).copied(),
        }
    }
}

/// `rhs = dt^2 J d + M y + dt^2 f`, with `y` the (optionally damped)
/// inertial prediction of every particle. `prediction` is scratch space of
/// the same size as `rhs`.
#[allow(clippy::too_many_arguments)]
pub fn assemble_rhs(
    particles: &[Particle],
    mass: &CscMatrix<Real>,
    coupling: &CscMatrix<Real>,
    directions: &Stacked,
    timestep: Real,
    damping: Real,
    forces: ExternalForce<'_>,
    prediction: &mut Stacked,
    rhs: &mut Stacked,
) -> ClothResult<()> {
    forces.check_len(particles.len())?;

    let dt2 = timestep * timestep;
    // rhs may still hold values from a rejected tick
    rhs.fill(0.0);
    spmm_csc_dense(1.0, &mut *rhs, dt2, Op::NoOp(coupling), Op::NoOp(directions));

    for (index, particle) in particles.iter().enumerate() {
        write_stacked(prediction, index, particle.inertial_target(damping));
    }
    spmm_csc_dense(1.0, &mut *rhs, 1.0, Op::NoOp(mass), Op::NoOp(&*prediction));

    // M (dt^2 M^-1 f) collapses to dt^2 f
    if !matches!(forces, ExternalForce::None) {
        for index in 0..particles.len() {
            if let Some(force) = forces.at(index) {
                let current = read_stacked(rhs, index);
                write_stacked(rhs, index, current + force * dt2);
            }
        }
    }

    Ok(())
}

/// Copy solved positions back into every unpinned particle.
pub fn commit_solution(particles: &mut [Particle], solution: &Stacked) {
    for (index, particle) in particles.iter_mut().enumerate() {
        if particle.is_pinned() {
            continue;
        }
        particle.last_position = particle.position;
        particle.position = read_stacked(solution, index);
    }
}
