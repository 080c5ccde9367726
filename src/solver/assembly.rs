//! Sparse operator assembly
//!
//! Every per-particle or per-spring scalar is expanded to a 2x2 identity
//! block (Kronecker product with I2), so particle `i` owns rows `2i` and
//! `2i + 1` and spring `s` owns columns `2s` and `2s + 1`.

use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::core::{Particle, Spring};
use crate::error::ClothResult;
use crate::math::{DIM, Real};

/// Constant operators of the implicit system. They depend only on masses,
/// topology and stiffness and are never rebuilt while ticking.
#[derive(Clone, Debug)]
pub struct SystemMatrices {
    /// M, 2N x 2N block diagonal
    pub mass: CscMatrix<Real>,
    /// L, 2N x 2N stiffness-weighted graph Laplacian
    pub laplacian: CscMatrix<Real>,
    /// J, 2N x 2S spring-to-particle coupling
    pub coupling: CscMatrix<Real>,
}

impl SystemMatrices {
    pub fn assemble(particles: &[Particle], springs: &[Spring]) -> ClothResult<Self> {
        for spring in springs {
            spring.validate(particles.len())?;
        }

        Ok(Self {
            mass: mass_matrix(particles),
            laplacian: laplacian(springs, particles.len()),
            coupling: coupling(springs, particles.len()),
        })
    }
}

pub fn mass_matrix(particles: &[Particle]) -> CscMatrix<Real> {
    let size = particles.len() * DIM;
    let mut coo = CooMatrix::new(size, size);
    for (index, particle) in particles.iter().enumerate() {
        for axis in 0..DIM {
            let row = index * DIM + axis;
            coo.push(row, row, particle.mass);
        }
    }
    CscMatrix::from(&coo)
}

/// Sum over springs of `k * e * e^T`, with `e` the signed incidence vector
/// (+1 at `index_a`, -1 at `index_b`). Springs must already be validated.
pub fn laplacian(springs: &[Spring], particle_count: usize) -> CscMatrix<Real> {
    let size = particle_count * DIM;
    let mut coo = CooMatrix::new(size, size);
    for spring in springs {
        let (a, b) = spring.endpoints();
        let k = spring.stiffness;
        for axis in 0..DIM {
            let row_a = a * DIM + axis;
            let row_b = b * DIM + axis;
            coo.push(row_a, row_a, k);
            coo.push(row_b, row_b, k);
            coo.push(row_a, row_b, -k);
            coo.push(row_b, row_a, -k);
        }
    }
    CscMatrix::from(&coo)
}

/// Sum over springs of `k * e * s^T`, with `s` the indicator of the spring's
/// own column. Springs must already be validated.
pub fn coupling(springs: &[Spring], particle_count: usize) -> CscMatrix<Real> {
    let mut coo = CooMatrix::new(particle_count * DIM, springs.len() * DIM);
    for (column, spring) in springs.iter().enumerate() {
        let (a, b) = spring.endpoints();
        let k = spring.stiffness;
        for axis in 0..DIM {
            let col = column * DIM + axis;
            coo.push(a * DIM + axis, col, k);
            coo.push(b * DIM + axis, col, -k);
        }
    }
    CscMatrix::from(&coo)
}

/// `M + dt^2 * L`, the constant matrix of the implicit step.
pub fn system_matrix(
    mass: &CscMatrix<Real>,
    laplacian: &CscMatrix<Real>,
    timestep: Real,
) -> CscMatrix<Real> {
    let dt2 = timestep * timestep;
    let mut coo = CooMatrix::new(mass.nrows(), mass.ncols());
    for (row, col, &value) in mass.triplet_iter() {
        coo.push(row, col, value);
    }
    for (row, col, &value) in laplacian.triplet_iter() {
        coo.push(row, col, dt2 * value);
    }
    CscMatrix::from(&coo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClothError;
    use crate::math::Vector;
    use nalgebra::DMatrix;

    fn chain(count: usize, stiffness: Real) -> (Vec<Particle>, Vec<Spring>) {
        let particles = (0..count)
            .map(|i| Particle::new(Vector::new(i as Real, 0.0)).with_mass(1.0 + i as Real))
            .collect();
        let springs = (0..count - 1)
            .map(|i| Spring::new(i, i + 1, stiffness, 1.0).unwrap())
            .collect();
        (particles, springs)
    }

    #[test]
    fn mass_matrix_repeats_each_mass_per_axis() {
        let (particles, _) = chain(3, 1.0);
        let mass = DMatrix::from(&mass_matrix(&particles));
        assert_eq!(mass.shape(), (6, 6));
        for index in 0..3 {
            let expected = 1.0 + index as Real;
            assert_eq!(mass[(2 * index, 2 * index)], expected);
            assert_eq!(mass[(2 * index + 1, 2 * index + 1)], expected);
        }
        assert_eq!(mass.sum(), 2.0 * (1.0 + 2.0 + 3.0));
    }

    #[test]
    fn laplacian_is_symmetric_with_zero_row_sums() {
        let (particles, springs) = chain(4, 5.0);
        let l = DMatrix::from(&laplacian(&springs, particles.len()));

        assert_eq!(l, l.transpose());
        for row in 0..l.nrows() {
            assert_eq!(l.row(row).sum(), 0.0);
        }
        // Interior particle 1 has two springs, on both axes
        assert_eq!(l[(2, 2)], 10.0);
        assert_eq!(l[(3, 3)], 10.0);
        assert_eq!(l[(2, 4)], -5.0);
        // Axes never mix
        assert_eq!(l[(2, 3)], 0.0);
    }

    #[test]
    fn coupling_has_signed_stiffness_per_spring_column() {
        let (particles, springs) = chain(3, 2.0);
        let j = DMatrix::from(&coupling(&springs, particles.len()));
        assert_eq!(j.shape(), (6, 4));

        // Spring 1 joins particles 1 and 2
        assert_eq!(j[(2, 2)], 2.0);
        assert_eq!(j[(3, 3)], 2.0);
        assert_eq!(j[(4, 2)], -2.0);
        assert_eq!(j[(5, 3)], -2.0);
        assert_eq!(j[(0, 2)], 0.0);

        // J * J^T / k reproduces the Laplacian for uniform stiffness
        let l = DMatrix::from(&laplacian(&springs, particles.len()));
        assert_eq!(&j * j.transpose() / 2.0, l);
    }

    #[test]
    fn isolated_particles_have_empty_rows() {
        let particles: Vec<_> = (0..3).map(|_| Particle::zeroed()).collect();
        let springs = vec![Spring::new(0, 2, 3.0, 1.0).unwrap()];
        let matrices = SystemMatrices::assemble(&particles, &springs).unwrap();

        let l = DMatrix::from(&matrices.laplacian);
        let j = DMatrix::from(&matrices.coupling);
        assert_eq!(l.row(2).sum(), 0.0);
        assert!(l.row(2).iter().all(|&v| v == 0.0));
        assert!(l.column(3).iter().all(|&v| v == 0.0));
        assert!(j.row(2).iter().chain(j.row(3).iter()).all(|&v| v == 0.0));
    }

    #[test]
    fn out_of_range_springs_are_rejected_before_assembly() {
        let particles: Vec<_> = (0..2).map(|_| Particle::zeroed()).collect();
        let springs = vec![Spring::new(0, 5, 1.0, 1.0).unwrap()];
        assert!(matches!(
            SystemMatrices::assemble(&particles, &springs),
            Err(ClothError::InvalidSpring { particle_count: 2, .. })
        ));
    }

    #[test]
    fn system_matrix_adds_scaled_laplacian() {
        let (particles, springs) = chain(2, 4.0);
        let matrices = SystemMatrices::assemble(&particles, &springs).unwrap();
        let a = DMatrix::from(&system_matrix(&matrices.mass, &matrices.laplacian, 0.5));
        // m0 = 1, m1 = 2, dt^2 k = 1
        assert_eq!(a[(0, 0)], 2.0);
        assert_eq!(a[(2, 2)], 3.0);
        assert_eq!(a[(0, 2)], -1.0);
        assert_eq!(a[(1, 3)], -1.0);
    }
}
