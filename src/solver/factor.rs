//! One-time factorization of the implicit system
//!
//! `M + dt^2 L` is symmetric positive definite whenever every mass is
//! positive, so a sparse Cholesky factor is computed once and reused by every
//! tick's solve.

use nalgebra_sparse::CscMatrix;
use nalgebra_sparse::factorization::{CholeskyError, CscCholesky};

use crate::error::{ClothError, ClothResult};
use crate::math::{Real, Stacked};

use super::assembly::system_matrix;

pub struct SystemFactor {
    cholesky: CscCholesky<Real>,
    timestep: Real,
    size: usize,
}

impl SystemFactor {
    pub fn factorize(
        mass: &CscMatrix<Real>,
        laplacian: &CscMatrix<Real>,
        timestep: Real,
    ) -> ClothResult<Self> {
        let system = system_matrix(mass, laplacian, timestep);
        let cholesky = CscCholesky::factor(&system)?;

        // A zero pivot can come back as a (non-finite) factor instead of an error
        let factor = cholesky.l();
        let healthy_pivots = factor
            .triplet_iter()
            .filter(|&(row, col, value)| row == col && value.is_finite() && *value > 0.0)
            .count();
        if healthy_pivots != system.nrows() {
            return Err(ClothError::SingularSystem(CholeskyError::NotPositiveDefinite));
        }

        Ok(Self {
            cholesky,
            timestep,
            size: system.nrows(),
        })
    }

    pub fn timestep(&self) -> Real {
        self.timestep
    }

    /// Dimension of the factorized system (2N).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Non-zeros in the lower-triangular factor.
    pub fn factor_nnz(&self) -> usize {
        self.cholesky.l().nnz()
    }

    /// Solve `A x = rhs` into a fresh buffer; `rhs` is left untouched.
    pub fn solve(&self, rhs: &Stacked) -> ClothResult<Stacked> {
        let mut solution = Stacked::zeros(rhs.nrows(), 1);
        self.solve_into(rhs, &mut solution)?;
        Ok(solution)
    }

    /// Solve `A x = rhs` into `solution`, which must have the shape of `rhs`.
    pub fn solve_into(&self, rhs: &Stacked, solution: &mut Stacked) -> ClothResult<()> {
        solution.copy_from(rhs);
        self.cholesky.solve_mut(&mut *solution);
        let non_finite = solution.iter().filter(|value| !value.is_finite()).count();
        if non_finite > 0 {
            return Err(ClothError::SolveFailure { non_finite });
        }
        Ok(())
    }
}

impl std::fmt::Debug for SystemFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFactor")
            .field("timestep", &self.timestep)
            .field("size", &self.size)
            .field("factor_nnz", &self.factor_nnz())
            .finish()
    }
}
