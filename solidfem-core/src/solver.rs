//! Linear system solvers.
//!
//! Provides direct solvers for the Newton correction `K·δ = r`. After
//! Dirichlet elimination the stiffness matrix is symmetric positive definite
//! unless the free DOFs admit a rigid-body motion; every backend reports that
//! case as an error instead of returning garbage.
//!
//! # Solver Backends
//!
//! - [`CholeskySolver`]: Sparse Cholesky factorization from `nalgebra-sparse`
//!   with a relative pivot check. Default backend.
//! - [`FaerCholeskySolver`]: Sparse Cholesky factorization using the faer library.
//! - [`DenseLUSolver`]: nalgebra dense LU (for small test problems only).

use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;
use faer::linalg::cholesky::llt::factor::LltError;
use faer::linalg::solvers::Solve;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use faer::sparse::linalg::LltError as SparseLltError;
use faer::sparse::{SparseColMat, SymbolicSparseColMat};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::csc::CscMatrix;
use nalgebra_sparse::factorization::CscCholesky;

/// Linear solver interface.
pub trait Solver: Send + Sync {
    /// Solve the linear system Ax = b.
    ///
    /// # Arguments
    ///
    /// * `matrix` - System matrix (K)
    /// * `rhs` - Right-hand side vector (r)
    ///
    /// # Returns
    ///
    /// Solution vector (δ)
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>>;

    /// Solver name for diagnostics.
    fn name(&self) -> &str;
}

/// Solver backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverType {
    /// `nalgebra-sparse` Cholesky with pivot check.
    #[default]
    Cholesky,
    /// faer sparse Cholesky.
    FaerCholesky,
    /// Dense LU, small problems only.
    DenseLU,
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Solver backend to use.
    pub solver_type: SolverType,
    /// Smallest accepted pivot of a direct factorization, relative to the
    /// largest diagonal entry of the matrix.
    pub pivot_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_type: SolverType::Cholesky,
            pivot_tolerance: 1e-13,
        }
    }
}

fn check_dimensions(matrix: &CsrMatrix, rhs: &[f64]) -> Result<()> {
    if matrix.nrows() != matrix.ncols() {
        return Err(Error::LinearSolve(format!(
            "matrix must be square, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    if matrix.nrows() != rhs.len() {
        return Err(Error::LinearSolve(format!(
            "RHS size mismatch: matrix has {} rows, RHS has {} entries",
            matrix.nrows(),
            rhs.len()
        )));
    }
    Ok(())
}

/// Reject a factorization with a pivot negligible next to the largest
/// diagonal entry of the whole matrix (not the pivot's own row).
fn check_pivot_scale(pivots: &[f64], max_diagonal: f64, tolerance: f64) -> Result<()> {
    let threshold = tolerance * max_diagonal;
    match pivots
        .iter()
        .enumerate()
        .find(|&(_, &p)| !(p.abs() > threshold))
    {
        Some((index, p)) => Err(Error::SingularMatrix(format!(
            "pivot {} is {:e}, below {:e} times the largest diagonal entry; system is rank deficient",
            index, p, tolerance
        ))),
        None => Ok(()),
    }
}

/// Sparse Cholesky solver from `nalgebra-sparse`.
///
/// The factorization only fails on a non-positive pivot. Rank-deficient
/// systems in floating point usually produce tiny positive pivots instead, so
/// every squared pivot `L_ii²` is compared against `pivot_tolerance` times the
/// largest diagonal entry of the matrix.
#[derive(Debug, Clone)]
pub struct CholeskySolver {
    pivot_tolerance: f64,
}

impl CholeskySolver {
    /// Create a solver with the default pivot tolerance.
    pub fn new() -> Self {
        Self::with_pivot_tolerance(SolverConfig::default().pivot_tolerance)
    }

    /// Create a solver with an explicit pivot tolerance.
    pub fn with_pivot_tolerance(pivot_tolerance: f64) -> Self {
        Self { pivot_tolerance }
    }

    fn check_pivots(&self, matrix: &CsrMatrix, factor: &CscMatrix<f64>) -> Result<()> {
        let max_diagonal = matrix
            .triplet_iter()
            .filter(|(i, j, _)| i == j)
            .fold(0.0_f64, |m, (_, _, &v)| m.max(v));

        let mut pivots = vec![0.0; matrix.nrows()];
        for (i, j, &v) in factor.triplet_iter() {
            if i == j {
                pivots[i] = v * v;
            }
        }
        check_pivot_scale(&pivots, max_diagonal, self.pivot_tolerance)
    }
}

impl Default for CholeskySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for CholeskySolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        check_dimensions(matrix, rhs)?;
        let n = matrix.nrows();
        if n == 0 {
            return Ok(vec![]);
        }

        let csc = CscMatrix::from(matrix);
        let cholesky = CscCholesky::factor(&csc)
            .map_err(|err| Error::SingularMatrix(format!("sparse Cholesky failed: {}", err)))?;
        self.check_pivots(matrix, cholesky.l())?;

        let b = DMatrix::from_column_slice(n, 1, rhs);
        let x = cholesky.solve(&b);
        Ok(x.as_slice().to_vec())
    }

    fn name(&self) -> &str {
        "nalgebra-sparse Cholesky"
    }
}

/// Direct solver using nalgebra dense LU factorization.
///
/// Converts the whole matrix to dense storage; only meant for small problems
/// and cross-checking the sparse backends. Partial pivoting happily produces
/// a finite answer for a singular matrix, so the diagonal of `U` goes through
/// the same relative pivot check as [`CholeskySolver`].
#[derive(Debug, Clone, Copy)]
pub struct DenseLUSolver {
    pivot_tolerance: f64,
}

impl DenseLUSolver {
    pub fn new() -> Self {
        Self::with_pivot_tolerance(SolverConfig::default().pivot_tolerance)
    }

    pub fn with_pivot_tolerance(pivot_tolerance: f64) -> Self {
        Self { pivot_tolerance }
    }
}

impl Default for DenseLUSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for DenseLUSolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        check_dimensions(matrix, rhs)?;
        if matrix.nrows() == 0 {
            return Ok(vec![]);
        }

        let dense = DMatrix::from(matrix);
        let max_diagonal = dense.diagonal().amax();
        let lu = dense.lu();
        let pivots: Vec<f64> = lu.u().diagonal().iter().copied().collect();
        check_pivot_scale(&pivots, max_diagonal, self.pivot_tolerance)?;

        let b = DVector::from_column_slice(rhs);
        let solution = lu
            .solve(&b)
            .ok_or_else(|| Error::SingularMatrix("LU factorization failed".into()))?;

        Ok(solution.as_slice().to_vec())
    }

    fn name(&self) -> &str {
        "Dense LU"
    }
}

/// Convert a nalgebra-sparse CSR matrix to a faer `SparseColMat`.
fn csr_to_faer_csc(csr: &CsrMatrix) -> SparseColMat<usize, f64> {
    let (nrows, ncols) = (csr.nrows(), csr.ncols());
    let (col_offsets, row_indices, values) = CscMatrix::from(csr).disassemble();

    // SAFETY: `CscMatrix` guarantees monotone column offsets and sorted,
    // in-bounds, duplicate-free row indices in every column.
    unsafe {
        SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(nrows, ncols, col_offsets, None, row_indices),
            values,
        )
    }
}

/// Sparse Cholesky solver using the faer library.
///
/// Uses faer's sparse LLᵀ factorization with a fresh symbolic analysis per
/// solve, since the Newton loop rebuilds the matrix every iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerCholeskySolver;

impl FaerCholeskySolver {
    /// Create a new sparse Cholesky solver.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for FaerCholeskySolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        check_dimensions(matrix, rhs)?;
        let n = matrix.nrows();
        if n == 0 {
            return Ok(vec![]);
        }

        let csc = csr_to_faer_csc(matrix);
        let csc_ref = csc.as_ref();

        let symbolic = SymbolicLlt::try_new(csc_ref.symbolic(), faer::Side::Lower)
            .map_err(|_| Error::LinearSolve("symbolic Cholesky analysis failed".into()))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc_ref, faer::Side::Lower).map_err(
            |e| match e {
                SparseLltError::Generic(err) => {
                    Error::LinearSolve(format!("sparse Cholesky error: {:?}", err))
                }
                SparseLltError::Numeric(LltError::NonPositivePivot { index }) => {
                    Error::SingularMatrix(format!(
                        "matrix is not positive definite at pivot {}",
                        index
                    ))
                }
            },
        )?;

        let mut x = faer::Mat::from_fn(n, 1, |i, _| rhs[i]);
        llt.solve_in_place(x.as_mut());

        let solution: Vec<f64> = (0..n).map(|i| x[(i, 0)]).collect();
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(Error::SingularMatrix(
                "non-finite entries in sparse Cholesky solution".into(),
            ));
        }
        Ok(solution)
    }

    fn name(&self) -> &str {
        "faer Sparse Cholesky (LLᵀ)"
    }
}

/// Select a solver backend from the configuration.
pub fn select_solver(config: &SolverConfig) -> Box<dyn Solver> {
    match config.solver_type {
        SolverType::Cholesky => Box::new(CholeskySolver::with_pivot_tolerance(
            config.pivot_tolerance,
        )),
        SolverType::FaerCholesky => Box::new(FaerCholeskySolver::new()),
        SolverType::DenseLU => Box::new(DenseLUSolver::with_pivot_tolerance(
            config.pivot_tolerance,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::TripletMatrix;
    use approx::assert_relative_eq;

    fn csr_from_dense(n: usize, entries: &[f64]) -> CsrMatrix {
        let mut triplet = TripletMatrix::new(n, n);
        for i in 0..n {
            for j in 0..n {
                let v = entries[i * n + j];
                if v != 0.0 {
                    triplet.add(i, j, v);
                }
            }
        }
        triplet.to_csr().unwrap()
    }

    fn all_solvers() -> Vec<Box<dyn Solver>> {
        vec![
            Box::new(CholeskySolver::new()),
            Box::new(FaerCholeskySolver::new()),
            Box::new(DenseLUSolver::new()),
        ]
    }

    #[test]
    fn test_simple_spd() {
        // [4 2; 2 3] * [x; y] = [4; 5] -> x = 0.25, y = 1.5
        let matrix = csr_from_dense(2, &[4.0, 2.0, 2.0, 3.0]);
        for solver in all_solvers() {
            let solution = solver.solve(&matrix, &[4.0, 5.0]).unwrap();
            assert_relative_eq!(solution[0], 0.25, epsilon = 1e-10);
            assert_relative_eq!(solution[1], 1.5, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_3x3_spd() {
        // Solution: [-3/16, 11/8, 3/4]
        let matrix = csr_from_dense(3, &[4.0, 2.0, 0.0, 2.0, 5.0, 2.0, 0.0, 2.0, 3.0]);
        let expected = [-0.1875, 1.375, 0.75];
        for solver in all_solvers() {
            let solution = solver.solve(&matrix, &[2.0, 8.0, 5.0]).unwrap();
            for i in 0..3 {
                assert_relative_eq!(solution[i], expected[i], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_banded_stiffness_residual() {
        let mut triplet = TripletMatrix::new(6, 6);
        for i in 0..6 {
            triplet.add(i, i, 4.0);
        }
        for i in 0..5 {
            triplet.add(i, i + 1, -1.0);
            triplet.add(i + 1, i, -1.0);
        }
        let matrix = triplet.to_csr().unwrap();
        let rhs = vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0];

        let solution = CholeskySolver::new().solve(&matrix, &rhs).unwrap();

        let dense = DMatrix::from(&matrix);
        let residual = (&dense * DVector::from_vec(solution) - DVector::from_vec(rhs)).norm();
        assert!(residual < 1e-10, "Residual too large: {}", residual);
    }

    #[test]
    fn test_empty_system() {
        let matrix = TripletMatrix::new(0, 0).to_csr().unwrap();
        for solver in all_solvers() {
            assert!(solver.solve(&matrix, &[]).unwrap().is_empty());
        }
    }

    #[test]
    fn test_rhs_mismatch() {
        let matrix = csr_from_dense(2, &[1.0, 0.0, 0.0, 1.0]);
        for solver in all_solvers() {
            let err = solver.solve(&matrix, &[1.0, 2.0, 3.0]).unwrap_err();
            assert!(matches!(err, Error::LinearSolve(_)));
        }
    }

    #[test]
    fn test_not_positive_definite() {
        // Eigenvalues 3 and -1
        let matrix = csr_from_dense(2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(CholeskySolver::new().solve(&matrix, &[1.0, 1.0]).is_err());
        assert!(FaerCholeskySolver::new().solve(&matrix, &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_exactly_singular() {
        let matrix = csr_from_dense(2, &[1.0, -1.0, -1.0, 1.0]);
        for solver in all_solvers() {
            let err = solver.solve(&matrix, &[1.0, -1.0]).unwrap_err();
            assert!(err.is_linear_solve(), "{}: {}", solver.name(), err);
        }
    }

    #[test]
    fn test_pivot_check_rejects_near_singular() {
        let matrix = csr_from_dense(2, &[1.0, -1.0, -1.0, 1.0 + 1e-15]);
        let err = CholeskySolver::new().solve(&matrix, &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::SingularMatrix(_)));
        let err = DenseLUSolver::new().solve(&matrix, &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::SingularMatrix(_)));

        // A looser tolerance accepts the same system
        let solver = CholeskySolver::with_pivot_tolerance(1e-17);
        assert!(solver.solve(&matrix, &[1.0, 0.0]).is_ok());
    }

    #[test]
    fn test_pivot_check_accepts_stiffness_contrast() {
        // Soft spring to ground in series with a spring 1e10 times stiffer:
        // the last pivot is tiny next to its own diagonal entry but the
        // system is well posed.
        let c = 1e10;
        let matrix = csr_from_dense(2, &[1.0 + c, -c, -c, c]);
        let expected = [1.0, 1.0 + 1.0 / c];
        for solver in all_solvers() {
            let solution = solver.solve(&matrix, &[0.0, 1.0]).unwrap();
            for i in 0..2 {
                assert_relative_eq!(solution[i], expected[i], max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn test_select_solver() {
        let config = SolverConfig::default();
        assert_eq!(select_solver(&config).name(), "nalgebra-sparse Cholesky");

        let config = SolverConfig {
            solver_type: SolverType::FaerCholesky,
            ..SolverConfig::default()
        };
        assert_eq!(select_solver(&config).name(), "faer Sparse Cholesky (LLᵀ)");
    }
}
