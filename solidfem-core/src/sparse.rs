//! Global sparse assembly.
//!
//! The global stiffness matrix is rebuilt from scratch on every Newton
//! iteration: element blocks are appended as (row, col, value) triplets and
//! compressed once into CSR, which sums duplicate coordinates. Dirichlet
//! elimination happens while appending, so the compressed matrix already has
//! identity rows and columns on constrained DOFs.

use crate::error::{Error, Result};
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix as NalgebraCsr;

/// Compressed Sparse Row matrix.
pub type CsrMatrix = NalgebraCsr<f64>;

/// Accumulating COO builder for a global matrix.
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletMatrix {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self::with_capacity(n_rows, n_cols, 0)
    }

    /// Builder with room for `nnz_estimate` triplets.
    pub fn with_capacity(n_rows: usize, n_cols: usize, nnz_estimate: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::with_capacity(nnz_estimate),
            cols: Vec::with_capacity(nnz_estimate),
            values: Vec::with_capacity(nnz_estimate),
        }
    }

    /// Append one entry; repeated coordinates add up on compression.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    /// Scatter-add flattened element blocks through precomputed index arrays.
    ///
    /// `rows`, `cols` and `values` are parallel arrays, one entry per
    /// element-local stiffness coefficient. Entries whose row or column is
    /// constrained are dropped and every constrained DOF receives a unit
    /// diagonal, so the compressed matrix has identity rows and columns on the
    /// constrained set.
    pub fn add_eliminated(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        values: &[f64],
        constrained: &[bool],
    ) {
        debug_assert_eq!(rows.len(), values.len());
        debug_assert_eq!(cols.len(), values.len());
        debug_assert_eq!(constrained.len(), self.n_rows);

        for ((&row, &col), &value) in rows.iter().zip(cols).zip(values) {
            if !constrained[row] && !constrained[col] {
                self.add(row, col, value);
            }
        }
        for dof in constrained
            .iter()
            .enumerate()
            .filter_map(|(dof, &c)| c.then_some(dof))
        {
            self.add(dof, dof, 1.0);
        }
    }

    /// Number of stored triplets.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Compress into CSR.
    ///
    /// # Errors
    ///
    /// [`Error::LinearSolve`] if a triplet lies outside the matrix shape.
    pub fn to_csr(self) -> Result<CsrMatrix> {
        let coo = CooMatrix::try_from_triplets(
            self.n_rows,
            self.n_cols,
            self.rows,
            self.cols,
            self.values,
        )
        .map_err(|e| Error::LinearSolve(format!("invalid triplet data: {}", e)))?;

        Ok(CsrMatrix::from(&coo))
    }
}

/// Global DOF vector filled by scatter-add from element vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct DofVector {
    values: Vec<f64>,
}

impl DofVector {
    pub fn zeros(n_dofs: usize) -> Self {
        Self {
            values: vec![0.0; n_dofs],
        }
    }

    /// Accumulate `values[k]` into global entry `indices[k]`; repeated indices add up.
    pub fn scatter_add(&mut self, indices: &[usize], values: &[f64]) {
        debug_assert_eq!(indices.len(), values.len());
        for (&dof, &v) in indices.iter().zip(values) {
            self.values[dof] += v;
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn test_triplet_to_csr() {
        let mut triplet = TripletMatrix::new(3, 3);
        triplet.add(0, 0, 1.0);
        triplet.add(1, 1, 2.0);
        triplet.add(2, 2, 3.0);
        triplet.add(0, 1, 0.5);
        triplet.add(1, 0, 0.5);

        let csr = triplet.to_csr().unwrap();
        assert_eq!(csr.nrows(), 3);
        assert_eq!(csr.ncols(), 3);
        assert_eq!(csr.nnz(), 5);
    }

    #[test]
    fn test_duplicate_summation() {
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 1.0);
        triplet.add(0, 0, 2.0);
        triplet.add(0, 0, 3.0);

        let dense = DMatrix::from(&triplet.to_csr().unwrap());
        assert_relative_eq!(dense[(0, 0)], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_triplet_is_error() {
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.rows.push(5);
        triplet.cols.push(0);
        triplet.values.push(1.0);
        assert!(triplet.to_csr().is_err());
    }

    #[test]
    fn test_eliminated_scatter() {
        // Two overlapping 2x2 blocks on dofs [0, 1] and [1, 2], dof 2 constrained
        let rows = [0, 0, 1, 1, 1, 1, 2, 2];
        let cols = [0, 1, 0, 1, 1, 2, 1, 2];
        let values = [2.0, -1.0, -1.0, 2.0, 3.0, -4.0, -4.0, 5.0];
        let constrained = [false, false, true];

        let mut triplet = TripletMatrix::new(3, 3);
        triplet.add_eliminated(&rows, &cols, &values, &constrained);
        let dense = DMatrix::from(&triplet.to_csr().unwrap());

        let expected = DMatrix::from_row_slice(3, 3, &[
            2.0, -1.0, 0.0,
            -1.0, 5.0, 0.0,
            0.0, 0.0, 1.0,
        ]);
        assert_relative_eq!(dense, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_dof_vector_scatter() {
        let mut vec = DofVector::zeros(5);
        vec.scatter_add(&[0, 2], &[1.0, 3.0]);
        vec.scatter_add(&[1, 3, 1], &[2.0, 4.0, 0.5]);

        assert_eq!(vec.as_slice(), &[1.0, 2.5, 3.0, 4.0, 0.0]);
        assert_eq!(vec.into_vec().len(), 5);
    }
}
