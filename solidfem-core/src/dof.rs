//! Global DOF numbering.
//!
//! Node `n`, component `c` owns global DOF `3 * n + c`. Element-local DOFs are
//! interleaved by node (`[u_0, v_0, w_0, u_1, ...]`), matching the column
//! layout of the strain-displacement operator. The map is computed once per
//! mesh and reused by every assembly pass.

use crate::mesh::Mesh;

/// Precomputed element-to-global DOF index map.
#[derive(Debug, Clone, PartialEq)]
pub struct DofMap {
    n_dofs: usize,
    dofs_per_element: usize,
    /// Global DOFs of every element, `n_elements * dofs_per_element` entries.
    element_dofs: Vec<usize>,
    /// Global row of every element-local stiffness entry (row-major per element).
    rows: Vec<usize>,
    /// Global column of every element-local stiffness entry.
    cols: Vec<usize>,
}

impl DofMap {
    /// Build the map for a mesh.
    pub fn new(mesh: &Mesh) -> Self {
        let dofs_per_element = mesh.element_type().n_dofs();
        let n_elements = mesh.n_elements();

        let mut element_dofs = Vec::with_capacity(n_elements * dofs_per_element);
        for element in mesh.elements() {
            for &node in element {
                element_dofs.extend((0..3).map(|c| 3 * node + c));
            }
        }

        let block = dofs_per_element * dofs_per_element;
        let mut rows = Vec::with_capacity(n_elements * block);
        let mut cols = Vec::with_capacity(n_elements * block);
        for dofs in element_dofs.chunks_exact(dofs_per_element) {
            for &row in dofs {
                for &col in dofs {
                    rows.push(row);
                    cols.push(col);
                }
            }
        }

        log::debug!(
            "DOF map: {} global DOFs, {} elements x {} local DOFs",
            3 * mesh.n_nodes(),
            n_elements,
            dofs_per_element
        );

        Self {
            n_dofs: 3 * mesh.n_nodes(),
            dofs_per_element,
            element_dofs,
            rows,
            cols,
        }
    }

    /// Total number of global DOFs.
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// Number of DOFs per element.
    pub fn dofs_per_element(&self) -> usize {
        self.dofs_per_element
    }

    /// Number of elements covered by the map.
    pub fn n_elements(&self) -> usize {
        self.element_dofs.len() / self.dofs_per_element
    }

    /// Global DOFs of one element.
    pub fn element_dofs(&self, element: usize) -> &[usize] {
        let n = self.dofs_per_element;
        &self.element_dofs[element * n..(element + 1) * n]
    }

    /// Global DOFs of all elements, flattened.
    pub fn all_element_dofs(&self) -> &[usize] {
        &self.element_dofs
    }

    /// Global row index of every element stiffness entry.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Global column index of every element stiffness entry.
    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    /// Gather the element-local values of a global DOF vector.
    pub fn gather(&self, element: usize, global: &[f64]) -> Vec<f64> {
        self.element_dofs(element)
            .iter()
            .map(|&dof| global[dof])
            .collect()
    }
}
