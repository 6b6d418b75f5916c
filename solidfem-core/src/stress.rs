//! Scalar result fields for post-processing.
//!
//! The solver returns one volume-averaged stress tensor per element. This
//! module turns those tensors into the scalar fields visualization consumers
//! plot:
//! - element von Mises and hydrostatic stress
//! - nodal averages of any element scalar over the adjacent elements
//! - nodal displacement magnitudes

use crate::mesh::Mesh;
use crate::solid::Solution;
use crate::types::{StressTensor, Vec3};
use rayon::prelude::*;

/// Element stresses of a solved model.
#[derive(Debug, Clone)]
pub struct StressField {
    /// Stress tensors indexed by element.
    pub element_stresses: Vec<StressTensor>,
}

impl StressField {
    pub fn new(element_stresses: Vec<StressTensor>) -> Self {
        Self { element_stresses }
    }

    /// Take the element stresses of a solution.
    pub fn from_solution(solution: &Solution) -> Self {
        Self::new(solution.stress.clone())
    }

    /// Get stress for a specific element.
    pub fn element(&self, elem_id: usize) -> Option<&StressTensor> {
        self.element_stresses.get(elem_id)
    }

    /// Number of elements with stress data.
    pub fn n_elements(&self) -> usize {
        self.element_stresses.len()
    }

    /// Von Mises stress of every element.
    pub fn von_mises_stresses(&self) -> Vec<f64> {
        self.element_stresses
            .par_iter()
            .map(StressTensor::von_mises)
            .collect()
    }

    /// Hydrostatic (mean normal) stress of every element.
    pub fn hydrostatic_stresses(&self) -> Vec<f64> {
        self.element_stresses
            .par_iter()
            .map(StressTensor::hydrostatic)
            .collect()
    }

    /// Maximum von Mises stress across all elements.
    pub fn max_von_mises(&self) -> f64 {
        self.element_stresses
            .iter()
            .map(StressTensor::von_mises)
            .fold(0.0, f64::max)
    }

    /// Average an element scalar onto the nodes.
    ///
    /// Each node receives the mean over the elements that contain it; nodes
    /// without elements get zero.
    pub fn nodal_average<F>(&self, mesh: &Mesh, scalar: F) -> Vec<f64>
    where
        F: Fn(&StressTensor) -> f64,
    {
        debug_assert_eq!(mesh.n_elements(), self.n_elements());

        let mut sum = vec![0.0; mesh.n_nodes()];
        let mut count = vec![0usize; mesh.n_nodes()];
        for (element, stress) in mesh.elements().zip(&self.element_stresses) {
            let value = scalar(stress);
            for &node in element {
                sum[node] += value;
                count[node] += 1;
            }
        }

        sum.iter()
            .zip(&count)
            .map(|(&s, &n)| if n == 0 { 0.0 } else { s / n as f64 })
            .collect()
    }

    /// Nodal von Mises stress, averaged from adjacent elements.
    pub fn nodal_von_mises(&self, mesh: &Mesh) -> Vec<f64> {
        self.nodal_average(mesh, StressTensor::von_mises)
    }
}

/// Euclidean length of every nodal displacement.
pub fn displacement_magnitudes(displacement: &[Vec3]) -> Vec<f64> {
    displacement.iter().map(|u| u.norm()).collect()
}
