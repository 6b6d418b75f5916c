//! Boundary data for solid models.
//!
//! Every (node, component) pair carries a prescribed force, a prescribed
//! displacement and a constraint flag. A constrained DOF takes its prescribed
//! displacement and is eliminated from the solve; a free DOF takes its
//! prescribed force and is part of equilibrium.

use crate::error::{Error, Result};
use crate::types::Vec3;

/// Per-node boundary data of a solid model.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConditions {
    forces: Vec<Vec3>,
    displacements: Vec<Vec3>,
    constraints: Vec<[bool; 3]>,
}

impl BoundaryConditions {
    /// Unloaded, unconstrained boundary data for `n_nodes` nodes.
    pub fn new(n_nodes: usize) -> Self {
        Self {
            forces: vec![Vec3::zeros(); n_nodes],
            displacements: vec![Vec3::zeros(); n_nodes],
            constraints: vec![[false; 3]; n_nodes],
        }
    }

    /// Number of nodes covered.
    pub fn n_nodes(&self) -> usize {
        self.forces.len()
    }

    /// Total number of DOFs (3 per node).
    pub fn n_dofs(&self) -> usize {
        3 * self.n_nodes()
    }

    fn check(&self, node: usize, component: usize) -> Result<()> {
        if node >= self.n_nodes() || component >= 3 {
            return Err(Error::Mesh(format!(
                "boundary target (node {}, component {}) out of range ({} nodes)",
                node,
                component,
                self.n_nodes()
            )));
        }
        Ok(())
    }

    /// Prescribe a force on a single DOF.
    pub fn set_force(&mut self, node: usize, component: usize, value: f64) -> Result<()> {
        self.check(node, component)?;
        self.forces[node][component] = value;
        Ok(())
    }

    /// Prescribe a displacement on a single DOF and constrain it.
    pub fn set_displacement(&mut self, node: usize, component: usize, value: f64) -> Result<()> {
        self.check(node, component)?;
        self.displacements[node][component] = value;
        self.constraints[node][component] = true;
        Ok(())
    }

    /// Set the constraint flag of a single DOF.
    pub fn constrain(&mut self, node: usize, component: usize, constrained: bool) -> Result<()> {
        self.check(node, component)?;
        self.constraints[node][component] = constrained;
        Ok(())
    }

    /// Constrain all three components of a node to zero displacement.
    pub fn fix_node(&mut self, node: usize) -> Result<()> {
        for component in 0..3 {
            self.set_displacement(node, component, 0.0)?;
        }
        Ok(())
    }

    /// Prescribed nodal forces.
    pub fn forces(&self) -> &[Vec3] {
        &self.forces
    }

    /// Prescribed nodal displacements.
    pub fn displacements(&self) -> &[Vec3] {
        &self.displacements
    }

    /// Constraint flags per node and component.
    pub fn constraints(&self) -> &[[bool; 3]] {
        &self.constraints
    }

    /// Prescribed forces as a flat DOF vector (index 3 * node + component).
    pub fn force_vector(&self) -> Vec<f64> {
        self.forces.iter().flat_map(|f| f.iter().copied()).collect()
    }

    /// Prescribed displacements as a flat DOF vector.
    pub fn displacement_vector(&self) -> Vec<f64> {
        self.displacements
            .iter()
            .flat_map(|u| u.iter().copied())
            .collect()
    }

    /// Constraint mask as a flat DOF vector.
    pub fn constraint_mask(&self) -> Vec<bool> {
        self.constraints.iter().flatten().copied().collect()
    }

    /// Indices of constrained DOFs in increasing order.
    pub fn constrained_dofs(&self) -> Vec<usize> {
        self.constraint_mask()
            .iter()
            .enumerate()
            .filter_map(|(dof, &c)| c.then_some(dof))
            .collect()
    }

    /// Indices of free DOFs in increasing order.
    pub fn free_dofs(&self) -> Vec<usize> {
        self.constraint_mask()
            .iter()
            .enumerate()
            .filter_map(|(dof, &c)| (!c).then_some(dof))
            .collect()
    }
}
