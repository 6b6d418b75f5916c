//! Solid model and Newton-Raphson load stepping.
//!
//! A [`Solid`] owns the mesh, the vectorized material, the boundary data and
//! the DOF map. [`Solid::solve`] walks the load-factor breakpoints and runs a
//! fixed number of Newton-Raphson iterations per increment:
//!
//! ```text
//! for each increment:
//!     ΔF_ext = Δλ · F,  ΔU = Δλ · U
//!     repeat max_iter times:
//!         Δu[constrained] = ΔU[constrained]
//!         integrate → assemble K (constrained rows/cols = identity), F_int
//!         r = F_int - ΔF_ext, r[constrained] = 0
//!         Δu -= K⁻¹ r
//!     commit strain, stress and internal force at Δu; u += Δu
//! ```
//!
//! The residual norm is logged and recorded but never ends the loop early.

use crate::boundary::BoundaryConditions;
use crate::dof::DofMap;
use crate::element::{ElementType, QuadratureTable};
use crate::error::{Error, Result};
use crate::integration::{integrate, ElementIntegrals};
use crate::material::{Stiffness, VectorizedMaterial};
use crate::mesh::Mesh;
use crate::solver::{select_solver, Solver, SolverConfig};
use crate::sparse::{CsrMatrix, DofVector, TripletMatrix};
use crate::types::{Point3, StrainTensor, StressTensor, Vec3};
use nalgebra::{DVectorView, Vector6};

/// Newton-Raphson configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    /// Ordered load-factor breakpoints, starting at the unloaded state.
    pub increments: Vec<f64>,
    /// Iterations per increment. Always executed in full.
    pub max_iter: usize,
    /// Residual norm above which a committed increment is reported as not
    /// converged. Does not stop or extend the iteration.
    pub tolerance: f64,
    /// Linear solver used by [`Solid::solve`].
    pub solver: SolverConfig,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            increments: vec![0.0, 1.0],
            max_iter: 3,
            tolerance: 1e-10,
            solver: SolverConfig::default(),
        }
    }
}

impl NewtonConfig {
    fn validate(&self) -> Result<()> {
        if self.increments.len() < 2 {
            return Err(Error::Configuration(format!(
                "need at least two load-factor breakpoints, got {}",
                self.increments.len()
            )));
        }
        if self.increments.iter().any(|l| !l.is_finite()) {
            return Err(Error::Configuration(
                "load-factor breakpoints must be finite".into(),
            ));
        }
        if self.max_iter == 0 {
            return Err(Error::Configuration(
                "max_iter must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Residual norm of one Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualRecord {
    /// Increment number, starting at 1.
    pub increment: usize,
    /// Iteration within the increment, starting at 0.
    pub iteration: usize,
    /// Euclidean norm of the free-DOF residual before the correction.
    pub norm: f64,
}

/// Result of [`Solid::solve`].
#[derive(Debug, Clone)]
pub struct Solution {
    /// Nodal displacements.
    pub displacement: Vec<Vec3>,
    /// Nodal internal forces at the final state (reactions on constrained DOFs).
    pub force: Vec<Vec3>,
    /// Element stress, averaged over the element volume
    /// (`Σ w·detJ·σ / Σ w·detJ` over its integration points).
    pub stress: Vec<StressTensor>,
    /// Element strain, averaged over the element volume like `stress`.
    pub strain: Vec<StrainTensor>,
    /// Residual history, one record per iteration.
    pub residuals: Vec<ResidualRecord>,
}

fn to_nodal(values: &[f64]) -> Vec<Vec3> {
    values
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect()
}

fn norm(values: &[f64]) -> f64 {
    DVectorView::from_slice(values, values.len()).norm()
}

/// Small-strain solid model.
#[derive(Debug, Clone)]
pub struct Solid {
    mesh: Mesh,
    quadrature: QuadratureTable,
    material: VectorizedMaterial,
    boundary: BoundaryConditions,
    dofs: DofMap,
}

impl Solid {
    /// Create a solid with one material law shared by all elements.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for unsupported or mixed element arity and for
    /// laws without a 3D stiffness; [`Error::Mesh`] for out-of-range node
    /// indices.
    pub fn new<E: AsRef<[usize]>, L: Stiffness>(
        nodes: Vec<Point3>,
        elements: &[E],
        material: &L,
    ) -> Result<Self> {
        let mesh = Mesh::new(nodes, elements)?;
        let material = VectorizedMaterial::broadcast(material, mesh.n_elements())?;
        Self::from_parts(mesh, material)
    }

    /// Create a solid with one material law per element.
    pub fn with_materials<E: AsRef<[usize]>, L: Stiffness>(
        nodes: Vec<Point3>,
        elements: &[E],
        materials: &[L],
    ) -> Result<Self> {
        let mesh = Mesh::new(nodes, elements)?;
        let material = VectorizedMaterial::per_element(materials)?;
        Self::from_parts(mesh, material)
    }

    /// Assemble a solid from a mesh and a vectorized material.
    pub fn from_parts(mesh: Mesh, material: VectorizedMaterial) -> Result<Self> {
        if material.len() != mesh.n_elements() {
            return Err(Error::Configuration(format!(
                "{} material slots for {} elements",
                material.len(),
                mesh.n_elements()
            )));
        }

        let quadrature = mesh.element_type().quadrature_table();
        let dofs = DofMap::new(&mesh);
        let boundary = BoundaryConditions::new(mesh.n_nodes());

        log::debug!(
            "solid model: {} nodes, {} {:?} elements, {} integration points per element",
            mesh.n_nodes(),
            mesh.n_elements(),
            mesh.element_type(),
            quadrature.len()
        );

        Ok(Self {
            mesh,
            quadrature,
            material,
            boundary,
            dofs,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn element_type(&self) -> ElementType {
        self.mesh.element_type()
    }

    /// Total number of DOFs.
    pub fn n_dofs(&self) -> usize {
        self.dofs.n_dofs()
    }

    pub fn material(&self) -> &VectorizedMaterial {
        &self.material
    }

    pub fn dof_map(&self) -> &DofMap {
        &self.dofs
    }

    pub fn boundary(&self) -> &BoundaryConditions {
        &self.boundary
    }

    /// Mutable boundary data (forces, displacements, constraints).
    pub fn boundary_mut(&mut self) -> &mut BoundaryConditions {
        &mut self.boundary
    }

    /// Integrate all elements for a given history and displacement increment.
    ///
    /// Pure function of its inputs: the committed history is not touched.
    pub fn integrate_step(
        &self,
        strain: &[Vector6<f64>],
        stress: &[Vector6<f64>],
        du: &[f64],
    ) -> Result<ElementIntegrals> {
        integrate(
            &self.mesh,
            &self.quadrature,
            &self.dofs,
            &self.material,
            strain,
            stress,
            du,
        )
    }

    /// Assemble the global stiffness matrix with Dirichlet elimination.
    ///
    /// Entries in a constrained row or column are dropped and constrained
    /// diagonal entries are set to one.
    pub fn assemble_stiffness(
        &self,
        integrals: &ElementIntegrals,
        constrained: &[bool],
    ) -> Result<CsrMatrix> {
        let n = self.n_dofs();
        if constrained.len() != n {
            return Err(Error::Configuration(format!(
                "constraint mask has {} entries, model has {} DOFs",
                constrained.len(),
                n
            )));
        }

        let mut triplet = TripletMatrix::with_capacity(n, n, self.dofs.rows().len() + n);
        triplet.add_eliminated(
            self.dofs.rows(),
            self.dofs.cols(),
            &integrals.stiffness,
            constrained,
        );
        log::debug!("assembled {} stiffness triplets for {} DOFs", triplet.nnz(), n);
        triplet.to_csr()
    }

    /// Assemble the global internal force vector.
    pub fn assemble_force(&self, integrals: &ElementIntegrals) -> Vec<f64> {
        let mut force = DofVector::zeros(self.n_dofs());
        force.scatter_add(self.dofs.all_element_dofs(), &integrals.internal_force);
        force.into_vec()
    }

    fn residual(f_int: &[f64], f_ext: &[f64], constrained: &[bool]) -> Vec<f64> {
        f_int
            .iter()
            .zip(f_ext)
            .zip(constrained)
            .map(|((fi, fe), &c)| if c { 0.0 } else { fi - fe })
            .collect()
    }

    /// Solve with the default linear solver.
    ///
    /// `increments` are load-factor breakpoints (e.g. `[0.0, 1.0]`), each
    /// increment runs exactly `max_iter` Newton iterations. `tolerance` only
    /// controls the non-convergence warning.
    pub fn solve(&self, increments: &[f64], max_iter: usize, tolerance: f64) -> Result<Solution> {
        let config = NewtonConfig {
            increments: increments.to_vec(),
            max_iter,
            tolerance,
            ..NewtonConfig::default()
        };
        let solver = select_solver(&config.solver);
        self.solve_with(&config, solver.as_ref())
    }

    /// Solve with an explicit configuration and linear solver.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] for invalid breakpoints or `max_iter == 0`.
    /// - [`Error::Geometry`] for a non-positive Jacobian determinant.
    /// - Any error of the linear solver, unchanged.
    pub fn solve_with(&self, config: &NewtonConfig, solver: &dyn Solver) -> Result<Solution> {
        config.validate()?;

        let n_elements = self.mesh.n_elements();
        let n_dofs = self.n_dofs();
        let constrained = self.boundary.constraint_mask();
        let forces = self.boundary.force_vector();
        let displacements = self.boundary.displacement_vector();

        log::info!(
            "solving {} DOFs ({} constrained) with {}, {} increments x {} iterations",
            n_dofs,
            constrained.iter().filter(|&&c| c).count(),
            solver.name(),
            config.increments.len() - 1,
            config.max_iter
        );

        let mut strain = vec![Vector6::zeros(); n_elements];
        let mut stress = vec![Vector6::zeros(); n_elements];
        let mut u = vec![0.0; n_dofs];
        let mut f = vec![0.0; n_dofs];
        let mut residuals = Vec::with_capacity((config.increments.len() - 1) * config.max_iter);

        for (step, window) in config.increments.windows(2).enumerate() {
            let increment = step + 1;
            let load = window[1] - window[0];
            let f_ext: Vec<f64> = forces.iter().map(|v| load * v).collect();
            let mut du = vec![0.0; n_dofs];

            for iteration in 0..config.max_iter {
                for ((d, &c), target) in du.iter_mut().zip(&constrained).zip(&displacements) {
                    if c {
                        *d = load * target;
                    }
                }

                let integrals = self.integrate_step(&strain, &stress, &du)?;
                let k = self.assemble_stiffness(&integrals, &constrained)?;
                let f_int = self.assemble_force(&integrals);

                let residual = Self::residual(&f_int, &f_ext, &constrained);
                let res_norm = norm(&residual);
                log::info!(
                    "increment {}, iteration {}: residual norm {:e}",
                    increment,
                    iteration,
                    res_norm
                );
                residuals.push(ResidualRecord {
                    increment,
                    iteration,
                    norm: res_norm,
                });

                let correction = solver.solve(&k, &residual)?;
                for (d, c) in du.iter_mut().zip(&correction) {
                    *d -= c;
                }
            }

            let committed = self.integrate_step(&strain, &stress, &du)?;
            f = self.assemble_force(&committed);
            let final_norm = norm(&Self::residual(&f, &f_ext, &constrained));
            if final_norm > config.tolerance {
                log::warn!(
                    "increment {}: residual norm {:e} above tolerance {:e} after {} iterations",
                    increment,
                    final_norm,
                    config.tolerance,
                    config.max_iter
                );
            }

            strain = committed.strain;
            stress = committed.stress;
            for (ui, d) in u.iter_mut().zip(&du) {
                *ui += d;
            }
        }

        Ok(Solution {
            displacement: to_nodal(&u),
            force: to_nodal(&f),
            stress: stress.into_iter().map(StressTensor::from).collect(),
            strain: strain.into_iter().map(StrainTensor::from).collect(),
            residuals,
        })
    }
}
