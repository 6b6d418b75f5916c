//! solidfem core - small-strain solid finite element engine
//!
//! Finite element library for 3D solid mechanics with:
//! - Linear and quadratic tetrahedra and hexahedra
//! - Isotropic and orthotropic elastic laws, vectorized over elements
//! - Batched, rayon-parallel element integration
//! - Sparse assembly (CSR format) with Dirichlet elimination
//! - Incremental Newton-Raphson load stepping with direct sparse solvers
//!
//! # Architecture
//!
//! The engine is built around these core abstractions:
//!
//! - [`Stiffness`] trait: Material laws providing a Voigt stiffness
//! - [`ElementType`]: Element family resolved once from the mesh arity
//! - [`Mesh`]: Connectivity and nodal coordinates
//! - [`Solid`]: Boundary data, assembly and the Newton-Raphson solve
//! - [`Solver`] trait: Linear system solution strategies
//!
//! # Example
//!
//! ```ignore
//! use solidfem_core::{Isotropic, Point3, Solid};
//!
//! let nodes = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let mut solid = Solid::new(nodes, &[[0usize, 1, 2, 3]], &Isotropic::steel())?;
//! for node in 0..3 {
//!     solid.boundary_mut().fix_node(node)?;
//! }
//! solid.boundary_mut().set_force(3, 0, 1000.0)?;
//!
//! let solution = solid.solve(&[0.0, 1.0], 3, 1e-10)?;
//! println!("tip displacement: {}", solution.displacement[3]);
//! ```

pub mod boundary;
pub mod dof;
pub mod element;
pub mod error;
pub mod integration;
pub mod material;
pub mod mesh;
pub mod solid;
pub mod solver;
pub mod sparse;
pub mod stress;
pub mod types;

pub use boundary::BoundaryConditions;
pub use element::{ElementType, QuadratureTable};
pub use error::{Error, Result};
pub use integration::ElementIntegrals;
pub use material::{
    Isotropic, IsotropicPlaneStrain, IsotropicPlaneStress, Orthotropic, OrthotropicPlaneStress,
    SolidLaw, Stiffness, VectorizedMaterial,
};
pub use mesh::Mesh;
pub use solid::{NewtonConfig, Solid, Solution};
pub use solver::{Solver, SolverConfig, SolverType};
pub use sparse::CsrMatrix;
pub use types::{Point3, StrainTensor, StressTensor, Vec3};
