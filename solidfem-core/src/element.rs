//! Reference elements for 3D solids.
//!
//! An element family is described by its reference geometry only: node
//! count, shape functions, shape function gradients with respect to natural
//! coordinates, and a Gauss rule. Physical quantities (Jacobians, B-matrices)
//! are computed by the integration pass in [`crate::integration`].
//!
//! The family is resolved once from the mesh arity through [`ElementType`];
//! the reference gradients at the integration points are tabulated in a
//! [`QuadratureTable`] so that the hot integration loop never dispatches on
//! the element family.
//!
//! # Submodules
//!
//! - [`gauss`] - Gauss quadrature rules for numerical integration

use crate::error::{Error, Result};
use crate::types::Point3;
use nalgebra::DMatrix;

pub mod gauss;
pub mod hex20;
pub mod hex8;
pub mod tet10;
pub mod tet4;

pub use gauss::{gauss_1d, tensor_product, tet_centroid, tet_four_point, GaussPoint};
pub use hex20::Hex20;
pub use hex8::Hex8;
pub use tet10::Tet10;
pub use tet4::Tet4;

/// Reference element interface.
///
/// Natural coordinates are `(ξ, η, ζ)`: the unit tetrahedron
/// `ξ, η, ζ ≥ 0, ξ + η + ζ ≤ 1` for tetrahedra and `[-1, 1]³` for hexahedra.
pub trait ReferenceElement {
    /// Number of nodes.
    const N_NODES: usize;

    /// Shape function values `[N_0, ..., N_{n-1}]` at `xi`.
    fn shape_functions(xi: &Point3) -> Vec<f64>;

    /// Gradient operator: 3×n matrix with entry `(k, i) = ∂N_i/∂ξ_k`.
    fn gradient(xi: &Point3) -> DMatrix<f64>;

    /// Integration rule in natural coordinates.
    fn quadrature() -> Vec<GaussPoint>;
}

/// Supported solid element families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 4-node tetrahedron (linear).
    Tet4,
    /// 8-node hexahedron (linear).
    Hex8,
    /// 10-node tetrahedron (quadratic).
    Tet10,
    /// 20-node hexahedron (quadratic serendipity).
    Hex20,
}

impl ElementType {
    /// Select the element family from the number of nodes per element.
    pub fn from_arity(n_nodes: usize) -> Result<Self> {
        match n_nodes {
            4 => Ok(ElementType::Tet4),
            8 => Ok(ElementType::Hex8),
            10 => Ok(ElementType::Tet10),
            20 => Ok(ElementType::Hex20),
            n => Err(Error::Configuration(format!(
                "no solid element family with {} nodes (expected 4, 8, 10 or 20)",
                n
            ))),
        }
    }

    /// Number of nodes for this element type.
    pub fn n_nodes(self) -> usize {
        match self {
            ElementType::Tet4 => Tet4::N_NODES,
            ElementType::Hex8 => Hex8::N_NODES,
            ElementType::Tet10 => Tet10::N_NODES,
            ElementType::Hex20 => Hex20::N_NODES,
        }
    }

    /// Degrees of freedom per element (3 per node).
    pub fn n_dofs(self) -> usize {
        3 * self.n_nodes()
    }

    /// Shape function values at `xi`.
    pub fn shape_functions(self, xi: &Point3) -> Vec<f64> {
        match self {
            ElementType::Tet4 => Tet4::shape_functions(xi),
            ElementType::Hex8 => Hex8::shape_functions(xi),
            ElementType::Tet10 => Tet10::shape_functions(xi),
            ElementType::Hex20 => Hex20::shape_functions(xi),
        }
    }

    /// Shape function gradients with respect to natural coordinates (3×n).
    pub fn gradient(self, xi: &Point3) -> DMatrix<f64> {
        match self {
            ElementType::Tet4 => Tet4::gradient(xi),
            ElementType::Hex8 => Hex8::gradient(xi),
            ElementType::Tet10 => Tet10::gradient(xi),
            ElementType::Hex20 => Hex20::gradient(xi),
        }
    }

    fn quadrature(self) -> Vec<GaussPoint> {
        match self {
            ElementType::Tet4 => Tet4::quadrature(),
            ElementType::Hex8 => Hex8::quadrature(),
            ElementType::Tet10 => Tet10::quadrature(),
            ElementType::Hex20 => Hex20::quadrature(),
        }
    }

    /// Integration points in natural coordinates.
    pub fn integration_points(self) -> Vec<Point3> {
        self.quadrature().iter().map(GaussPoint::natural).collect()
    }

    /// Integration weights matching [`Self::integration_points`].
    pub fn integration_weights(self) -> Vec<f64> {
        self.quadrature().iter().map(|gp| gp.weight).collect()
    }

    /// Tabulate reference gradients at every integration point.
    pub fn quadrature_table(self) -> QuadratureTable {
        let points = self.integration_points();
        let gradients = points.iter().map(|q| self.gradient(q)).collect();
        QuadratureTable {
            element_type: self,
            weights: self.integration_weights(),
            points,
            gradients,
        }
    }
}

/// Reference data of one element family at its integration points.
#[derive(Debug, Clone)]
pub struct QuadratureTable {
    pub element_type: ElementType,
    pub points: Vec<Point3>,
    pub weights: Vec<f64>,
    /// One 3×n gradient operator per integration point.
    pub gradients: Vec<DMatrix<f64>>,
}

impl QuadratureTable {
    /// Number of integration points.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
