//! 10-node tetrahedron (Tet10) reference element.
//!
//! The Tet10 is a quadratic 3D solid element with:
//! - 4 nodes at vertices
//! - 6 nodes at edge midpoints
//! - Quadratic shape functions
//! - 4-point Gauss integration
//!
//! # Shape Functions
//!
//! Quadratic shape functions in terms of barycentric coordinates (L1, L2, L3, L4):
//! - Corner nodes (1-4): N_i = L_i * (2*L_i - 1)
//! - Midside nodes (5-10): N_ij = 4 * L_i * L_j
//!
//! where L1 = 1 - ξ - η - ζ, L2 = ξ, L3 = η, L4 = ζ.
//!
//! # Node Numbering
//!
//! ```text
//! Vertices:
//!   Node 1: (1, 0, 0, 0) - vertex at parametric origin
//!   Node 2: (0, 1, 0, 0)
//!   Node 3: (0, 0, 1, 0)
//!   Node 4: (0, 0, 0, 1)
//!
//! Edge midpoints:
//!   Node 5: midpoint of edge 1-2
//!   Node 6: midpoint of edge 2-3
//!   Node 7: midpoint of edge 1-3
//!   Node 8: midpoint of edge 1-4
//!   Node 9: midpoint of edge 2-4
//!   Node 10: midpoint of edge 3-4
//! ```

use crate::element::gauss::{tet_four_point, GaussPoint};
use crate::element::ReferenceElement;
use crate::types::Point3;
use nalgebra::DMatrix;

/// Vertex pairs (0-based) spanned by the midside nodes 4..10.
const EDGES: [(usize, usize); 6] = [(0, 1), (1, 2), (0, 2), (0, 3), (1, 3), (2, 3)];

/// 10-node tetrahedral element (quadratic tetrahedron).
#[derive(Debug, Clone, Copy, Default)]
pub struct Tet10;

impl Tet10 {
    fn barycentric(xi: &Point3) -> [f64; 4] {
        [1.0 - xi[0] - xi[1] - xi[2], xi[0], xi[1], xi[2]]
    }

    /// Derivatives dN/dL_k, organized as `[k][node]`.
    fn shape_derivatives_barycentric(l: &[f64; 4]) -> [[f64; 10]; 4] {
        let mut dn_dl = [[0.0; 10]; 4];
        for k in 0..4 {
            // dN_corner/dL_k = 4*L_k - 1
            dn_dl[k][k] = 4.0 * l[k] - 1.0;
        }
        for (m, &(a, b)) in EDGES.iter().enumerate() {
            // dN_ab/dL_a = 4*L_b, dN_ab/dL_b = 4*L_a
            dn_dl[a][4 + m] = 4.0 * l[b];
            dn_dl[b][4 + m] = 4.0 * l[a];
        }
        dn_dl
    }
}

impl ReferenceElement for Tet10 {
    const N_NODES: usize = 10;

    fn shape_functions(xi: &Point3) -> Vec<f64> {
        let l = Self::barycentric(xi);
        let mut n = Vec::with_capacity(10);
        n.extend(l.iter().map(|&li| li * (2.0 * li - 1.0)));
        n.extend(EDGES.iter().map(|&(a, b)| 4.0 * l[a] * l[b]));
        n
    }

    fn gradient(xi: &Point3) -> DMatrix<f64> {
        let l = Self::barycentric(xi);
        let dn_dl = Self::shape_derivatives_barycentric(&l);

        // Since L1 = 1 - ξ - η - ζ:
        // dN/dξ = dN/dL2 - dN/dL1, dN/dη = dN/dL3 - dN/dL1, dN/dζ = dN/dL4 - dN/dL1
        DMatrix::from_fn(3, 10, |k, i| dn_dl[k + 1][i] - dn_dl[0][i])
    }

    fn quadrature() -> Vec<GaussPoint> {
        tet_four_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn node_coords() -> Vec<Point3> {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mut nodes = corners.to_vec();
        nodes.extend(EDGES.iter().map(|&(a, b)| (corners[a] + corners[b]) / 2.0));
        nodes
    }

    #[test]
    fn test_tet10_kronecker_property() {
        for (i, p) in node_coords().iter().enumerate() {
            let n = Tet10::shape_functions(p);
            for (j, &nj) in n.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(nj, expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_tet10_midside_at_centroid() {
        let n = Tet10::shape_functions(&Point3::repeat(0.25));
        // Corner: 0.25 * (0.5 - 1) = -0.125, midside: 4 * 0.0625 = 0.25
        for &corner in &n[..4] {
            assert_relative_eq!(corner, -0.125, epsilon = 1e-15);
        }
        for &mid in &n[4..] {
            assert_relative_eq!(mid, 0.25, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_tet10_reproduces_linear_field() {
        // Σ N_i x_i = ξ for the straight-sided reference element
        let nodes = node_coords();
        let grad = Tet10::gradient(&Point3::new(0.2, 0.1, 0.3));
        for k in 0..3 {
            let d: f64 = (0..10).map(|i| grad[(k, i)] * nodes[i][k]).sum();
            assert_relative_eq!(d, 1.0, epsilon = 1e-14);
        }
    }
}
