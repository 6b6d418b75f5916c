//! 20-node hexahedron (Hex20) reference element.
//!
//! The Hex20 is a quadratic serendipity brick with:
//! - 8 corner nodes (same ordering as Hex8)
//! - 12 mid-edge nodes
//! - 3×3×3 Gauss integration (27 points)
//!
//! # Node Numbering
//!
//! Corner nodes 0-7 follow Hex8. Mid-edge nodes follow the VTK quadratic
//! hexahedron convention:
//! ```text
//! 8-11:  bottom face edges 0-1, 1-2, 2-3, 3-0   (ζ = -1)
//! 12-15: top face edges    4-5, 5-6, 6-7, 7-4   (ζ = +1)
//! 16-19: vertical edges    0-4, 1-5, 2-6, 3-7   (ζ =  0)
//! ```

use crate::element::gauss::{tensor_product, GaussPoint, GAUSS_LEGENDRE_3};
use crate::element::ReferenceElement;
use crate::types::Point3;
use nalgebra::DMatrix;

/// Natural coordinates (ξ, η, ζ) for each of the 20 nodes.
const NODE_COORDS: [[f64; 3]; 20] = [
    // Corner nodes
    [-1.0, -1.0, -1.0], // 0
    [1.0, -1.0, -1.0],  // 1
    [1.0, 1.0, -1.0],   // 2
    [-1.0, 1.0, -1.0],  // 3
    [-1.0, -1.0, 1.0],  // 4
    [1.0, -1.0, 1.0],   // 5
    [1.0, 1.0, 1.0],    // 6
    [-1.0, 1.0, 1.0],   // 7
    // Bottom face edges
    [0.0, -1.0, -1.0], // 8  (edge 0-1)
    [1.0, 0.0, -1.0],  // 9  (edge 1-2)
    [0.0, 1.0, -1.0],  // 10 (edge 2-3)
    [-1.0, 0.0, -1.0], // 11 (edge 3-0)
    // Top face edges
    [0.0, -1.0, 1.0], // 12 (edge 4-5)
    [1.0, 0.0, 1.0],  // 13 (edge 5-6)
    [0.0, 1.0, 1.0],  // 14 (edge 6-7)
    [-1.0, 0.0, 1.0], // 15 (edge 7-4)
    // Vertical edges
    [-1.0, -1.0, 0.0], // 16 (edge 0-4)
    [1.0, -1.0, 0.0],  // 17 (edge 1-5)
    [1.0, 1.0, 0.0],   // 18 (edge 2-6)
    [-1.0, 1.0, 0.0],  // 19 (edge 3-7)
];

/// Kind of node, identified by which natural coordinate vanishes.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NodeType {
    Corner,
    /// Mid-edge node whose coordinate along `axis` is zero.
    MidEdge { axis: usize },
}

impl NodeType {
    fn of(node: usize) -> Self {
        match NODE_COORDS[node].iter().position(|&c| c == 0.0) {
            None => NodeType::Corner,
            Some(axis) => NodeType::MidEdge { axis },
        }
    }
}

/// 20-node hexahedral element (serendipity quadratic brick).
#[derive(Debug, Clone, Copy, Default)]
pub struct Hex20;

impl ReferenceElement for Hex20 {
    const N_NODES: usize = 20;

    fn shape_functions(xi: &Point3) -> Vec<f64> {
        (0..20)
            .map(|i| {
                let c = NODE_COORDS[i];
                // a_k = 1 + ξ_ik * ξ_k
                let a = [1.0 + c[0] * xi[0], 1.0 + c[1] * xi[1], 1.0 + c[2] * xi[2]];
                match NodeType::of(i) {
                    NodeType::Corner => {
                        // N_i = (1/8) a_0 a_1 a_2 (ξ_i*ξ + η_i*η + ζ_i*ζ - 2)
                        let s = c[0] * xi[0] + c[1] * xi[1] + c[2] * xi[2] - 2.0;
                        0.125 * a[0] * a[1] * a[2] * s
                    }
                    NodeType::MidEdge { axis } => {
                        // N_i = (1/4)(1 - ξ_axis²) Π_{k≠axis} a_k
                        let mut n = 0.25 * (1.0 - xi[axis] * xi[axis]);
                        for k in (0..3).filter(|&k| k != axis) {
                            n *= a[k];
                        }
                        n
                    }
                }
            })
            .collect()
    }

    fn gradient(xi: &Point3) -> DMatrix<f64> {
        let mut grad = DMatrix::zeros(3, 20);

        for i in 0..20 {
            let c = NODE_COORDS[i];
            let a = [1.0 + c[0] * xi[0], 1.0 + c[1] * xi[1], 1.0 + c[2] * xi[2]];

            match NodeType::of(i) {
                NodeType::Corner => {
                    // dN/dξ_k = (1/8) c_k Π_{m≠k} a_m (c·ξ + c_k ξ_k - 1)
                    let dot = c[0] * xi[0] + c[1] * xi[1] + c[2] * xi[2];
                    for k in 0..3 {
                        let others: f64 = (0..3).filter(|&m| m != k).map(|m| a[m]).product();
                        grad[(k, i)] = 0.125 * c[k] * others * (dot + c[k] * xi[k] - 1.0);
                    }
                }
                NodeType::MidEdge { axis } => {
                    let bubble = 1.0 - xi[axis] * xi[axis];
                    for k in 0..3 {
                        grad[(k, i)] = if k == axis {
                            let others: f64 =
                                (0..3).filter(|&m| m != axis).map(|m| a[m]).product();
                            -0.5 * xi[axis] * others
                        } else {
                            let other = (0..3).find(|&m| m != axis && m != k).unwrap_or(k);
                            0.25 * bubble * c[k] * a[other]
                        };
                    }
                }
            }
        }

        grad
    }

    fn quadrature() -> Vec<GaussPoint> {
        tensor_product(&GAUSS_LEGENDRE_3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hex20_kronecker_property() {
        for i in 0..20 {
            let p = Point3::from(NODE_COORDS[i]);
            let n = Hex20::shape_functions(&p);
            for (j, &nj) in n.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(nj, expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_hex20_node_classification() {
        assert_eq!(NodeType::of(0), NodeType::Corner);
        assert_eq!(NodeType::of(8), NodeType::MidEdge { axis: 0 });
        assert_eq!(NodeType::of(9), NodeType::MidEdge { axis: 1 });
        assert_eq!(NodeType::of(16), NodeType::MidEdge { axis: 2 });
    }

    #[test]
    fn test_hex20_reproduces_coordinates() {
        let grad = Hex20::gradient(&Point3::new(0.4, -0.3, 0.1));
        for k in 0..3 {
            for m in 0..3 {
                let d: f64 = (0..20).map(|i| grad[(k, i)] * NODE_COORDS[i][m]).sum();
                let expected = if k == m { 1.0 } else { 0.0 };
                assert_relative_eq!(d, expected, epsilon = 1e-13);
            }
        }
    }
}
