//! Trilinear 8-node brick.
//!
//! `N_i = (1 + ξ_i ξ)(1 + η_i η)(1 + ζ_i ζ) / 8` on the cube [-1, 1]³, where
//! `(ξ_i, η_i, ζ_i)` is the corner of node `i`. Corners run counterclockwise
//! around the bottom face (ζ = -1), then the top face:
//!
//! ```text
//!        7-------6
//!       /|      /|
//!      4-------5 |
//!      | 3-----|-2
//!      |/      |/
//!      0-------1
//! ```
//!
//! Integrated with the 2×2×2 Gauss-Legendre rule.

use crate::element::gauss::{tensor_product, GaussPoint, GAUSS_LEGENDRE_2};
use crate::element::ReferenceElement;
use crate::types::Point3;
use nalgebra::DMatrix;

/// Reference corner of every node.
pub(crate) const CORNERS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Hex8;

impl ReferenceElement for Hex8 {
    const N_NODES: usize = 8;

    fn shape_functions(xi: &Point3) -> Vec<f64> {
        CORNERS
            .iter()
            .map(|c| (0..3).map(|k| 1.0 + c[k] * xi[k]).product::<f64>() / 8.0)
            .collect()
    }

    fn gradient(xi: &Point3) -> DMatrix<f64> {
        let mut grad = DMatrix::zeros(3, 8);
        for (i, c) in CORNERS.iter().enumerate() {
            let f = [1.0 + c[0] * xi[0], 1.0 + c[1] * xi[1], 1.0 + c[2] * xi[2]];
            grad[(0, i)] = c[0] * f[1] * f[2] / 8.0;
            grad[(1, i)] = f[0] * c[1] * f[2] / 8.0;
            grad[(2, i)] = f[0] * f[1] * c[2] / 8.0;
        }
        grad
    }

    fn quadrature() -> Vec<GaussPoint> {
        tensor_product(&GAUSS_LEGENDRE_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kronecker_property() {
        for (i, c) in CORNERS.iter().enumerate() {
            let n = Hex8::shape_functions(&Point3::from(*c));
            for (j, &nj) in n.iter().enumerate() {
                assert_relative_eq!(nj, if i == j { 1.0 } else { 0.0 }, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_centroid_values() {
        for ni in Hex8::shape_functions(&Point3::zeros()) {
            assert_relative_eq!(ni, 0.125, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_gradient_reproduces_coordinates() {
        // Σ_i x_i ∇N_i = I on the reference cube
        let grad = Hex8::gradient(&Point3::new(0.3, -0.2, 0.7));
        for d in 0..3 {
            for k in 0..3 {
                let sum: f64 = (0..8).map(|i| grad[(d, i)] * CORNERS[i][k]).sum();
                assert_relative_eq!(sum, if d == k { 1.0 } else { 0.0 }, epsilon = 1e-14);
            }
        }
    }
}
