//! Linear 4-node tetrahedron.
//!
//! `N = [1 - ξ - η - ζ, ξ, η, ζ]` on the unit tetrahedron. The gradient is
//! constant, so strain and stress are uniform over each element and the
//! centroid rule integrates the stiffness exactly. Locks volumetrically as
//! ν approaches 0.5.

use crate::element::gauss::{tet_centroid, GaussPoint};
use crate::element::ReferenceElement;
use crate::types::Point3;
use nalgebra::DMatrix;

/// Constant strain tetrahedron.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tet4;

impl ReferenceElement for Tet4 {
    const N_NODES: usize = 4;

    fn shape_functions(xi: &Point3) -> Vec<f64> {
        vec![1.0 - xi[0] - xi[1] - xi[2], xi[0], xi[1], xi[2]]
    }

    fn gradient(_xi: &Point3) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            4,
            &[
                -1.0, 1.0, 0.0, 0.0,
                -1.0, 0.0, 1.0, 0.0,
                -1.0, 0.0, 0.0, 1.0,
            ],
        )
    }

    fn quadrature() -> Vec<GaussPoint> {
        tet_centroid()
    }
}
