//! Gauss quadrature rules for numerical integration.
//!
//! Hexahedral rules are tensor products of the 1D Gauss-Legendre rules
//! below; tetrahedral rules are the symmetric 1- and 4-point rules on the
//! unit tetrahedron. Every rule is a fixed table, so an element family picks
//! its rule by name and cannot ask for an order that does not exist.
//!
//! ```
//! use solidfem_core::element::gauss::{tensor_product, tet_four_point, GAUSS_LEGENDRE_2};
//!
//! let hex = tensor_product(&GAUSS_LEGENDRE_2);
//! assert_eq!(hex.len(), 8);
//!
//! let volume: f64 = tet_four_point().iter().map(|gp| gp.weight).sum();
//! assert!((volume - 1.0 / 6.0).abs() < 1e-14);
//! ```

use crate::types::Point3;

/// 1-point Gauss-Legendre rule on [-1, 1], as (point, weight) pairs.
pub const GAUSS_LEGENDRE_1: [(f64, f64); 1] = [(0.0, 2.0)];

/// 2-point rule, points ±1/√3. Exact up to degree 3.
pub const GAUSS_LEGENDRE_2: [(f64, f64); 2] = [
    (-0.577_350_269_189_625_8, 1.0),
    (0.577_350_269_189_625_8, 1.0),
];

/// 3-point rule, points 0 and ±√(3/5). Exact up to degree 5.
pub const GAUSS_LEGENDRE_3: [(f64, f64); 3] = [
    (-0.774_596_669_241_483_4, 5.0 / 9.0),
    (0.0, 8.0 / 9.0),
    (0.774_596_669_241_483_4, 5.0 / 9.0),
];

/// 4-point rule. Exact up to degree 7.
pub const GAUSS_LEGENDRE_4: [(f64, f64); 4] = [
    (-0.861_136_311_594_052_6, 0.347_854_845_137_453_9),
    (-0.339_981_043_584_856_3, 0.652_145_154_862_546_1),
    (0.339_981_043_584_856_3, 0.652_145_154_862_546_1),
    (0.861_136_311_594_052_6, 0.347_854_845_137_453_9),
];

/// Look up the 1D rule with `n` points.
pub fn gauss_1d(n: usize) -> Option<&'static [(f64, f64)]> {
    match n {
        1 => Some(&GAUSS_LEGENDRE_1),
        2 => Some(&GAUSS_LEGENDRE_2),
        3 => Some(&GAUSS_LEGENDRE_3),
        4 => Some(&GAUSS_LEGENDRE_4),
        _ => None,
    }
}

/// A Gauss quadrature point with natural coordinates and weight.
#[derive(Debug, Clone, Copy)]
pub struct GaussPoint {
    /// Natural coordinates (ξ, η, ζ).
    pub coords: Point3,
    /// Integration weight.
    pub weight: f64,
}

impl GaussPoint {
    pub fn new(coords: Point3, weight: f64) -> Self {
        Self { coords, weight }
    }

    /// Create a tetrahedral point from barycentric coordinates (L1, L2, L3, L4).
    ///
    /// L1 belongs to the vertex at the parametric origin, so (ξ, η, ζ) = (L2, L3, L4).
    pub fn from_barycentric(l: [f64; 4], weight: f64) -> Self {
        Self::new(Point3::new(l[1], l[2], l[3]), weight)
    }

    /// Natural coordinates of the point.
    #[inline]
    pub fn natural(&self) -> Point3 {
        self.coords
    }
}

/// Hexahedral rule on [-1, 1]³ built from a 1D rule.
///
/// Points are ordered with ξ varying fastest and ζ slowest.
pub fn tensor_product(rule: &[(f64, f64)]) -> Vec<GaussPoint> {
    rule.iter()
        .flat_map(|&(zeta, w_zeta)| {
            rule.iter().flat_map(move |&(eta, w_eta)| {
                rule.iter().map(move |&(xi, w_xi)| {
                    GaussPoint::new(Point3::new(xi, eta, zeta), w_xi * w_eta * w_zeta)
                })
            })
        })
        .collect()
}

/// Centroid rule on the unit tetrahedron. Exact for linear integrands.
pub fn tet_centroid() -> Vec<GaussPoint> {
    vec![GaussPoint::from_barycentric([0.25; 4], 1.0 / 6.0)]
}

/// Symmetric 4-point rule on the unit tetrahedron. Exact for quadratic integrands.
///
/// Each point has barycentric coordinates (α, β, β, β) up to permutation with
/// α = (5 + 3√5)/20 and β = (5 − √5)/20.
pub fn tet_four_point() -> Vec<GaussPoint> {
    let sqrt5 = 5.0_f64.sqrt();
    let alpha = (5.0 + 3.0 * sqrt5) / 20.0;
    let beta = (5.0 - sqrt5) / 20.0;
    (0..4)
        .map(|k| {
            let mut l = [beta; 4];
            l[k] = alpha;
            GaussPoint::from_barycentric(l, 1.0 / 24.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_rules_integrate_monomials() {
        // An n-point rule integrates x^k exactly for k <= 2n - 1
        for n in 1..=4 {
            let rule = gauss_1d(n).unwrap();
            assert_eq!(rule.len(), n);
            for k in 0..2 * n as i32 {
                let integral: f64 = rule.iter().map(|&(x, w)| w * x.powi(k)).sum();
                let exact = if k % 2 == 1 { 0.0 } else { 2.0 / (k as f64 + 1.0) };
                assert_relative_eq!(integral, exact, epsilon = 1e-14);
            }
        }
        assert!(gauss_1d(5).is_none());
        assert!(gauss_1d(0).is_none());
    }

    #[test]
    fn test_tet_rules() {
        for rule in [tet_centroid(), tet_four_point()] {
            let sum: f64 = rule.iter().map(|gp| gp.weight).sum();
            assert_relative_eq!(sum, 1.0 / 6.0, epsilon = 1e-14);
            for gp in &rule {
                let p = gp.natural();
                assert!(p.iter().all(|&c| c > 0.0));
                assert!(p.sum() < 1.0);
            }
        }

        // ∫ ξ² dV and ∫ ξη dV over the unit tetrahedron are 1/60 and 1/120
        let rule = tet_four_point();
        let xx: f64 = rule.iter().map(|gp| gp.weight * gp.coords[0].powi(2)).sum();
        let xy: f64 = rule.iter().map(|gp| gp.weight * gp.coords[0] * gp.coords[1]).sum();
        assert_relative_eq!(xx, 1.0 / 60.0, epsilon = 1e-14);
        assert_relative_eq!(xy, 1.0 / 120.0, epsilon = 1e-14);
    }

    #[test]
    fn test_tensor_product_layout() {
        let rule = tensor_product(&GAUSS_LEGENDRE_2);
        assert_eq!(rule.len(), 8);
        assert_relative_eq!(rule[1].coords[0], -rule[0].coords[0]);
        assert_eq!(rule[1].coords[2], rule[0].coords[2]);
        assert!(rule[4].coords[2] > 0.0);

        for n in 1..=3 {
            let rule = tensor_product(gauss_1d(n).unwrap());
            assert_eq!(rule.len(), n * n * n);
            let sum: f64 = rule.iter().map(|gp| gp.weight).sum();
            assert_relative_eq!(sum, 8.0, epsilon = 1e-13);
        }
    }
}
