//! Core data types for solid mechanics.
//!
//! Geometric aliases, Voigt stress/strain wrappers and constitutive matrix
//! aliases. All Voigt quantities use the component order
//! `[xx, yy, zz, yz, xz, xy]`; strains carry engineering shear (γ = 2ε).

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};

/// A point in 3D space.
pub type Point3 = Vector3<f64>;

/// A 3D vector (displacement, force, etc.).
pub type Vec3 = Vector3<f64>;

/// Number of Voigt components of a 3D symmetric tensor.
pub const VOIGT_3D: usize = 6;

/// Off-diagonal Voigt slots: `(voigt index, row, col)`.
const SHEAR_SLOTS: [(usize, usize, usize); 3] = [(3, 1, 2), (4, 0, 2), (5, 0, 1)];

/// Expand Voigt components into a symmetric matrix, scaling shear slots.
fn voigt_to_matrix(v: &Vector6<f64>, shear_scale: f64) -> Matrix3<f64> {
    let mut m = Matrix3::from_diagonal(&Vector3::new(v[0], v[1], v[2]));
    for (k, i, j) in SHEAR_SLOTS {
        m[(i, j)] = shear_scale * v[k];
        m[(j, i)] = shear_scale * v[k];
    }
    m
}

/// Symmetric stress tensor in Voigt notation `[σ_xx, σ_yy, σ_zz, τ_yz, τ_xz, τ_xy]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressTensor(pub Vector6<f64>);

impl StressTensor {
    pub fn new(components: [f64; 6]) -> Self {
        Self(Vector6::from(components))
    }

    pub fn zero() -> Self {
        Self(Vector6::zeros())
    }

    /// Full 3×3 stress matrix.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        voigt_to_matrix(&self.0, 1.0)
    }

    /// Mean normal stress.
    pub fn hydrostatic(&self) -> f64 {
        self.to_matrix().trace() / 3.0
    }

    /// Deviatoric part `s = σ - p·I`.
    pub fn deviator(&self) -> Matrix3<f64> {
        self.to_matrix() - Matrix3::identity() * self.hydrostatic()
    }

    /// Von Mises equivalent stress `√(3/2 · s:s)`.
    pub fn von_mises(&self) -> f64 {
        let s = self.deviator();
        (1.5 * s.component_mul(&s).sum()).sqrt()
    }

    /// Principal stresses, largest first.
    pub fn principal(&self) -> [f64; 3] {
        let mut values: Vec<f64> = self.to_matrix().symmetric_eigenvalues().iter().copied().collect();
        values.sort_by(|a, b| b.total_cmp(a));
        [values[0], values[1], values[2]]
    }
}

impl From<Vector6<f64>> for StressTensor {
    fn from(v: Vector6<f64>) -> Self {
        Self(v)
    }
}

/// Symmetric strain tensor in Voigt notation `[ε_xx, ε_yy, ε_zz, γ_yz, γ_xz, γ_xy]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainTensor(pub Vector6<f64>);

impl StrainTensor {
    pub fn new(components: [f64; 6]) -> Self {
        Self(Vector6::from(components))
    }

    pub fn zero() -> Self {
        Self(Vector6::zeros())
    }

    /// Relative volume change `ε_xx + ε_yy + ε_zz`.
    pub fn volumetric(&self) -> f64 {
        self.0.fixed_rows::<3>(0).sum()
    }

    /// Full 3×3 strain matrix (tensor shear, γ/2 off the diagonal).
    pub fn to_matrix(&self) -> Matrix3<f64> {
        voigt_to_matrix(&self.0, 0.5)
    }
}

impl From<Vector6<f64>> for StrainTensor {
    fn from(v: Vector6<f64>) -> Self {
        Self(v)
    }
}

/// 3D Voigt stiffness, `σ = C·ε`.
pub type ConstitutiveMatrix = Matrix6<f64>;

/// Plane (2D) Voigt stiffness for `[xx, yy, xy]`.
pub type PlaneConstitutiveMatrix = Matrix3<f64>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_von_mises_uniaxial() {
        let stress = StressTensor::new([100.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(stress.von_mises(), 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_von_mises_pure_shear() {
        // von Mises = √3 * τ
        let stress = StressTensor::new([0.0, 0.0, 0.0, 0.0, 0.0, 100.0]);
        assert_relative_eq!(stress.von_mises(), 100.0 * 3.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_hydrostatic_has_no_von_mises() {
        let stress = StressTensor::new([-50.0, -50.0, -50.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(stress.hydrostatic(), -50.0, epsilon = 1e-12);
        assert_relative_eq!(stress.von_mises(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(stress.deviator().norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stress_matrix_layout() {
        let stress = StressTensor::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let m = stress.to_matrix();
        assert_eq!(m[(1, 2)], 4.0);
        assert_eq!(m[(0, 2)], 5.0);
        assert_eq!(m[(0, 1)], 6.0);
        assert_eq!(m, m.transpose());
    }

    #[test]
    fn test_principal_stresses() {
        // Pure shear τ_xy = 10 has principal values 10, 0, -10
        let stress = StressTensor::new([0.0, 0.0, 0.0, 0.0, 0.0, 10.0]);
        let p = stress.principal();
        assert_relative_eq!(p[0], 10.0, epsilon = 1e-10);
        assert_relative_eq!(p[1], 0.0, epsilon = 1e-10);
        assert_relative_eq!(p[2], -10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_strain_matrix_halves_shear() {
        let strain = StrainTensor::new([0.001, 0.002, 0.003, 0.0, 0.0, 0.002]);
        assert_relative_eq!(strain.volumetric(), 0.006, epsilon = 1e-15);
        assert_relative_eq!(strain.to_matrix()[(0, 1)], 0.001, epsilon = 1e-15);
        assert_relative_eq!(strain.to_matrix()[(1, 0)], 0.001, epsilon = 1e-15);
    }
}
