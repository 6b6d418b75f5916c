//! Linear elastic material laws.
//!
//! Every law exposes its Voigt stiffness through the [`Stiffness`] capability:
//! a 6×6 matrix for 3D laws, a 3×3 matrix for plane laws, plus a 2×2
//! transverse-shear matrix for shell use. Constructors take physical
//! constants as given; the caller is responsible for E > 0 and Poisson ratios
//! that keep the stiffness invertible.
//!
//! Voigt order is `[xx, yy, zz, yz, xz, xy]` in 3D and `[xx, yy, xy]` in 2D.
//!
//! For assembly the law is expanded into a [`VectorizedMaterial`] holding one
//! tangent per element, so that shared and heterogeneous assignments run
//! through the same batched [`VectorizedMaterial::step`].

use crate::error::{Error, Result};
use crate::types::{ConstitutiveMatrix, PlaneConstitutiveMatrix, VOIGT_3D};
use nalgebra::{DMatrix, Matrix2, Matrix3, Matrix6, Vector6};

/// Stiffness capability shared by all material laws.
pub trait Stiffness {
    /// Voigt stiffness matrix (6×6 in 3D, 3×3 for plane laws).
    fn c(&self) -> DMatrix<f64>;

    /// Transverse shear stiffness for shells.
    fn cs(&self) -> Matrix2<f64>;
}

fn dense<const N: usize>(m: &nalgebra::SMatrix<f64, N, N>) -> DMatrix<f64> {
    DMatrix::from_column_slice(N, N, m.as_slice())
}

/// Isotropic linear elastic material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isotropic {
    e: f64,
    nu: f64,
}

impl Isotropic {
    /// Create an isotropic law from Young's modulus and Poisson's ratio.
    pub fn new(e: f64, nu: f64) -> Self {
        Self { e, nu }
    }

    /// Young's modulus.
    pub fn e(&self) -> f64 {
        self.e
    }

    /// Poisson's ratio.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Lamé's first parameter λ = Eν / ((1+ν)(1-2ν)).
    pub fn lame_lambda(&self) -> f64 {
        self.e * self.nu / ((1.0 + self.nu) * (1.0 - 2.0 * self.nu))
    }

    /// Shear modulus G = E / (2(1 + ν)).
    pub fn shear_modulus(&self) -> f64 {
        self.e / (2.0 * (1.0 + self.nu))
    }

    /// Bulk modulus K = E / (3(1 - 2ν)).
    pub fn bulk_modulus(&self) -> f64 {
        self.e / (3.0 * (1.0 - 2.0 * self.nu))
    }

    /// 3D constitutive matrix.
    pub fn constitutive_3d(&self) -> ConstitutiveMatrix {
        let lbd = self.lame_lambda();
        let g = self.shear_modulus();
        let c11 = lbd + 2.0 * g;

        Matrix6::new(
            c11, lbd, lbd, 0.0, 0.0, 0.0,
            lbd, c11, lbd, 0.0, 0.0, 0.0,
            lbd, lbd, c11, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, g,   0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, g,   0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, g,
        )
    }

    /// Structural steel (E = 200 GPa, ν = 0.3).
    pub fn steel() -> Self {
        Self::new(200e9, 0.3)
    }

    /// Aluminum 6061-T6 (E = 68.9 GPa, ν = 0.33).
    pub fn aluminum() -> Self {
        Self::new(68.9e9, 0.33)
    }
}

impl Stiffness for Isotropic {
    fn c(&self) -> DMatrix<f64> {
        dense(&self.constitutive_3d())
    }

    fn cs(&self) -> Matrix2<f64> {
        Matrix2::from_diagonal_element(self.shear_modulus())
    }
}

/// Isotropic plane stress law (thin plates, σ_zz = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotropicPlaneStress(Isotropic);

impl IsotropicPlaneStress {
    pub fn new(e: f64, nu: f64) -> Self {
        Self(Isotropic::new(e, nu))
    }

    /// Underlying isotropic constants.
    pub fn isotropic(&self) -> &Isotropic {
        &self.0
    }

    /// Scaling factor E / (1 - ν²).
    pub fn factor(&self) -> f64 {
        self.0.e / (1.0 - self.0.nu * self.0.nu)
    }

    /// Returns the 3x3 matrix for [σ_xx, σ_yy, τ_xy] = C * [ε_xx, ε_yy, γ_xy].
    pub fn constitutive(&self) -> PlaneConstitutiveMatrix {
        let nu = self.0.nu;
        self.factor()
            * Matrix3::new(
                1.0, nu,  0.0,
                nu,  1.0, 0.0,
                0.0, 0.0, 0.5 * (1.0 - nu),
            )
    }
}

impl Stiffness for IsotropicPlaneStress {
    fn c(&self) -> DMatrix<f64> {
        dense(&self.constitutive())
    }

    fn cs(&self) -> Matrix2<f64> {
        self.0.cs()
    }
}

/// Isotropic plane strain law (ε_zz = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotropicPlaneStrain(Isotropic);

impl IsotropicPlaneStrain {
    pub fn new(e: f64, nu: f64) -> Self {
        Self(Isotropic::new(e, nu))
    }

    /// Underlying isotropic constants.
    pub fn isotropic(&self) -> &Isotropic {
        &self.0
    }

    /// Returns the 3x3 matrix for [σ_xx, σ_yy, τ_xy] = C * [ε_xx, ε_yy, γ_xy].
    pub fn constitutive(&self) -> PlaneConstitutiveMatrix {
        let lbd = self.0.lame_lambda();
        let g = self.0.shear_modulus();
        Matrix3::new(
            2.0 * g + lbd, lbd,           0.0,
            lbd,           2.0 * g + lbd, 0.0,
            0.0,           0.0,           g,
        )
    }
}

impl Stiffness for IsotropicPlaneStrain {
    fn c(&self) -> DMatrix<f64> {
        dense(&self.constitutive())
    }

    fn cs(&self) -> Matrix2<f64> {
        self.0.cs()
    }
}

/// Orthotropic linear elastic material with nine independent constants.
///
/// The minor Poisson ratios follow from Maxwell reciprocity,
/// `ν_ji = E_j / E_i · ν_ij`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthotropic {
    e1: f64,
    e2: f64,
    e3: f64,
    nu12: f64,
    nu13: f64,
    nu23: f64,
    g12: f64,
    g13: f64,
    g23: f64,
}

impl Orthotropic {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        e1: f64,
        e2: f64,
        e3: f64,
        nu12: f64,
        nu13: f64,
        nu23: f64,
        g12: f64,
        g13: f64,
        g23: f64,
    ) -> Self {
        Self {
            e1,
            e2,
            e3,
            nu12,
            nu13,
            nu23,
            g12,
            g13,
            g23,
        }
    }

    /// Young's moduli (E1, E2, E3).
    pub fn youngs_moduli(&self) -> [f64; 3] {
        [self.e1, self.e2, self.e3]
    }

    /// Shear moduli (G12, G13, G23).
    pub fn shear_moduli(&self) -> [f64; 3] {
        [self.g12, self.g13, self.g23]
    }

    /// Major Poisson ratios (ν12, ν13, ν23).
    pub fn major_poisson_ratios(&self) -> [f64; 3] {
        [self.nu12, self.nu13, self.nu23]
    }

    /// Minor Poisson ratios (ν21, ν31, ν32).
    pub fn minor_poisson_ratios(&self) -> [f64; 3] {
        [
            self.e2 / self.e1 * self.nu12,
            self.e3 / self.e1 * self.nu13,
            self.e3 / self.e2 * self.nu23,
        ]
    }

    /// 3D constitutive matrix.
    pub fn constitutive_3d(&self) -> ConstitutiveMatrix {
        let (e1, e2, e3) = (self.e1, self.e2, self.e3);
        let (nu12, nu13, nu23) = (self.nu12, self.nu13, self.nu23);
        let [nu21, nu31, nu32] = self.minor_poisson_ratios();

        let f = 1.0 / (1.0 - nu12 * nu21 - nu13 * nu31 - nu23 * nu32 - 2.0 * nu21 * nu32 * nu13);

        let c11 = e1 * (1.0 - nu23 * nu32) * f;
        let c22 = e2 * (1.0 - nu13 * nu31) * f;
        let c33 = e3 * (1.0 - nu12 * nu21) * f;
        let c12 = e1 * (nu21 + nu31 * nu23) * f;
        let c13 = e1 * (nu31 + nu21 * nu32) * f;
        let c23 = e2 * (nu32 + nu12 * nu31) * f;

        Matrix6::new(
            c11, c12, c13, 0.0,      0.0,      0.0,
            c12, c22, c23, 0.0,      0.0,      0.0,
            c13, c23, c33, 0.0,      0.0,      0.0,
            0.0, 0.0, 0.0, self.g23, 0.0,      0.0,
            0.0, 0.0, 0.0, 0.0,      self.g13, 0.0,
            0.0, 0.0, 0.0, 0.0,      0.0,      self.g12,
        )
    }
}

impl Stiffness for Orthotropic {
    fn c(&self) -> DMatrix<f64> {
        dense(&self.constitutive_3d())
    }

    fn cs(&self) -> Matrix2<f64> {
        Matrix2::new(self.g13, 0.0, 0.0, self.g23)
    }
}

/// Orthotropic plane stress law with separate out-of-plane shear moduli.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthotropicPlaneStress {
    e1: f64,
    e2: f64,
    nu12: f64,
    g12: f64,
    g13: f64,
    g23: f64,
}

impl OrthotropicPlaneStress {
    /// In-plane law without transverse shear stiffness.
    pub fn new(e1: f64, e2: f64, nu12: f64, g12: f64) -> Self {
        Self::with_transverse_shear(e1, e2, nu12, g12, 0.0, 0.0)
    }

    /// In-plane law with out-of-plane shear moduli for shell use.
    pub fn with_transverse_shear(e1: f64, e2: f64, nu12: f64, g12: f64, g13: f64, g23: f64) -> Self {
        Self {
            e1,
            e2,
            nu12,
            g12,
            g13,
            g23,
        }
    }

    /// Minor Poisson ratio ν21 = E2 / E1 · ν12.
    pub fn nu21(&self) -> f64 {
        self.e2 / self.e1 * self.nu12
    }

    /// Returns the 3x3 matrix for [σ_xx, σ_yy, τ_xy] = C * [ε_xx, ε_yy, γ_xy].
    pub fn constitutive(&self) -> PlaneConstitutiveMatrix {
        let nu21 = self.nu21();
        let denom = 1.0 - self.nu12 * nu21;
        Matrix3::new(
            self.e1 / denom,             self.nu12 * self.e2 / denom, 0.0,
            nu21 * self.e1 / denom,      self.e2 / denom,             0.0,
            0.0,                         0.0,                         self.g12,
        )
    }
}

impl Stiffness for OrthotropicPlaneStress {
    fn c(&self) -> DMatrix<f64> {
        dense(&self.constitutive())
    }

    fn cs(&self) -> Matrix2<f64> {
        Matrix2::new(self.g13, 0.0, 0.0, self.g23)
    }
}

/// Closed set of 3D laws for heterogeneous material regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolidLaw {
    Isotropic(Isotropic),
    Orthotropic(Orthotropic),
}

impl SolidLaw {
    pub fn constitutive_3d(&self) -> ConstitutiveMatrix {
        match self {
            SolidLaw::Isotropic(m) => m.constitutive_3d(),
            SolidLaw::Orthotropic(m) => m.constitutive_3d(),
        }
    }
}

impl Stiffness for SolidLaw {
    fn c(&self) -> DMatrix<f64> {
        dense(&self.constitutive_3d())
    }

    fn cs(&self) -> Matrix2<f64> {
        match self {
            SolidLaw::Isotropic(m) => m.cs(),
            SolidLaw::Orthotropic(m) => m.cs(),
        }
    }
}

impl From<Isotropic> for SolidLaw {
    fn from(m: Isotropic) -> Self {
        SolidLaw::Isotropic(m)
    }
}

impl From<Orthotropic> for SolidLaw {
    fn from(m: Orthotropic) -> Self {
        SolidLaw::Orthotropic(m)
    }
}

fn solid_stiffness<L: Stiffness>(law: &L) -> Result<ConstitutiveMatrix> {
    let c = law.c();
    if c.nrows() != VOIGT_3D || c.ncols() != VOIGT_3D {
        return Err(Error::Configuration(format!(
            "solid elements need a {0}x{0} stiffness, material provides {1}x{2}",
            VOIGT_3D,
            c.nrows(),
            c.ncols()
        )));
    }
    Ok(Matrix6::from_column_slice(c.as_slice()))
}

/// Result of a batched material update.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialUpdate {
    /// Total strain after the increment, one entry per element.
    pub strain: Vec<Vector6<f64>>,
    /// Stress after the increment, one entry per element.
    pub stress: Vec<Vector6<f64>>,
    /// Consistent tangent, one entry per element.
    pub tangent: Vec<ConstitutiveMatrix>,
}

/// Material stiffness expanded into one slot per element.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizedMaterial {
    stiffness: Vec<ConstitutiveMatrix>,
}

impl VectorizedMaterial {
    /// Share a single law across `n_elements` slots.
    pub fn broadcast<L: Stiffness>(law: &L, n_elements: usize) -> Result<Self> {
        let c = solid_stiffness(law)?;
        Ok(Self {
            stiffness: vec![c; n_elements],
        })
    }

    /// Assign one law per element.
    pub fn per_element<L: Stiffness>(laws: &[L]) -> Result<Self> {
        let stiffness = laws.iter().map(solid_stiffness).collect::<Result<Vec<_>>>()?;
        Ok(Self { stiffness })
    }

    /// Build directly from precomputed 6×6 stiffness matrices.
    pub fn from_stiffness(stiffness: Vec<ConstitutiveMatrix>) -> Self {
        Self { stiffness }
    }

    /// Number of element slots.
    pub fn len(&self) -> usize {
        self.stiffness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stiffness.is_empty()
    }

    /// Stiffness of a single element slot.
    pub fn stiffness(&self, element: usize) -> &ConstitutiveMatrix {
        &self.stiffness[element]
    }

    /// Linear elastic update for one element.
    ///
    /// Returns `(ε_new, σ_new, C)` with `ε_new = ε + Δε` and `σ_new = C·ε_new`.
    /// The prior stress does not enter a linear law.
    #[inline]
    pub fn step_element(
        &self,
        element: usize,
        d_strain: &Vector6<f64>,
        strain: &Vector6<f64>,
        _stress: &Vector6<f64>,
    ) -> (Vector6<f64>, Vector6<f64>, ConstitutiveMatrix) {
        let c = &self.stiffness[element];
        let strain_new = strain + d_strain;
        let stress_new = c * strain_new;
        (strain_new, stress_new, *c)
    }

    /// Batched update over the element dimension.
    ///
    /// All slices are indexed by element.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if a slice length differs from [`Self::len`].
    pub fn step(
        &self,
        d_strain: &[Vector6<f64>],
        strain: &[Vector6<f64>],
        stress: &[Vector6<f64>],
    ) -> Result<MaterialUpdate> {
        let n = self.len();
        let buffers = [
            ("strain increment", d_strain.len()),
            ("strain", strain.len()),
            ("stress", stress.len()),
        ];
        for (name, len) in buffers {
            if len != n {
                return Err(Error::Configuration(format!(
                    "{} buffer has {} entries, material has {} element slots",
                    name, len, n
                )));
            }
        }

        let mut update = MaterialUpdate {
            strain: Vec::with_capacity(n),
            stress: Vec::with_capacity(n),
            tangent: Vec::with_capacity(n),
        };
        for e in 0..n {
            let (eps, sig, c) = self.step_element(e, &d_strain[e], &strain[e], &stress[e]);
            update.strain.push(eps);
            update.stress.push(sig);
            update.tangent.push(c);
        }
        Ok(update)
    }
}
