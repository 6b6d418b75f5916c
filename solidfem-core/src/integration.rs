//! Batched element integration.
//!
//! One pass evaluates every element at every integration point and returns
//! element stiffness matrices, internal force vectors and the updated strain
//! and stress history in structure-of-arrays buffers. The pass runs in two
//! phases:
//!
//! 1. Geometry: Jacobian `J = ∇ξN · X_e`, its determinant and the physical
//!    gradients `∇ₓN = J⁻¹ · ∇ξN` for all points and elements. A non-positive
//!    determinant aborts the pass before anything is accumulated.
//! 2. Numerics: per integration point, strain increments `Δε = D · Δu_e` for
//!    all elements, one batched material update, and accumulation of
//!    `w·detJ`-weighted contributions.
//!
//! Elements are processed in parallel with rayon; every element owns disjoint
//! slices of the output buffers.

use crate::dof::DofMap;
use crate::element::QuadratureTable;
use crate::error::{Error, Result};
use crate::material::VectorizedMaterial;
use crate::mesh::Mesh;
use crate::types::Point3;
use nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX, Matrix6xX, Vector6};
use rayon::prelude::*;

/// Element-level results of one integration pass.
///
/// Buffers are laid out element by element. Stiffness blocks are row-major,
/// in the same order as [`DofMap::rows`] and [`DofMap::cols`].
#[derive(Debug, Clone)]
pub struct ElementIntegrals {
    dofs_per_element: usize,
    /// Flattened element stiffness matrices, `n_elements * n_dofs²` entries.
    pub stiffness: Vec<f64>,
    /// Flattened element internal force vectors, `n_elements * n_dofs` entries.
    pub internal_force: Vec<f64>,
    /// Volume-averaged total strain per element.
    pub strain: Vec<Vector6<f64>>,
    /// Volume-averaged stress per element.
    pub stress: Vec<Vector6<f64>>,
    /// Element volumes `Σ w·detJ`.
    pub volume: Vec<f64>,
}

impl ElementIntegrals {
    fn zeros(n_elements: usize, dofs_per_element: usize) -> Self {
        Self {
            dofs_per_element,
            stiffness: vec![0.0; n_elements * dofs_per_element * dofs_per_element],
            internal_force: vec![0.0; n_elements * dofs_per_element],
            strain: vec![Vector6::zeros(); n_elements],
            stress: vec![Vector6::zeros(); n_elements],
            volume: vec![0.0; n_elements],
        }
    }

    /// Number of elements.
    pub fn n_elements(&self) -> usize {
        self.volume.len()
    }

    /// Number of DOFs per element.
    pub fn dofs_per_element(&self) -> usize {
        self.dofs_per_element
    }

    /// Stiffness matrix of one element.
    pub fn element_stiffness(&self, element: usize) -> DMatrix<f64> {
        let n = self.dofs_per_element;
        DMatrix::from_row_slice(n, n, &self.stiffness[element * n * n..(element + 1) * n * n])
    }

    /// Internal force vector of one element.
    pub fn element_force(&self, element: usize) -> &[f64] {
        let n = self.dofs_per_element;
        &self.internal_force[element * n..(element + 1) * n]
    }
}

/// Jacobian determinant and physical gradients at one integration point.
struct PointGeometry {
    det_j: f64,
    /// 3×n physical gradient operator `∇ₓN`.
    gradient: Matrix3xX<f64>,
}

fn point_geometry(coords: &[Point3], reference: &DMatrix<f64>) -> PointGeometry {
    let n = coords.len();
    let mut j = Matrix3::zeros();
    for (i, x) in coords.iter().enumerate() {
        for k in 0..3 {
            for m in 0..3 {
                j[(k, m)] += reference[(k, i)] * x[m];
            }
        }
    }

    let det_j = j.determinant();
    let gradient = match j.try_inverse() {
        Some(j_inv) if det_j > 0.0 => j_inv * reference,
        _ => Matrix3xX::zeros(n),
    };
    PointGeometry { det_j, gradient }
}

/// Strain-displacement operator (6 × 3n) in Voigt order `[xx, yy, zz, yz, xz, xy]`.
pub fn strain_displacement(gradient: &Matrix3xX<f64>) -> Matrix6xX<f64> {
    let n = gradient.ncols();
    let mut d = Matrix6xX::zeros(3 * n);
    for i in 0..n {
        let (bx, by, bz) = (gradient[(0, i)], gradient[(1, i)], gradient[(2, i)]);
        let c = 3 * i;
        d[(0, c)] = bx;
        d[(1, c + 1)] = by;
        d[(2, c + 2)] = bz;
        d[(3, c + 1)] = bz;
        d[(3, c + 2)] = by;
        d[(4, c)] = bz;
        d[(4, c + 2)] = bx;
        d[(5, c)] = by;
        d[(5, c + 1)] = bx;
    }
    d
}

/// Evaluate the geometry of every element at every integration point.
///
/// Returns one vector per integration point, each indexed by element.
///
/// # Errors
///
/// [`Error::Geometry`] for the first (point, element) pair, in point-major
/// order, whose Jacobian determinant is not positive.
fn geometry(mesh: &Mesh, table: &QuadratureTable) -> Result<Vec<Vec<PointGeometry>>> {
    let elements: Vec<&[usize]> = mesh.elements().collect();
    let nodes = mesh.nodes();

    let per_point: Vec<Vec<PointGeometry>> = table
        .gradients
        .iter()
        .map(|reference| {
            elements
                .par_iter()
                .map(|conn| {
                    let coords: Vec<Point3> = conn.iter().map(|&n| nodes[n]).collect();
                    point_geometry(&coords, reference)
                })
                .collect()
        })
        .collect();

    for (point, geoms) in per_point.iter().enumerate() {
        if let Some((element, g)) = geoms.iter().enumerate().find(|(_, g)| g.det_j <= 0.0) {
            return Err(Error::Geometry {
                element,
                point,
                det_j: g.det_j,
            });
        }
    }
    Ok(per_point)
}

/// Run one integration pass.
///
/// `strain` and `stress` are the committed element history, `du` the global
/// displacement increment of the running load step. Inputs are not modified.
pub fn integrate(
    mesh: &Mesh,
    table: &QuadratureTable,
    dofs: &DofMap,
    material: &VectorizedMaterial,
    strain: &[Vector6<f64>],
    stress: &[Vector6<f64>],
    du: &[f64],
) -> Result<ElementIntegrals> {
    let n_elements = mesh.n_elements();
    let nd = dofs.dofs_per_element();
    if material.len() != n_elements || strain.len() != n_elements || stress.len() != n_elements {
        return Err(Error::Configuration(format!(
            "element buffers disagree: {} elements, {} materials, {} strains, {} stresses",
            n_elements,
            material.len(),
            strain.len(),
            stress.len()
        )));
    }
    if du.len() != dofs.n_dofs() {
        return Err(Error::Configuration(format!(
            "displacement increment has {} entries, model has {} DOFs",
            du.len(),
            dofs.n_dofs()
        )));
    }

    let points = geometry(mesh, table)?;

    let du_elements: Vec<DVector<f64>> = (0..n_elements)
        .into_par_iter()
        .map(|e| DVector::from_vec(dofs.gather(e, du)))
        .collect();

    let mut out = ElementIntegrals::zeros(n_elements, nd);

    for (weight, geoms) in table.weights.iter().zip(&points) {
        let operators: Vec<Matrix6xX<f64>> = geoms
            .par_iter()
            .map(|g| strain_displacement(&g.gradient))
            .collect();

        let d_strain: Vec<Vector6<f64>> = operators
            .par_iter()
            .zip(&du_elements)
            .map(|(d, du_e)| d * du_e)
            .collect();

        let update = material.step(&d_strain, strain, stress)?;

        out.stiffness
            .par_chunks_mut(nd * nd)
            .zip(out.internal_force.par_chunks_mut(nd))
            .zip(out.strain.par_iter_mut())
            .zip(out.stress.par_iter_mut())
            .zip(out.volume.par_iter_mut())
            .enumerate()
            .for_each(|(e, ((((k_e, f_e), eps_e), sig_e), vol_e))| {
                let dv = weight * geoms[e].det_j;
                let d = &operators[e];
                let dt = d.transpose();

                let k = &dt * update.tangent[e] * d;
                for i in 0..nd {
                    for j in 0..nd {
                        k_e[i * nd + j] += dv * k[(i, j)];
                    }
                }

                let f = &dt * update.stress[e];
                for (fi, v) in f_e.iter_mut().zip(f.iter()) {
                    *fi += dv * v;
                }

                *eps_e += update.strain[e] * dv;
                *sig_e += update.stress[e] * dv;
                *vol_e += dv;
            });
    }

    for ((eps, sig), &vol) in out.strain.iter_mut().zip(&mut out.stress).zip(&out.volume) {
        *eps /= vol;
        *sig /= vol;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Isotropic;
    use approx::assert_relative_eq;

    fn unit_tet() -> Mesh {
        let nodes = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        Mesh::new(nodes, &[[0usize, 1, 2, 3]]).unwrap()
    }

    fn unit_cube() -> Mesh {
        let nodes = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        Mesh::new(nodes, &[[0usize, 1, 2, 3, 4, 5, 6, 7]]).unwrap()
    }

    fn run(mesh: &Mesh, du: &[f64]) -> Result<ElementIntegrals> {
        let table = mesh.element_type().quadrature_table();
        let dofs = DofMap::new(mesh);
        let material = VectorizedMaterial::broadcast(&Isotropic::new(1000.0, 0.25), 1)?;
        let zeros = vec![Vector6::zeros(); 1];
        integrate(mesh, &table, &dofs, &material, &zeros, &zeros, du)
    }

    #[test]
    fn test_strain_displacement_layout() {
        let gradient = Matrix3xX::from_column_slice(&[1.0, 2.0, 3.0]);
        let d = strain_displacement(&gradient);
        #[rustfmt::skip]
        let expected = Matrix6xX::from_row_slice(&[
            1.0, 0.0, 0.0,
            0.0, 2.0, 0.0,
            0.0, 0.0, 3.0,
            0.0, 3.0, 2.0,
            3.0, 0.0, 1.0,
            2.0, 1.0, 0.0,
        ]);
        assert_eq!(d, expected);
    }

    #[test]
    fn test_element_volumes() {
        let du = vec![0.0; 12];
        let tet = run(&unit_tet(), &du).unwrap();
        assert_relative_eq!(tet.volume[0], 1.0 / 6.0, epsilon = 1e-14);

        let du = vec![0.0; 24];
        let hex = run(&unit_cube(), &du).unwrap();
        assert_relative_eq!(hex.volume[0], 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_stiffness_symmetric_with_rigid_body_null_space() {
        let mesh = unit_cube();
        let out = run(&mesh, &vec![0.0; 24]).unwrap();
        let k = out.element_stiffness(0);
        assert_relative_eq!(k.clone(), k.transpose(), epsilon = 1e-9);

        // Rigid translation in y produces no force
        let mut u = DVector::zeros(24);
        for node in 0..8 {
            u[3 * node + 1] = 1.0;
        }
        assert!((&k * &u).norm() < 1e-9);
    }

    #[test]
    fn test_uniform_stretch_strain_and_stress() {
        // u_x = 0.01 x gives ε_xx = 0.01 and σ = C ε
        let mesh = unit_cube();
        let mut du = vec![0.0; 24];
        for (node, x) in mesh.nodes().iter().enumerate() {
            du[3 * node] = 0.01 * x[0];
        }
        let out = run(&mesh, &du).unwrap();

        assert_relative_eq!(out.strain[0][0], 0.01, epsilon = 1e-14);
        assert_relative_eq!(out.strain[0][1], 0.0, epsilon = 1e-14);

        let c = Isotropic::new(1000.0, 0.25).constitutive_3d();
        assert_relative_eq!(out.stress[0][0], c[(0, 0)] * 0.01, epsilon = 1e-10);
        assert_relative_eq!(out.stress[0][1], c[(1, 0)] * 0.01, epsilon = 1e-10);

        // Internal forces are self-equilibrated
        let sum_x: f64 = out.element_force(0).iter().step_by(3).sum();
        assert_relative_eq!(sum_x, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_inverted_element_is_geometry_error() {
        let nodes = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mesh = Mesh::new(nodes, &[[0usize, 1, 2, 3]]).unwrap();
        let err = run(&mesh, &vec![0.0; 12]).unwrap_err();
        match err {
            Error::Geometry { element, point, det_j } => {
                assert_eq!(element, 0);
                assert_eq!(point, 0);
                assert!(det_j < 0.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_buffer_mismatch_is_configuration_error() {
        let err = run(&unit_tet(), &[0.0; 3]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
