//! Error types for solidfem operations.

use thiserror::Error;

/// Result type alias using the solidfem Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or solving a solid model.
#[derive(Error, Debug)]
pub enum Error {
    /// Non-positive Jacobian determinant at an integration point.
    ///
    /// Indicates an inverted or degenerate element, usually caused by a
    /// wrong node ordering. Never retried.
    #[error(
        "negative Jacobian determinant {det_j:e} in element {element} at integration point {point}; check element numbering"
    )]
    Geometry {
        element: usize,
        point: usize,
        det_j: f64,
    },

    /// Unsupported element family, mixed arity or incompatible material.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Mesh-related errors.
    #[error("mesh error: {0}")]
    Mesh(String),

    /// Failure inside the sparse linear solve.
    #[error("linear solve error: {0}")]
    LinearSolve(String),

    /// Matrix singularity or loss of positive definiteness.
    #[error("singular matrix: {0}")]
    SingularMatrix(String),
}

impl Error {
    /// Whether the error originates from the linear-solve collaborator.
    pub fn is_linear_solve(&self) -> bool {
        matches!(self, Error::LinearSolve(_) | Error::SingularMatrix(_))
    }
}
