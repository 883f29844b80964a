use crate::space::Continuity;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid parameter `{name}` = {value}: {reason}")]
  InvalidParameter {
    name: &'static str,
    value: f64,
    reason: &'static str,
  },
  #[error("quadratization shift B = {shift} must be finite and strictly positive")]
  NonPositiveShift { shift: f64 },
  #[error("auxiliary variable degenerates: F(phi) + B = {min:e} at dof {dof}")]
  DegenerateAuxiliary { min: f64, dof: usize },
  #[error("unsupported polynomial degree {0}, expected 1 or 2")]
  UnsupportedDegree(usize),
  #[error("{scheme} discretization requires a {expected:?} space, got {actual:?}")]
  IncompatibleSpace {
    scheme: &'static str,
    expected: Continuity,
    actual: Continuity,
  },
  #[error("space has degree {actual}, but P{expected} was requested")]
  DegreeMismatch { expected: usize, actual: usize },
  #[error("initial field has {actual} coefficients, but the space has {expected} dofs")]
  DimensionMismatch { expected: usize, actual: usize },
  #[error("invalid mesh: {0}")]
  InvalidMesh(String),
  #[error("linear solve failed at step {step}")]
  Solver {
    step: usize,
    #[source]
    source: LinalgError,
  },
  #[error("non-finite values in `{field}` after step {step}")]
  NonFinite { step: usize, field: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum LinalgError {
  #[error("sparse LU factorization failed: {0}")]
  Lu(String),
  #[error("sparse Cholesky factorization failed: {0}")]
  Cholesky(String),
  #[error("solution contains non-finite entries")]
  NonFiniteSolution,
}
