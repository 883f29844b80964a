//! Sparse direct solvers backed by faer.

use crate::error::LinalgError;

use faer::solvers::SpSolver;

type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;

pub fn nalgebra2faer(m: nas::CscMatrix<f64>) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (col_ptrs, row_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  faer::sparse::SparseColMat::new(symbolic, values)
}

pub fn bilinear_form(mat: &nas::CscMatrix<f64>, u: &na::DVector<f64>, v: &na::DVector<f64>) -> f64 {
  ((mat * v).transpose() * u).x
}
pub fn quadratic_form_sparse(mat: &nas::CscMatrix<f64>, u: &na::DVector<f64>) -> f64 {
  bilinear_form(mat, u, u)
}

fn solve_checked<F>(b: &na::DVector<f64>, solve: F) -> Result<na::DVector<f64>, LinalgError>
where
  F: FnOnce(faer::col::ColRef<'_, f64>) -> faer::Col<f64>,
{
  let b = faer::col::from_slice(b.as_slice());
  let x = na::DVector::from_vec(solve(b).as_slice().to_vec());
  if x.iter().all(|v| v.is_finite()) {
    Ok(x)
  } else {
    Err(LinalgError::NonFiniteSolution)
  }
}

/// Sparse LU factorization, used for the non-symmetric mixed systems.
pub struct FaerLu {
  raw: faer::sparse::linalg::solvers::Lu<usize, f64>,
}
impl FaerLu {
  pub fn new(a: nas::CscMatrix<f64>) -> Result<Self, LinalgError> {
    let raw = nalgebra2faer(a)
      .sp_lu()
      .map_err(|err| LinalgError::Lu(format!("{err:?}")))?;
    Ok(Self { raw })
  }

  /// Fails if the solution is not finite, which is how a numerically singular system shows up.
  pub fn solve(&self, b: &na::DVector<f64>) -> Result<na::DVector<f64>, LinalgError> {
    solve_checked(b, |b| self.raw.solve(b))
  }
}

/// Sparse Cholesky factorization, used for the mass matrix of L2 projections.
pub struct FaerCholesky {
  raw: faer::sparse::linalg::solvers::Cholesky<usize, f64>,
}
impl FaerCholesky {
  pub fn new(a: nas::CscMatrix<f64>) -> Result<Self, LinalgError> {
    let raw = nalgebra2faer(a)
      .sp_cholesky(faer::Side::Upper)
      .map_err(|err| LinalgError::Cholesky(format!("{err:?}")))?;
    Ok(Self { raw })
  }

  pub fn solve(&self, b: &na::DVector<f64>) -> Result<na::DVector<f64>, LinalgError> {
    solve_checked(b, |b| self.raw.solve(b))
  }
}
