//! Assembly of Galerkin matrices and vectors from element contributions.

use crate::{
  function::FeFunction,
  space::{CellValues, FacetValues, FeSpace},
  sparse::SparseMatrix,
  Point,
};

pub type GalMat = SparseMatrix;
pub type GalVec = na::DVector<f64>;

pub trait ElmatProvider {
  fn eval(&self, cell: &CellValues) -> na::DMatrix<f64>;
}

pub trait ElvecProvider {
  fn eval(&self, cell: &CellValues) -> na::DVector<f64>;
}

/// Element matrix on an interior facet, indexed by the local dofs of `+` followed by `-`.
pub trait FacetElmatProvider {
  fn eval(&self, facet: &FacetValues) -> na::DMatrix<f64>;
}

fn scatter(galmat: &mut GalMat, dofs: &[usize], elmat: &na::DMatrix<f64>) {
  for (ilocal, &iglobal) in dofs.iter().enumerate() {
    for (jlocal, &jglobal) in dofs.iter().enumerate() {
      galmat.push(iglobal, jglobal, elmat[(ilocal, jlocal)]);
    }
  }
}

/// Assembly algorithm for the Galerkin Matrix of a cell bilinear form.
pub fn assemble_galmat(space: &FeSpace, elmat: impl ElmatProvider) -> GalMat {
  let ndofs = space.ndofs();
  let mut galmat = SparseMatrix::zeros(ndofs, ndofs);
  for icell in 0..space.mesh().ncells() {
    let cell = space.cell_values(icell);
    let elmat = elmat.eval(&cell);
    scatter(&mut galmat, cell.dofs(), &elmat);
  }
  galmat
}

/// Assembly algorithm for the Galerkin Matrix of an interior facet bilinear form.
pub fn assemble_facet_galmat(space: &FeSpace, elmat: impl FacetElmatProvider) -> GalMat {
  let ndofs = space.ndofs();
  let mut galmat = SparseMatrix::zeros(ndofs, ndofs);
  for ifacet in 0..space.mesh().nfacets() {
    let Some(facet) = space.facet_values(ifacet) else {
      continue;
    };
    let elmat = elmat.eval(&facet);
    scatter(&mut galmat, &facet.dofs(), &elmat);
  }
  galmat
}

/// Assembly algorithm for the Galerkin Vector.
pub fn assemble_galvec(space: &FeSpace, elvec: impl ElvecProvider) -> GalVec {
  let mut galvec = na::DVector::zeros(space.ndofs());
  for icell in 0..space.mesh().ncells() {
    let cell = space.cell_values(icell);
    let elvec = elvec.eval(&cell);
    for (ilocal, &iglobal) in cell.dofs().iter().enumerate() {
      galvec[iglobal] += elvec[ilocal];
    }
  }
  galvec
}

/// Exact Element Matrix Provider for the mass bilinear form.
pub struct MassElmat;
impl ElmatProvider for MassElmat {
  fn eval(&self, cell: &CellValues) -> na::DMatrix<f64> {
    cell.mass_elmat()
  }
}

/// Exact Element Matrix Provider for the (broken) Dirichlet form
/// $sum_K (grad u, grad v)_(L^2(K))$.
pub struct LaplaceElmat;
impl ElmatProvider for LaplaceElmat {
  fn eval(&self, cell: &CellValues) -> na::DMatrix<f64> {
    cell.laplace_elmat()
  }
}

/// Element Matrix Provider for the weighted mass bilinear form $(c u, v)_(L^2)$.
pub struct WeightedMassElmat<C>(pub C);
impl<C: Coefficient> ElmatProvider for WeightedMassElmat<C> {
  fn eval(&self, cell: &CellValues) -> na::DMatrix<f64> {
    cell.weighted_mass_elmat(&self.0.eval_cell(cell))
  }
}

/// Element Vector Provider for the load functional $(f, v)_(L^2)$.
pub struct LoadElvec<C>(pub C);
impl<C: Coefficient> ElvecProvider for LoadElvec<C> {
  fn eval(&self, cell: &CellValues) -> na::DVector<f64> {
    cell.load_elvec(&self.0.eval_cell(cell))
  }
}

/// A scalar function that can be evaluated on the quadrature nodes of a cell.
pub trait Coefficient {
  fn eval_cell(&self, cell: &CellValues) -> Vec<f64>;
}

impl<C: Coefficient + ?Sized> Coefficient for &C {
  fn eval_cell(&self, cell: &CellValues) -> Vec<f64> {
    (**self).eval_cell(cell)
  }
}

/// Pointwise coefficient $c(x) = f([u_1(x), ..., u_m(x)], x)$ of discrete fields $u_i$.
pub struct FieldCoefficient<'a, F> {
  fields: Vec<&'a FeFunction>,
  f: F,
}
impl<'a, F> FieldCoefficient<'a, F>
where
  F: Fn(&[f64], &Point) -> f64,
{
  pub fn new(fields: Vec<&'a FeFunction>, f: F) -> Self {
    Self { fields, f }
  }
}
impl<F> Coefficient for FieldCoefficient<'_, F>
where
  F: Fn(&[f64], &Point) -> f64,
{
  fn eval_cell(&self, cell: &CellValues) -> Vec<f64> {
    let field_values: Vec<Vec<f64>> = self
      .fields
      .iter()
      .map(|u| cell.values(u.coeffs()))
      .collect();
    let mut args = vec![0.0; self.fields.len()];
    (0..cell.nqpoints())
      .map(|iq| {
        for (arg, values) in args.iter_mut().zip(&field_values) {
          *arg = values[iq];
        }
        (self.f)(args.as_slice(), &cell.points()[iq])
      })
      .collect()
  }
}

pub fn mass_galmat(space: &FeSpace) -> GalMat {
  assemble_galmat(space, MassElmat)
}

pub fn laplace_galmat(space: &FeSpace) -> GalMat {
  assemble_galmat(space, LaplaceElmat)
}
