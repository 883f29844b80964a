use crate::{
  assemble::{self, Coefficient, LoadElvec},
  error::LinalgError,
  linalg::FaerCholesky,
  space::FeSpace,
  Point,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::rc::Rc;

/// A discrete scalar field, given by its coefficients in the basis of an [`FeSpace`].
#[derive(Debug, Clone)]
pub struct FeFunction {
  space: Rc<FeSpace>,
  coeffs: na::DVector<f64>,
}

// constructors
impl FeFunction {
  pub fn new(space: Rc<FeSpace>, coeffs: na::DVector<f64>) -> Self {
    assert_eq!(space.ndofs(), coeffs.len(), "coefficient count must match the space");
    Self { space, coeffs }
  }

  pub fn zero(space: Rc<FeSpace>) -> Self {
    let coeffs = na::DVector::zeros(space.ndofs());
    Self { space, coeffs }
  }

  pub fn constant(space: Rc<FeSpace>, value: f64) -> Self {
    let coeffs = na::DVector::from_element(space.ndofs(), value);
    Self { space, coeffs }
  }

  /// Nodal interpolant of `f`.
  pub fn interpolate<F>(space: Rc<FeSpace>, f: F) -> Self
  where
    F: Fn(&Point) -> f64,
  {
    let coeffs = na::DVector::from_iterator(
      space.ndofs(),
      space.dof_handler().dof_coords().iter().map(f),
    );
    Self { space, coeffs }
  }

  /// Independent uniform noise in $[-a, a]$ on every dof, reproducible through `seed`.
  pub fn random_uniform(space: Rc<FeSpace>, amplitude: f64, seed: u64) -> Self {
    let mut rng = StdRng::seed_from_u64(seed);
    let coeffs =
      na::DVector::from_fn(space.ndofs(), |_, _| rng.gen_range(-amplitude..=amplitude));
    Self { space, coeffs }
  }
}

// getters
impl FeFunction {
  pub fn space(&self) -> &Rc<FeSpace> {
    &self.space
  }
  pub fn coeffs(&self) -> &na::DVector<f64> {
    &self.coeffs
  }
  pub fn coeffs_mut(&mut self) -> &mut na::DVector<f64> {
    &mut self.coeffs
  }
  pub fn into_coeffs(self) -> na::DVector<f64> {
    self.coeffs
  }

  pub fn is_finite(&self) -> bool {
    self.coeffs.iter().all(|v| v.is_finite())
  }

  /// $int_Omega f(u, x)$ evaluated with the quadrature of the space.
  pub fn integrate<F>(&self, f: F) -> f64
  where
    F: Fn(f64, &Point) -> f64,
  {
    (0..self.space.mesh().ncells())
      .map(|icell| {
        let cv = self.space.cell_values(icell);
        let values: Vec<f64> = cv
          .values(&self.coeffs)
          .into_iter()
          .zip(cv.points())
          .map(|(u, x)| f(u, x))
          .collect();
        cv.integrate(&values)
      })
      .sum()
  }
}

/// Orthogonal $L^2$ projection onto an [`FeSpace`].
///
/// The mass matrix is factorized once and reused for every projection.
pub struct L2Projector {
  space: Rc<FeSpace>,
  mass: FaerCholesky,
}
impl L2Projector {
  pub fn new(space: Rc<FeSpace>) -> Result<Self, LinalgError> {
    let mass = FaerCholesky::new(assemble::mass_galmat(&space).to_nalgebra_csc())?;
    Ok(Self { space, mass })
  }

  pub fn space(&self) -> &Rc<FeSpace> {
    &self.space
  }

  pub fn project(&self, coeff: impl Coefficient) -> Result<FeFunction, LinalgError> {
    let galvec = assemble::assemble_galvec(&self.space, LoadElvec(coeff));
    let coeffs = self.mass.solve(&galvec)?;
    Ok(FeFunction::new(self.space.clone(), coeffs))
  }
}

#[cfg(test)]
mod test {
  use super::{FeFunction, L2Projector};
  use crate::{
    assemble::FieldCoefficient,
    mesh::rectangle::RectangleMeshInfo,
    space::{Continuity, FeSpace},
  };

  use approx::assert_relative_eq;
  use std::rc::Rc;

  #[test]
  fn integrate_quadratic_exactly() {
    let mesh = Rc::new(RectangleMeshInfo::new_unit(3, 3).to_mesh().unwrap());
    for continuity in [Continuity::Continuous, Continuity::Discontinuous] {
      let space = Rc::new(FeSpace::new(mesh.clone(), 2, continuity).unwrap());
      let u = FeFunction::interpolate(space, |x| x[0] * x[0] + x[1]);
      assert_relative_eq!(u.integrate(|u, _| u), 1.0 / 3.0 + 0.5, epsilon = 1e-13);
    }
  }

  #[test]
  fn random_uniform_is_bounded_and_reproducible() {
    let mesh = Rc::new(RectangleMeshInfo::new_unit(4, 4).to_mesh().unwrap());
    let space = Rc::new(FeSpace::new(mesh, 1, Continuity::Continuous).unwrap());
    let a = FeFunction::random_uniform(space.clone(), 0.01, 1);
    let b = FeFunction::random_uniform(space, 0.01, 1);
    assert!(a.coeffs().iter().all(|v| v.abs() <= 0.01));
    assert_eq!(a.coeffs(), b.coeffs());
  }

  #[test]
  fn projection_reproduces_discrete_functions() {
    let mesh = Rc::new(RectangleMeshInfo::new_unit(3, 2).to_mesh().unwrap());
    for continuity in [Continuity::Continuous, Continuity::Discontinuous] {
      let space = Rc::new(FeSpace::new(mesh.clone(), 2, continuity).unwrap());
      let projector = L2Projector::new(space.clone()).unwrap();
      let u = FeFunction::interpolate(space, |x| x[0] * x[1] - 0.5 * x[1] * x[1]);
      let pu = projector
        .project(FieldCoefficient::new(vec![&u], |u: &[f64], _: &crate::Point| u[0]))
        .unwrap();
      assert_relative_eq!(pu.coeffs(), u.coeffs(), epsilon = 1e-12);
    }
  }

  #[test]
  fn projection_preserves_mean() {
    let mesh = Rc::new(RectangleMeshInfo::new_unit(4, 4).to_mesh().unwrap());
    let space = Rc::new(FeSpace::new(mesh, 1, Continuity::Continuous).unwrap());
    let projector = L2Projector::new(space).unwrap();
    let f = |_: &[f64], x: &crate::Point| x[0].sin() * x[1].exp();
    let pf = projector.project(FieldCoefficient::new(vec![], f)).unwrap();
    let exact = (1.0 - 1f64.cos()) * (1f64.exp() - 1.0);
    // the constant one is in the space, so the integral is preserved up to quadrature error
    assert_relative_eq!(pf.integrate(|u, _| u), exact, epsilon = 1e-5);
  }
}
