//! Scalar quantities of interest and error norms.

use crate::{function::FeFunction, Point};

use itertools::Itertools;

/// $int_Omega phi$
pub fn mass(phi: &FeFunction) -> f64 {
  phi.integrate(|u, _| u)
}

/// Minimal and maximal coefficient.
pub fn extrema(phi: &FeFunction) -> (f64, f64) {
  match phi.coeffs().iter().copied().minmax() {
    itertools::MinMaxResult::NoElements => (f64::NAN, f64::NAN),
    itertools::MinMaxResult::OneElement(v) => (v, v),
    itertools::MinMaxResult::MinMax(min, max) => (min, max),
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSummary {
  pub min: f64,
  pub max: f64,
  pub mass: f64,
}
impl FieldSummary {
  pub fn of(phi: &FeFunction) -> Self {
    let (min, max) = extrema(phi);
    Self {
      min,
      max,
      mass: mass(phi),
    }
  }
}

/// $norm(phi - g)_(L^2)$ with the quadrature of the space.
pub fn l2_error<F>(phi: &FeFunction, exact: F) -> f64
where
  F: Fn(&Point) -> f64,
{
  phi
    .integrate(|u, x| {
      let e = u - exact(x);
      e * e
    })
    .sqrt()
}

/// Maximal nodal deviation from the interpolant of `exact`.
pub fn linf_error<F>(phi: &FeFunction, exact: F) -> f64
where
  F: Fn(&Point) -> f64,
{
  phi
    .coeffs()
    .iter()
    .zip(phi.space().dof_handler().dof_coords())
    .map(|(u, x)| (u - exact(x)).abs())
    .fold(0.0, f64::max)
}

/// Observed order of a refinement that halves the mesh width.
pub fn algebraic_convergence_rate(next: f64, prev: f64) -> f64 {
  let quot: f64 = next / prev;
  -quot.log2()
}

/// Observed orders $log(e_i / e_(i+1)) / log(h_i / h_(i+1))$ of a refinement sequence.
pub fn convergence_rates(widths: &[f64], errors: &[f64]) -> Vec<f64> {
  assert_eq!(widths.len(), errors.len());
  widths
    .iter()
    .zip(errors)
    .tuple_windows()
    .map(|((h0, e0), (h1, e1))| (e0 / e1).ln() / (h0 / h1).ln())
    .collect()
}

#[cfg(test)]
mod test {
  use super::{
    algebraic_convergence_rate, convergence_rates, extrema, l2_error, linf_error, mass,
  };
  use crate::{
    function::FeFunction,
    mesh::rectangle::RectangleMeshInfo,
    space::{Continuity, FeSpace},
  };

  use approx::assert_relative_eq;
  use std::rc::Rc;

  fn space() -> Rc<FeSpace> {
    let mesh = Rc::new(RectangleMeshInfo::new_unit(4, 4).to_mesh().unwrap());
    Rc::new(FeSpace::new(mesh, 2, Continuity::Continuous).unwrap())
  }

  #[test]
  fn mass_and_extrema_of_linear_field() {
    let phi = FeFunction::interpolate(space(), |x| 2.0 * x[0] - x[1]);
    assert_relative_eq!(mass(&phi), 0.5, epsilon = 1e-13);
    let (min, max) = extrema(&phi);
    assert_relative_eq!(min, -1.0);
    assert_relative_eq!(max, 2.0);
  }

  #[test]
  fn errors_of_shifted_field() {
    let phi = FeFunction::interpolate(space(), |x| x[0] * x[1]);
    let exact = |x: &crate::Point| x[0] * x[1] + 0.1;
    assert_relative_eq!(l2_error(&phi, exact), 0.1, epsilon = 1e-12);
    assert_relative_eq!(linf_error(&phi, exact), 0.1, epsilon = 1e-12);
  }

  #[test]
  fn second_order_rates() {
    let widths = [0.4, 0.2, 0.1];
    let errors = [1.6e-2, 4e-3, 1e-3];
    for rate in convergence_rates(&widths, &errors) {
      assert_relative_eq!(rate, 2.0, epsilon = 1e-12);
    }
    assert_relative_eq!(algebraic_convergence_rate(4e-3, 1.6e-2), 2.0, epsilon = 1e-12);
  }
}
