//! Source terms and the manufactured solution used for convergence studies.

use crate::{assemble::Coefficient, space::CellValues, Point};

/// A time dependent right hand side $s(x, t)$ of the phase equation.
pub trait SourceTerm {
  fn eval(&self, x: &Point, t: f64) -> f64;

  /// The source frozen at time `t`.
  fn at(&self, t: f64) -> SourceAt<'_, Self>
  where
    Self: Sized,
  {
    SourceAt { source: self, t }
  }
}

pub struct SourceAt<'a, S: ?Sized> {
  source: &'a S,
  t: f64,
}
impl<S: SourceTerm + ?Sized> Coefficient for SourceAt<'_, S> {
  fn eval_cell(&self, cell: &CellValues) -> Vec<f64> {
    cell
      .points()
      .iter()
      .map(|x| self.source.eval(x, self.t))
      .collect()
  }
}

/// Creates the coefficient of a dynamically typed source at time `t`.
pub fn source_at(source: &dyn SourceTerm, t: f64) -> SourceAt<'_, dyn SourceTerm + '_> {
  SourceAt { source, t }
}

/// Exact solution $g = A e^(-lambda t) sin(k x) sin(k y)$ and the source
/// $s = g_t - gamma Delta(-eps^2 Delta g + F'(g))$ making it solve the
/// Cahn-Hilliard equation with homogeneous Neumann data on squares of side
/// length a multiple of $pi/k$.
#[derive(Debug, Clone, Copy)]
pub struct DecayingSineMode {
  pub amplitude: f64,
  pub decay: f64,
  pub wavenumber: f64,
  pub eps: f64,
  pub gamma: f64,
}

impl DecayingSineMode {
  /// $A = 0.1$, $lambda = 1/4$, $k = 1/2$.
  pub fn new(eps: f64, gamma: f64) -> Self {
    Self {
      amplitude: 0.1,
      decay: 0.25,
      wavenumber: 0.5,
      eps,
      gamma,
    }
  }

  pub fn exact(&self, x: &Point, t: f64) -> f64 {
    let k = self.wavenumber;
    self.amplitude * (-self.decay * t).exp() * (k * x[0]).sin() * (k * x[1]).sin()
  }

  /// $|grad g|^2$
  fn grad_norm_sq(&self, x: &Point, t: f64) -> f64 {
    let k = self.wavenumber;
    let a = self.amplitude * (-self.decay * t).exp() * k;
    let (sx, cx) = (k * x[0]).sin_cos();
    let (sy, cy) = (k * x[1]).sin_cos();
    a * a * (cx * cx * sy * sy + sx * sx * cy * cy)
  }
}

impl SourceTerm for DecayingSineMode {
  fn eval(&self, x: &Point, t: f64) -> f64 {
    let g = self.exact(x, t);
    let k2 = self.wavenumber * self.wavenumber;
    let eps2 = self.eps * self.eps;
    let diffusion = 4.0 * eps2 * k2 * k2 * g + 6.0 * k2 * g.powi(3)
      - 6.0 * g * self.grad_norm_sq(x, t)
      - 2.0 * k2 * g;
    -self.decay * g + self.gamma * diffusion
  }
}

#[cfg(test)]
mod test {
  use super::{source_at, DecayingSineMode, SourceTerm};
  use crate::{
    assemble::Coefficient,
    mesh::rectangle::RectangleMeshInfo,
    space::{Continuity, FeSpace},
    Point,
  };

  use approx::assert_relative_eq;
  use std::rc::Rc;

  fn laplace_fd<F: Fn(&Point) -> f64>(f: F, x: &Point, h: f64) -> f64 {
    let ex = Point::new(h, 0.0);
    let ey = Point::new(0.0, h);
    (f(&(x + ex)) + f(&(x - ex)) + f(&(x + ey)) + f(&(x - ey)) - 4.0 * f(x)) / (h * h)
  }

  #[test]
  fn source_matches_finite_differences() {
    let mode = DecayingSineMode::new(0.3, 0.7);
    let t = 0.4;
    let chem = |x: &Point| {
      let g = mode.exact(x, t);
      -mode.eps * mode.eps * laplace_fd(|y| mode.exact(y, t), x, 1e-3) + g * g * g - g
    };
    for x in [Point::new(0.3, 1.1), Point::new(-2.0, 0.5), Point::new(4.0, 7.0)] {
      let dt = 1e-5;
      let g_t = (mode.exact(&x, t + dt) - mode.exact(&x, t - dt)) / (2.0 * dt);
      let expected = g_t - mode.gamma * laplace_fd(chem, &x, 1e-2);
      assert_relative_eq!(mode.eval(&x, t), expected, epsilon = 1e-5);
    }
  }

  #[test]
  fn normal_derivative_vanishes_on_domain_boundary() {
    let mode = DecayingSineMode::new(0.1, 1.0);
    let h = 1e-6;
    for s in [-1.0, 0.3, 2.5] {
      for x0 in [-std::f64::consts::PI, 3.0 * std::f64::consts::PI] {
        let dn = (mode.exact(&Point::new(x0 + h, s), 0.0) - mode.exact(&Point::new(x0 - h, s), 0.0))
          / (2.0 * h);
        assert_relative_eq!(dn, 0.0, epsilon = 1e-9);
      }
    }
  }

  #[test]
  fn borrowed_source_is_frozen_at_given_time() {
    let mesh = Rc::new(RectangleMeshInfo::new_unit(2, 2).to_mesh().unwrap());
    let space = FeSpace::new(mesh, 2, Continuity::Continuous).unwrap();
    let mode = DecayingSineMode::new(0.1, 1.0);
    let dynamic: &dyn SourceTerm = &mode;
    let t = 0.3;
    let frozen = source_at(dynamic, t);
    for icell in 0..space.mesh().ncells() {
      let cell = space.cell_values(icell);
      for (value, x) in frozen.eval_cell(&cell).into_iter().zip(cell.points()) {
        assert_relative_eq!(value, mode.eval(x, t));
      }
    }
    let static_frozen = mode.at(t);
    let cell = space.cell_values(0);
    assert_eq!(static_frozen.eval_cell(&cell), frozen.eval_cell(&cell));
  }
}
