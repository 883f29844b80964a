//! Run configuration of the EQ scheme.

use crate::{
  form::{ContinuousGalerkin, DiscontinuousGalerkin, WeakFormStrategy},
  mesh::rectangle::{Diagonal, RectangleMeshInfo},
  potential::DoubleWell,
  space::{Continuity, FeSpace},
  Error, Point, Result,
};

use std::{f64::consts::PI, rc::Rc};

/// Spatial discretization of the mixed system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discretization {
  /// Conforming finite elements.
  Continuous,
  /// Symmetric interior penalty with penalty parameter `penalty`.
  Discontinuous { penalty: f64 },
}

/// How the coefficient `H2` of the implicit stabilization term is obtained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QuadraticCoefficient {
  /// `H^2` evaluated pointwise from the discrete `H`.
  /// The modified energy then decays unconditionally.
  #[default]
  SquaredH,
  /// $L^2$ projection of $F'(phi)^2 / (F(phi) + B)$.
  Projected,
}

/// Immutable scalar parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
  /// Final time `T`.
  pub final_time: f64,
  pub nsteps: usize,
  /// Interface width `eps`.
  pub eps: f64,
  /// Mobility `gamma`.
  pub gamma: f64,
  /// Quadratization shift `B`.
  pub shift: f64,
  pub degree: usize,
  pub discretization: Discretization,
  pub quadratic_coefficient: QuadraticCoefficient,
}

impl Parameters {
  /// Spinodal decomposition with conforming P1 elements.
  pub fn spinodal() -> Self {
    Self {
      final_time: 0.05,
      nsteps: 500,
      eps: 0.01,
      gamma: 1.0,
      shift: 1.0,
      degree: 1,
      discretization: Discretization::Continuous,
      quadratic_coefficient: QuadraticCoefficient::SquaredH,
    }
  }

  /// Manufactured solution test with interior penalty P2 elements.
  pub fn manufactured() -> Self {
    Self {
      final_time: 0.1,
      nsteps: 200,
      eps: 0.1,
      gamma: 1.0,
      shift: 1.0,
      degree: 2,
      discretization: Discretization::Discontinuous { penalty: 10.0 },
      quadratic_coefficient: QuadraticCoefficient::SquaredH,
    }
  }

  pub fn with_nsteps(mut self, nsteps: usize) -> Self {
    self.nsteps = nsteps;
    self
  }
  pub fn with_final_time(mut self, final_time: f64) -> Self {
    self.final_time = final_time;
    self
  }
  pub fn with_discretization(mut self, discretization: Discretization) -> Self {
    self.discretization = discretization;
    self
  }
  pub fn with_quadratic_coefficient(mut self, quadratic_coefficient: QuadraticCoefficient) -> Self {
    self.quadratic_coefficient = quadratic_coefficient;
    self
  }

  /// Uniform time step `T / nsteps`.
  pub fn dt(&self) -> f64 {
    self.final_time / self.nsteps as f64
  }

  pub fn potential(&self) -> DoubleWell {
    DoubleWell::new(self.shift)
  }

  pub fn continuity(&self) -> Continuity {
    match self.discretization {
      Discretization::Continuous => Continuity::Continuous,
      Discretization::Discontinuous { .. } => Continuity::Discontinuous,
    }
  }

  pub fn strategy(&self) -> Box<dyn WeakFormStrategy> {
    match self.discretization {
      Discretization::Continuous => Box::new(ContinuousGalerkin),
      Discretization::Discontinuous { penalty } => Box::new(DiscontinuousGalerkin::new(penalty)),
    }
  }

  pub fn validate(&self) -> Result<()> {
    if !(self.shift.is_finite() && self.shift > 0.0) {
      return Err(Error::NonPositiveShift { shift: self.shift });
    }
    positive("final_time", self.final_time)?;
    positive("eps", self.eps)?;
    positive("gamma", self.gamma)?;
    if self.nsteps == 0 {
      return Err(Error::InvalidParameter {
        name: "nsteps",
        value: 0.0,
        reason: "at least one step is required",
      });
    }
    if let Discretization::Discontinuous { penalty } = self.discretization {
      positive("penalty", penalty)?;
    }
    if !(1..=2).contains(&self.degree) {
      return Err(Error::UnsupportedDegree(self.degree));
    }
    Ok(())
  }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
  if value.is_finite() && value > 0.0 {
    Ok(())
  } else {
    Err(Error::InvalidParameter {
      name,
      value,
      reason: "must be finite and strictly positive",
    })
  }
}

/// A full run setup: scheme parameters together with the domain.
#[derive(Debug, Clone)]
pub struct Experiment {
  pub params: Parameters,
  pub mesh: RectangleMeshInfo,
}

impl Experiment {
  /// Random perturbation of the mixed state on the unit square, 100x100 cells.
  pub fn spinodal() -> Self {
    Self {
      params: Parameters::spinodal(),
      mesh: RectangleMeshInfo::new_unit(100, 100),
    }
  }

  /// Decaying sine mode on $[-pi, 3pi]^2$, 155x155 cells with alternating diagonals.
  pub fn manufactured() -> Self {
    let mesh = RectangleMeshInfo::new(Point::new(-PI, -PI), Point::new(3.0 * PI, 3.0 * PI), 155, 155)
      .with_diagonal(Diagonal::RightLeft);
    Self {
      params: Parameters::manufactured(),
      mesh,
    }
  }

  /// Triangulates the domain and sets up the space matching the discretization.
  pub fn build_space(&self) -> Result<Rc<FeSpace>> {
    let mesh = Rc::new(self.mesh.to_mesh()?);
    let space = FeSpace::new(mesh, self.params.degree, self.params.continuity())?;
    Ok(Rc::new(space))
  }
}

#[cfg(test)]
mod test {
  use super::{Discretization, Parameters};
  use crate::Error;

  use approx::assert_relative_eq;

  #[test]
  fn presets_are_valid() {
    for params in [Parameters::spinodal(), Parameters::manufactured()] {
      params.validate().unwrap();
    }
    assert_relative_eq!(Parameters::spinodal().dt(), 1e-4, epsilon = 1e-16);
    assert_relative_eq!(Parameters::manufactured().dt(), 5e-4, epsilon = 1e-16);
  }

  #[test]
  fn rejects_non_positive_shift() {
    for shift in [0.0, -1.0, f64::NAN, f64::INFINITY] {
      let params = Parameters {
        shift,
        ..Parameters::spinodal()
      };
      assert!(matches!(params.validate(), Err(Error::NonPositiveShift { .. })));
    }
  }

  #[test]
  fn rejects_invalid_scalars() {
    let base = Parameters::spinodal();
    let invalid = [
      Parameters { eps: 0.0, ..base },
      Parameters { gamma: -1.0, ..base },
      Parameters { final_time: f64::NAN, ..base },
      Parameters { nsteps: 0, ..base },
      base.with_discretization(Discretization::Discontinuous { penalty: 0.0 }),
    ];
    for params in invalid {
      assert!(matches!(
        params.validate(),
        Err(Error::InvalidParameter { .. })
      ));
    }
    let params = Parameters { degree: 3, ..base };
    assert!(matches!(params.validate(), Err(Error::UnsupportedDegree(3))));
  }
}
