//! The Invariant Energy Quadratization (EQ) time stepping of the Cahn-Hilliard equation.
//!
//! The bulk energy is rewritten with the auxiliary variable $U = sqrt(F(phi) + B)$,
//! which turns every step into one linear mixed (phi, w) problem.
//! After the solve, `U` is advanced by its linearization
//! $U_(n+1) = U_n + P(1/2 H_n (phi_(n+1) - phi_n))$
//! with $H = F'(phi) / sqrt(F(phi) + B)$ and $P$ the $L^2$ projection.
//! Then `H` (and `H2`) are recomputed from the new phase field.

use crate::{
  assemble::{Coefficient, FieldCoefficient},
  diagnostics,
  energy::{EnergyHistory, EnergySample},
  error::LinalgError,
  form::{FormBuilder, FormInputs, WeakFormStrategy},
  function::{FeFunction, L2Projector},
  manufactured::{self, SourceTerm},
  params::{Parameters, QuadraticCoefficient},
  potential::DoubleWell,
  space::FeSpace,
  Error, Point, Result,
};

use std::rc::Rc;

/// Lower bound on $F(phi_0) + B$ below which `U` is considered degenerate.
pub const MIN_AUX_ARG: f64 = 1e-10;

/// Auxiliary fields of the quadratization.
#[derive(Debug, Clone)]
pub struct AuxiliaryState {
  /// $U approx sqrt(F(phi) + B)$, advanced by the linear update.
  pub u: FeFunction,
  /// $H = P(F'(phi) / sqrt(F(phi) + B))$
  pub h: FeFunction,
  /// $H_2 = P(F'(phi)^2 / (F(phi) + B))$, only kept for [`QuadraticCoefficient::Projected`].
  pub h2: Option<FeFunction>,
}

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
  pub step: usize,
  pub time: f64,
  pub mass: f64,
  pub energy: EnergySample,
}

/// A Cahn-Hilliard run: owns the phase field, the auxiliary state and the energy record.
pub struct Simulation {
  params: Parameters,
  potential: DoubleWell,
  strategy: Box<dyn WeakFormStrategy>,
  builder: FormBuilder,
  projector: L2Projector,
  source: Option<Box<dyn SourceTerm>>,

  phi: FeFunction,
  aux: AuxiliaryState,
  step: usize,
  time: f64,
  energies: EnergyHistory,
  masses: Vec<f64>,
}

impl Simulation {
  /// Sets up the run and records the initial energies.
  ///
  /// Fails on invalid parameters, on a space that does not fit the discretization
  /// and on a degenerate auxiliary variable.
  pub fn new(params: Parameters, space: Rc<FeSpace>, phi0: FeFunction) -> Result<Self> {
    params.validate()?;

    let strategy = params.strategy();
    if space.continuity() != strategy.continuity() {
      return Err(Error::IncompatibleSpace {
        scheme: strategy.name(),
        expected: strategy.continuity(),
        actual: space.continuity(),
      });
    }
    if space.degree() != params.degree {
      return Err(Error::DegreeMismatch {
        expected: params.degree,
        actual: space.degree(),
      });
    }
    if phi0.coeffs().len() != space.ndofs() {
      return Err(Error::DimensionMismatch {
        expected: space.ndofs(),
        actual: phi0.coeffs().len(),
      });
    }
    let phi = FeFunction::new(space.clone(), phi0.into_coeffs());

    let potential = params.potential();
    let degenerate = phi
      .coeffs()
      .iter()
      .map(|&v| potential.aux_arg(v))
      .enumerate()
      .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((dof, min)) = degenerate {
      if min < MIN_AUX_ARG {
        return Err(Error::DegenerateAuxiliary { min, dof });
      }
    }

    let init_err = |source| Error::Solver { step: 0, source };
    let projector = L2Projector::new(space.clone()).map_err(init_err)?;
    let u = projector
      .project(FieldCoefficient::new(vec![&phi], move |v: &[f64], _: &Point| {
        potential.aux(v[0])
      }))
      .map_err(init_err)?;
    let (h, h2) = derivative_fields(&projector, potential, params.quadratic_coefficient, &phi)
      .map_err(init_err)?;
    for (field, name) in [(&u, "U"), (&h, "H")] {
      if !field.is_finite() {
        return Err(Error::NonFinite { step: 0, field: name });
      }
    }

    let builder = FormBuilder::new(space, strategy.as_ref());

    let mut this = Self {
      params,
      potential,
      strategy,
      builder,
      projector,
      source: None,
      phi,
      aux: AuxiliaryState { u, h, h2 },
      step: 0,
      time: 0.0,
      energies: EnergyHistory::new(),
      masses: Vec::new(),
    };

    let summary = diagnostics::FieldSummary::of(&this.phi);
    let energy = this.energy();
    this.energies.push(energy);
    this.masses.push(summary.mass);
    tracing::info!(
      "{} with {} dofs, h = {:.4e}, dt = {:.4e}",
      this.strategy.name(),
      this.phi.space().ndofs(),
      this.phi.space().mesh().mesh_width(),
      this.params.dt()
    );
    tracing::info!(
      "initial state: max = {:.6}, min = {:.6}, mass = {:.6e}, E = {:.8e}, E_EQ = {:.8e}",
      summary.max,
      summary.min,
      summary.mass,
      energy.natural,
      energy.modified
    );

    Ok(this)
  }

  /// Adds the source $s(x, t)$ to the phase equation, evaluated at the new time level.
  pub fn with_source(mut self, source: impl SourceTerm + 'static) -> Self {
    self.source = Some(Box::new(source));
    self
  }

  /// Performs one step $t_n -> t_(n+1)$.
  pub fn advance(&mut self) -> Result<StepReport> {
    let step = self.step + 1;
    let time = step as f64 * self.params.dt();
    let solver_err = |source| Error::Solver { step, source };

    let phi_new = self.solve_mixed(time).map_err(solver_err)?;
    let phi_new = FeFunction::new(self.phi.space().clone(), phi_new);

    let increment = self
      .projector
      .project(FieldCoefficient::new(
        vec![&self.aux.h, &phi_new, &self.phi],
        |v: &[f64], _: &Point| 0.5 * v[0] * (v[1] - v[2]),
      ))
      .map_err(solver_err)?;
    *self.aux.u.coeffs_mut() += increment.coeffs();
    self.phi = phi_new;

    let (h, h2) = derivative_fields(
      &self.projector,
      self.potential,
      self.params.quadratic_coefficient,
      &self.phi,
    )
    .map_err(solver_err)?;
    self.aux.h = h;
    self.aux.h2 = h2;

    if !self.phi.is_finite() {
      return Err(Error::NonFinite { step, field: "phi" });
    }
    if !self.aux.u.is_finite() {
      return Err(Error::NonFinite { step, field: "U" });
    }
    if !self.aux.h.is_finite() {
      return Err(Error::NonFinite { step, field: "H" });
    }

    self.step = step;
    self.time = time;

    let energy = self.energy();
    let mass = diagnostics::mass(&self.phi);
    if let Some(prev) = self.energies.last() {
      if energy.modified > prev.modified {
        tracing::warn!(
          "modified energy increased at step {step}: {:.8e} -> {:.8e}",
          prev.modified,
          energy.modified
        );
      }
    }
    self.energies.push(energy);
    self.masses.push(mass);

    tracing::info!(
      "step {step}/{} t = {time:.4}: mass = {mass:.6e}, E = {:.8e}, E_EQ = {:.8e}",
      self.params.nsteps,
      energy.natural,
      energy.modified
    );

    Ok(StepReport {
      step,
      time,
      mass,
      energy,
    })
  }

  /// Advances until the final time is reached.
  pub fn run(&mut self) -> Result<()> {
    while !self.is_finished() {
      self.advance()?;
    }
    Ok(())
  }

  fn solve_mixed(&self, time: f64) -> std::result::Result<na::DVector<f64>, LinalgError> {
    let squared_h;
    let projected_h2;
    let h2: &dyn Coefficient = match &self.aux.h2 {
      Some(h2) => {
        projected_h2 = FieldCoefficient::new(vec![h2], |v: &[f64], _: &Point| v[0]);
        &projected_h2
      }
      None => {
        squared_h = FieldCoefficient::new(vec![&self.aux.h], |v: &[f64], _: &Point| v[0] * v[0]);
        &squared_h
      }
    };
    let source = self
      .source
      .as_deref()
      .map(|source| manufactured::source_at(source, time));

    let system = self.builder.build(&FormInputs {
      phi: &self.phi,
      u: &self.aux.u,
      h: &self.aux.h,
      h2,
      source: source.as_ref().map(|s| s as &dyn Coefficient),
      dt: self.params.dt(),
      eps: self.params.eps,
      gamma: self.params.gamma,
    });
    let (phi, _w) = system.solve()?;
    Ok(phi)
  }

  /// Natural and modified energy of the current state.
  pub fn energy(&self) -> EnergySample {
    let eps = self.params.eps;
    let gradient = 0.5 * eps * eps * self.builder.gradient_energy(self.phi.coeffs());
    let potential = self.potential;
    EnergySample {
      natural: gradient + self.phi.integrate(|v, _| potential.f(v)),
      modified: gradient + self.aux.u.integrate(|v, _| v * v),
    }
  }
}

// getters
impl Simulation {
  pub fn params(&self) -> &Parameters {
    &self.params
  }
  pub fn scheme_name(&self) -> &'static str {
    self.strategy.name()
  }
  pub fn space(&self) -> &Rc<FeSpace> {
    self.phi.space()
  }
  pub fn phi(&self) -> &FeFunction {
    &self.phi
  }
  pub fn aux(&self) -> &AuxiliaryState {
    &self.aux
  }
  pub fn step(&self) -> usize {
    self.step
  }
  pub fn time(&self) -> f64 {
    self.time
  }
  pub fn is_finished(&self) -> bool {
    self.step >= self.params.nsteps
  }
  pub fn energies(&self) -> &EnergyHistory {
    &self.energies
  }
  /// $int phi$ at every time level.
  pub fn masses(&self) -> &[f64] {
    &self.masses
  }
}

/// Projections of `H` and, if requested, of $F'^2 / (F + B)$.
fn derivative_fields(
  projector: &L2Projector,
  potential: DoubleWell,
  mode: QuadraticCoefficient,
  phi: &FeFunction,
) -> std::result::Result<(FeFunction, Option<FeFunction>), LinalgError> {
  let h = projector.project(FieldCoefficient::new(vec![phi], move |v: &[f64], _: &Point| {
    potential.aux_derivative(v[0])
  }))?;
  let h2 = match mode {
    QuadraticCoefficient::SquaredH => None,
    QuadraticCoefficient::Projected => Some(projector.project(FieldCoefficient::new(
      vec![phi],
      move |v: &[f64], _: &Point| potential.aux_derivative_sq(v[0]),
    ))?),
  };
  Ok((h, h2))
}
