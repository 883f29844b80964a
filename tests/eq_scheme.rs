use phasefield::{
  assemble::FieldCoefficient,
  diagnostics,
  function::{FeFunction, L2Projector},
  mesh::rectangle::{Diagonal, RectangleMeshInfo},
  params::{Discretization, Parameters, QuadraticCoefficient},
  scheme::Simulation,
  space::{Continuity, FeSpace},
  Error, Point,
};

use approx::assert_relative_eq;
use std::{f64::consts::PI, rc::Rc};

fn unit_square_space(n: usize, degree: usize, continuity: Continuity) -> Rc<FeSpace> {
  let mesh = RectangleMeshInfo::new_unit(n, n)
    .with_diagonal(Diagonal::RightLeft)
    .to_mesh()
    .unwrap();
  Rc::new(FeSpace::new(Rc::new(mesh), degree, continuity).unwrap())
}

/// A short spinodal run with a wider interface, so that coarse meshes resolve it.
fn coarse_spinodal(nsteps: usize, discretization: Discretization) -> Parameters {
  Parameters {
    final_time: 1e-3 * nsteps as f64,
    nsteps,
    eps: 0.05,
    gamma: 1.0,
    shift: 1.0,
    degree: 1,
    discretization,
    quadratic_coefficient: QuadraticCoefficient::SquaredH,
  }
}

fn run_spinodal(discretization: Discretization) -> Simulation {
  let params = coarse_spinodal(20, discretization);
  let space = unit_square_space(8, 1, params.continuity());
  let phi0 = FeFunction::random_uniform(space.clone(), 0.5, 1);
  let mut sim = Simulation::new(params, space, phi0).unwrap();
  sim.run().unwrap();
  sim
}

#[test]
fn modified_energy_decays_continuous() {
  let sim = run_spinodal(Discretization::Continuous);
  let e0 = sim.energies().samples()[0].modified;
  assert!(sim.energies().is_modified_non_increasing(1e-12 * e0));
  assert!(sim.energies().last().unwrap().modified < e0);
}

#[test]
fn modified_energy_decays_discontinuous() {
  let sim = run_spinodal(Discretization::Discontinuous { penalty: 10.0 });
  let e0 = sim.energies().samples()[0].modified;
  assert!(sim.energies().is_modified_non_increasing(1e-12 * e0));
  assert!(sim.energies().last().unwrap().modified < e0);
}

#[test]
fn modified_energy_decays_with_projected_coefficient() {
  let params = coarse_spinodal(10, Discretization::Continuous)
    .with_quadratic_coefficient(QuadraticCoefficient::Projected);
  let space = unit_square_space(8, 1, Continuity::Continuous);
  let phi0 = FeFunction::random_uniform(space.clone(), 0.1, 3);
  let mut sim = Simulation::new(params, space, phi0).unwrap();
  sim.run().unwrap();
  assert!(sim.aux().h2.is_some());
  let energies = sim.energies().modified();
  assert!(energies.last().unwrap() < &energies[0]);
}

#[test]
fn mass_is_conserved() {
  for discretization in [
    Discretization::Continuous,
    Discretization::Discontinuous { penalty: 10.0 },
  ] {
    let sim = run_spinodal(discretization);
    let m0 = sim.masses()[0];
    for &m in sim.masses() {
      assert_relative_eq!(m, m0, epsilon = 1e-11);
    }
  }
}

#[test]
fn zero_field_is_stationary() {
  let params = Parameters {
    final_time: 1e-3,
    nsteps: 1,
    eps: 0.01,
    gamma: 1.0,
    shift: 1.0,
    degree: 1,
    discretization: Discretization::Continuous,
    quadratic_coefficient: QuadraticCoefficient::SquaredH,
  };
  let mesh = Rc::new(RectangleMeshInfo::new_unit(4, 4).to_mesh().unwrap());
  let space = Rc::new(FeSpace::new(mesh, 1, Continuity::Continuous).unwrap());
  let phi0 = FeFunction::zero(space.clone());
  let mut sim = Simulation::new(params, space, phi0).unwrap();
  let report = sim.advance().unwrap();

  assert_eq!(report.step, 1);
  assert!(sim.phi().coeffs().amax() < 1e-14);
  let [before, after] = sim.energies().samples() else {
    panic!("expected two energy samples");
  };
  assert_relative_eq!(before.natural, 0.25, epsilon = 1e-12);
  assert_relative_eq!(before.modified, 1.25, epsilon = 1e-12);
  assert_relative_eq!(after.natural, before.natural, epsilon = 1e-12);
  assert_relative_eq!(after.modified, before.modified, epsilon = 1e-12);
}

#[test]
fn vanishing_shift_is_rejected() {
  let space = unit_square_space(2, 1, Continuity::Continuous);
  let phi0 = FeFunction::interpolate(space.clone(), |x| if x[0] < 0.5 { 1.0 } else { -1.0 });
  let params = Parameters {
    shift: 0.0,
    ..Parameters::spinodal()
  };
  assert!(matches!(
    Simulation::new(params, space, phi0),
    Err(Error::NonPositiveShift { .. })
  ));
}

#[test]
fn h_is_projection_of_current_field() {
  let params = coarse_spinodal(3, Discretization::Continuous);
  let space = unit_square_space(6, 1, Continuity::Continuous);
  let phi0 = FeFunction::random_uniform(space.clone(), 0.3, 5);
  let mut sim = Simulation::new(params, space.clone(), phi0).unwrap();
  sim.run().unwrap();

  let potential = params.potential();
  let projector = L2Projector::new(space).unwrap();
  let h = projector
    .project(FieldCoefficient::new(vec![sim.phi()], |v: &[f64], _: &Point| {
      potential.aux_derivative(v[0])
    }))
    .unwrap();
  assert_relative_eq!(sim.aux().h.coeffs(), h.coeffs(), epsilon = 1e-12);
}

/// $norm(U - P(sqrt(F(phi) + B)))_(L^2)$ at the final time.
fn auxiliary_deviation(nsteps: usize) -> f64 {
  let params = Parameters {
    final_time: 0.1,
    nsteps,
    eps: 0.05,
    gamma: 1.0,
    shift: 1.0,
    degree: 2,
    discretization: Discretization::Continuous,
    quadratic_coefficient: QuadraticCoefficient::SquaredH,
  };
  let space = unit_square_space(16, 2, Continuity::Continuous);
  let phi0 = FeFunction::interpolate(space.clone(), |x| 0.6 * (PI * x[0]).cos());
  let mut sim = Simulation::new(params, space.clone(), phi0).unwrap();
  sim.run().unwrap();

  let potential = params.potential();
  let projector = L2Projector::new(space.clone()).unwrap();
  let u = projector
    .project(FieldCoefficient::new(vec![sim.phi()], |v: &[f64], _: &Point| {
      potential.aux(v[0])
    }))
    .unwrap();
  let diff = FeFunction::new(space, sim.aux().u.coeffs() - u.coeffs());
  diff.integrate(|v, _| v * v).sqrt()
}

#[test]
fn auxiliary_deviation_shrinks_with_time_step() {
  let coarse = auxiliary_deviation(2);
  let fine = auxiliary_deviation(8);
  assert!(coarse > 0.0);
  assert!(fine < 0.5 * coarse, "coarse = {coarse:e}, fine = {fine:e}");
}

#[test]
fn spinodal_preset_runs_on_coarse_mesh() {
  let params = Parameters::spinodal().with_nsteps(5).with_final_time(5e-4);
  let space = unit_square_space(10, 1, Continuity::Continuous);
  let phi0 = FeFunction::random_uniform(space.clone(), 0.01, 1);
  let mut sim = Simulation::new(params, space, phi0).unwrap();
  sim.run().unwrap();
  let (min, max) = diagnostics::extrema(sim.phi());
  assert!(min >= -1.0 && max <= 1.0);
  assert!(sim.phi().is_finite());
}
