//! Mesh refinement study for the manufactured solution.

use phasefield::{
  diagnostics,
  function::FeFunction,
  manufactured::DecayingSineMode,
  params::{Discretization, Experiment},
  scheme::Simulation,
};

fn main() {
  tracing_subscriber::fmt::init();

  for (discretization, degree) in [
    (Discretization::Continuous, 1),
    (Discretization::Discontinuous { penalty: 10.0 }, 1),
    (Discretization::Discontinuous { penalty: 10.0 }, 2),
  ] {
    let mut widths = Vec::new();
    let mut errors = Vec::new();
    for n in [4, 8, 16, 32] {
      let mut experiment = Experiment::manufactured();
      experiment.params.discretization = discretization;
      experiment.params.degree = degree;
      experiment.params = experiment.params.with_nsteps(400);
      experiment.mesh = experiment.mesh.with_resolution(n, n);

      let params = experiment.params;
      let space = experiment.build_space().unwrap();
      let mode = DecayingSineMode::new(params.eps, params.gamma);
      let phi0 = FeFunction::interpolate(space.clone(), |x| mode.exact(x, 0.0));
      let mut sim = Simulation::new(params, space.clone(), phi0)
        .unwrap()
        .with_source(mode);
      sim.run().unwrap();

      widths.push(space.mesh().mesh_width());
      errors.push(diagnostics::l2_error(sim.phi(), |x| {
        mode.exact(x, params.final_time)
      }));
    }

    let rates = diagnostics::convergence_rates(&widths, &errors);
    println!("{discretization:?} P{degree}");
    for (i, (h, e)) in widths.iter().zip(&errors).enumerate() {
      let rate = i.checked_sub(1).map(|j| rates[j]);
      match rate {
        Some(rate) => println!("  h = {h:.4e}  L2 = {e:.4e}  rate = {rate:.2}"),
        None => println!("  h = {h:.4e}  L2 = {e:.4e}"),
      }
    }
  }
}
