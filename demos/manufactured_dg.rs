//! Interior penalty P2 discretization of a decaying sine mode driven by its source term.
//!
//! Prints the final L2 and L-infinity errors against the exact solution.

use phasefield::{
  diagnostics, function::FeFunction, io, manufactured::DecayingSineMode, params::Experiment,
  scheme::Simulation,
};

fn main() {
  tracing_subscriber::fmt::init();

  let mut experiment = Experiment::manufactured();
  // the full 155x155 grid of the reference run takes a while
  if std::env::args().all(|arg| arg != "--full") {
    experiment.mesh = experiment.mesh.with_resolution(40, 40);
  }
  let params = experiment.params;
  let space = experiment.build_space().unwrap();
  println!("h = {:.6}", space.mesh().mesh_width());

  let mode = DecayingSineMode::new(params.eps, params.gamma);
  let phi0 = FeFunction::interpolate(space.clone(), |x| mode.exact(x, 0.0));
  let mut sim = Simulation::new(params, space, phi0)
    .unwrap()
    .with_source(mode);
  sim.run().unwrap();

  let exact = |x: &phasefield::Point| mode.exact(x, params.final_time);
  println!("L2 error = {:.5e}", diagnostics::l2_error(sim.phi(), exact));
  println!("Linf error = {:.5e}", diagnostics::linf_error(sim.phi(), exact));

  std::fs::create_dir_all("out").unwrap();
  let name = io::snapshot_name(sim.scheme_name(), params.nsteps, sim.time());
  io::save_field(format!("out/{name}.txt"), sim.phi()).unwrap();
  let name = format!("{}_nt-{}_energy", sim.scheme_name(), params.nsteps);
  io::write_energy_table(format!("out/{name}.txt"), sim.energies(), params.final_time).unwrap();
}
