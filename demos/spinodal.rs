//! Spinodal decomposition of a randomly perturbed mixture with conforming P1 elements.
//!
//! Writes the energies and snapshots of the phase field to `out/`.

use phasefield::{
  diagnostics, function::FeFunction, io, params::Experiment, scheme::Simulation,
};

fn main() {
  tracing_subscriber::fmt::init();

  let experiment = Experiment::spinodal();
  let params = experiment.params;
  let space = experiment.build_space().unwrap();

  let phi0 = FeFunction::random_uniform(space.clone(), 0.01, 1);
  let mut sim = Simulation::new(params, space, phi0).unwrap();

  std::fs::create_dir_all("out").unwrap();
  let snapshots = io::snapshot_steps(params.nsteps);

  while !sim.is_finished() {
    let report = sim.advance().unwrap();
    if snapshots.contains(&report.step) {
      let name = io::snapshot_name(sim.scheme_name(), params.nsteps, report.time);
      io::save_field(format!("out/{name}.txt"), sim.phi()).unwrap();
    }
  }

  let (min, max) = diagnostics::extrema(sim.phi());
  println!("final: min = {min:.6}, max = {max:.6}, mass = {:.6e}", diagnostics::mass(sim.phi()));

  let name = format!("{}_nt-{}_energy", sim.scheme_name(), params.nsteps);
  io::write_energy_table(format!("out/{name}.txt"), sim.energies(), params.final_time).unwrap();
}
