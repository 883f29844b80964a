//! Plain text output of energy tables and phase field snapshots.

use crate::{energy::EnergyHistory, function::FeFunction};

use std::{
  fs::File,
  io::{self, BufWriter, Write},
  path::Path,
};

/// `<scheme>_nt-<nsteps>_t-<time>` with the time printed to four decimals.
pub fn snapshot_name(scheme: &str, nsteps: usize, time: f64) -> String {
  format!("{scheme}_nt-{nsteps}_t-{time:.4}")
}

/// Steps after which a snapshot is taken: an early one, the middle and the end.
pub fn snapshot_steps(nsteps: usize) -> Vec<usize> {
  let mut steps = vec![5.min(nsteps), nsteps / 2, nsteps];
  steps.retain(|&s| s > 0);
  steps.sort_unstable();
  steps.dedup();
  steps
}

pub fn write_energy_table(
  path: impl AsRef<Path>,
  history: &EnergyHistory,
  final_time: f64,
) -> io::Result<()> {
  let mut file = BufWriter::new(File::create(path)?);
  file.write_all(history.to_table(final_time).as_bytes())?;
  file.flush()
}

/// One line `x y value` per dof.
pub fn write_field<W: Write>(mut writer: W, phi: &FeFunction) -> io::Result<()> {
  writeln!(writer, "# x y phi")?;
  let coords = phi.space().dof_handler().dof_coords();
  for (x, v) in coords.iter().zip(phi.coeffs().iter()) {
    writeln!(writer, "{:.8e} {:.8e} {:.12e}", x[0], x[1], v)?;
  }
  Ok(())
}

pub fn save_field(path: impl AsRef<Path>, phi: &FeFunction) -> io::Result<()> {
  let mut file = BufWriter::new(File::create(path)?);
  write_field(&mut file, phi)?;
  file.flush()
}
