//! Discrete free energies recorded over a run.

/// Energies of one time level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
  /// $eps^2/2 a_h(phi, phi) + int F(phi)$
  pub natural: f64,
  /// $eps^2/2 a_h(phi, phi) + int U^2$, the energy the EQ scheme dissipates.
  pub modified: f64,
}

/// Append-only record with one sample per time level, starting at the initial state.
#[derive(Debug, Default, Clone)]
pub struct EnergyHistory {
  samples: Vec<EnergySample>,
}

impl EnergyHistory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, sample: EnergySample) {
    self.samples.push(sample);
  }

  pub fn samples(&self) -> &[EnergySample] {
    &self.samples
  }
  pub fn len(&self) -> usize {
    self.samples.len()
  }
  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }
  pub fn last(&self) -> Option<&EnergySample> {
    self.samples.last()
  }

  pub fn natural(&self) -> Vec<f64> {
    self.samples.iter().map(|s| s.natural).collect()
  }
  pub fn modified(&self) -> Vec<f64> {
    self.samples.iter().map(|s| s.modified).collect()
  }

  /// First time level at which the modified energy exceeds its predecessor by more than `tol`.
  pub fn first_increase(&self, tol: f64) -> Option<usize> {
    self
      .samples
      .windows(2)
      .position(|w| w[1].modified > w[0].modified + tol)
      .map(|i| i + 1)
  }

  pub fn is_modified_non_increasing(&self, tol: f64) -> bool {
    self.first_increase(tol).is_none()
  }

  /// The time levels $t_n = n T / N$ of the samples, assuming a uniform step.
  pub fn times(&self, final_time: f64) -> Vec<f64> {
    let nsteps = self.samples.len().saturating_sub(1).max(1);
    (0..self.samples.len())
      .map(|i| final_time * i as f64 / nsteps as f64)
      .collect()
  }

  /// Whitespace separated table with the columns `t`, natural and modified energy.
  pub fn to_table(&self, final_time: f64) -> String {
    let mut table = String::from("# t E E_EQ\n");
    for (t, s) in self.times(final_time).iter().zip(&self.samples) {
      table.push_str(&format!(
        "{t:.6e} {:.12e} {:.12e}\n",
        s.natural, s.modified
      ));
    }
    table
  }
}
