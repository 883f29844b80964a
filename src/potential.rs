//! The double-well bulk potential and its quadratization.

/// Double-well potential $F(phi) = 1/4 (phi^2 - 1)^2$ together with the
/// shift $B > 0$ of the auxiliary variable $U = sqrt(F(phi) + B)$.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleWell {
  shift: f64,
}

impl DoubleWell {
  pub fn new(shift: f64) -> Self {
    Self { shift }
  }
  pub fn shift(&self) -> f64 {
    self.shift
  }

  pub fn f(&self, phi: f64) -> f64 {
    let q = phi * phi - 1.0;
    0.25 * q * q
  }

  /// $F'(phi) = phi^3 - phi$
  pub fn df(&self, phi: f64) -> f64 {
    phi * phi * phi - phi
  }

  /// The argument $F(phi) + B$ of the square root.
  pub fn aux_arg(&self, phi: f64) -> f64 {
    self.f(phi) + self.shift
  }

  /// $U(phi) = sqrt(F(phi) + B)$
  pub fn aux(&self, phi: f64) -> f64 {
    self.aux_arg(phi).sqrt()
  }

  /// $H(phi) = F'(phi) / sqrt(F(phi) + B)$, so that $dU/dphi = H/2$.
  pub fn aux_derivative(&self, phi: f64) -> f64 {
    self.df(phi) / self.aux(phi)
  }

  /// $F'(phi)^2 / (F(phi) + B)$
  pub fn aux_derivative_sq(&self, phi: f64) -> f64 {
    let df = self.df(phi);
    df * df / self.aux_arg(phi)
  }
}
