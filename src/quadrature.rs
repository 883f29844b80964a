//! Gauss quadrature on the unit interval and the reference triangle.

use crate::Point;

use std::f64::consts::PI;

/// Gauss-Legendre nodes and weights on $[0,1]$.
///
/// Exact for polynomials of degree $2 n - 1$.
pub fn gauss_legendre(npoints: usize) -> (Vec<f64>, Vec<f64>) {
  assert!(npoints > 0);

  let n = npoints;
  let mut nodes = vec![0.0; n];
  let mut weights = vec![0.0; n];

  // Newton iteration on $P_n$ for the nodes on $[-1,1]$, starting from the Chebyshev guess.
  for i in 0..(n + 1) / 2 {
    let mut z = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
    for _ in 0..100 {
      let (p, dp) = legendre_with_derivative(n, z);
      let dz = p / dp;
      z -= dz;
      if dz.abs() < 1e-15 {
        break;
      }
    }
    let (_, dp) = legendre_with_derivative(n, z);

    let w = 2.0 / ((1.0 - z * z) * dp * dp);
    nodes[i] = 0.5 * (1.0 - z);
    nodes[n - 1 - i] = 0.5 * (1.0 + z);
    weights[i] = 0.5 * w;
    weights[n - 1 - i] = 0.5 * w;
  }

  (nodes, weights)
}

/// Returns $(P_n(z), P_n'(z))$ using the three term recurrence.
fn legendre_with_derivative(n: usize, z: f64) -> (f64, f64) {
  let mut p0 = 1.0;
  let mut p1 = 0.0;
  for j in 0..n {
    let p2 = p1;
    p1 = p0;
    let j = j as f64;
    p0 = ((2.0 * j + 1.0) * z * p1 - j * p2) / (j + 1.0);
  }
  let dp = n as f64 * (z * p0 - p1) / (z * z - 1.0);
  (p0, dp)
}

/// A quadrature rule on the unit interval $[0,1]$.
#[derive(Debug, Clone)]
pub struct QuadRule1d {
  nodes: Vec<f64>,
  weights: Vec<f64>,
}
impl QuadRule1d {
  /// Gauss rule exact up to polynomial degree `degree`.
  pub fn gauss(degree: usize) -> Self {
    let (nodes, weights) = gauss_legendre(degree / 2 + 1);
    Self { nodes, weights }
  }

  pub fn npoints(&self) -> usize {
    self.nodes.len()
  }
  pub fn nodes(&self) -> &[f64] {
    &self.nodes
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }

  pub fn apply<F>(&self, f: F) -> f64
  where
    F: Fn(f64) -> f64,
  {
    self
      .nodes
      .iter()
      .zip(self.weights.iter())
      .map(|(&x, w)| w * f(x))
      .sum()
  }
}

/// A quadrature rule defined on the reference triangle with vertices
/// $(0,0)$, $(1,0)$, $(0,1)$.
///
/// Obtained from a tensor Gauss rule on the unit square through the collapsed
/// (Duffy) map $(u,v) |-> (u, v (1-u))$.
#[derive(Debug, Clone)]
pub struct QuadRule {
  nodes: Vec<Point>,
  weights: Vec<f64>,
}
impl QuadRule {
  /// Rule exact for all bivariate polynomials of total degree `degree`.
  pub fn triangle(degree: usize) -> Self {
    // The Jacobian $1-u$ raises the degree in $u$ by one.
    let npoints = (degree + 3) / 2;
    let (xs, ws) = gauss_legendre(npoints);

    let mut nodes = Vec::with_capacity(npoints * npoints);
    let mut weights = Vec::with_capacity(npoints * npoints);
    for (&u, &wu) in xs.iter().zip(ws.iter()) {
      for (&v, &wv) in xs.iter().zip(ws.iter()) {
        nodes.push(Point::new(u, v * (1.0 - u)));
        weights.push(wu * wv * (1.0 - u));
      }
    }
    Self { nodes, weights }
  }

  pub fn npoints(&self) -> usize {
    self.nodes.len()
  }
  pub fn nodes(&self) -> &[Point] {
    &self.nodes
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }

  pub fn apply_ref<F>(&self, f: F) -> f64
  where
    F: Fn(&Point) -> f64,
  {
    self
      .nodes
      .iter()
      .zip(self.weights.iter())
      .map(|(n, w)| w * f(n))
      .sum()
  }
}
