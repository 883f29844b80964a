//! Lagrangian finite elements on the reference triangle.

use crate::{Error, Point, Result};

/// Gradients of the reference barycentric coordinate functions
/// $lambda_0 = 1 - x - y$, $lambda_1 = x$, $lambda_2 = y$.
const REF_DIFBARYS: [[f64; 2]; 3] = [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]];

pub fn ref_barys(x: &Point) -> [f64; 3] {
  [1.0 - x[0] - x[1], x[0], x[1]]
}

/// Scalar Lagrange element of degree 1 or 2 on the reference triangle.
///
/// Local dofs are ordered as: the three vertices, then (for degree 2) the
/// three edge midpoints, where edge $k$ is opposite of vertex $k$.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeElement {
  degree: usize,
  nodes: Vec<Point>,
}
impl LagrangeElement {
  pub fn new(degree: usize) -> Result<Self> {
    let vertices = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
    let nodes = match degree {
      1 => vertices.to_vec(),
      2 => {
        let mut nodes = vertices.to_vec();
        for k in 0..3 {
          nodes.push(0.5 * (vertices[(k + 1) % 3] + vertices[(k + 2) % 3]));
        }
        nodes
      }
      _ => return Err(Error::UnsupportedDegree(degree)),
    };
    Ok(Self { degree, nodes })
  }

  pub fn degree(&self) -> usize {
    self.degree
  }
  pub fn ndofs(&self) -> usize {
    self.nodes.len()
  }
  /// Interpolation nodes in reference coordinates.
  pub fn nodes(&self) -> &[Point] {
    &self.nodes
  }

  /// Values of all shape functions at reference point `x`.
  pub fn eval_basis(&self, x: &Point) -> na::DVector<f64> {
    let l = ref_barys(x);
    match self.degree {
      1 => na::DVector::from_row_slice(&l),
      _ => {
        let mut values = na::DVector::zeros(6);
        for i in 0..3 {
          values[i] = l[i] * (2.0 * l[i] - 1.0);
          values[3 + i] = 4.0 * l[(i + 1) % 3] * l[(i + 2) % 3];
        }
        values
      }
    }
  }

  /// Reference gradients of all shape functions at reference point `x`.
  ///
  /// Column $i$ holds the gradient of shape function $i$.
  pub fn eval_ref_grads(&self, x: &Point) -> na::Matrix2xX<f64> {
    let difbary = |i: usize| Point::new(REF_DIFBARYS[i][0], REF_DIFBARYS[i][1]);
    match self.degree {
      1 => na::Matrix2xX::from_columns(&[difbary(0), difbary(1), difbary(2)]),
      _ => {
        let l = ref_barys(x);
        let mut grads = na::Matrix2xX::zeros(6);
        for i in 0..3 {
          let j = (i + 1) % 3;
          let k = (i + 2) % 3;
          grads.set_column(i, &((4.0 * l[i] - 1.0) * difbary(i)));
          grads.set_column(3 + i, &(4.0 * (l[j] * difbary(k) + l[k] * difbary(j))));
        }
        grads
      }
    }
  }
}
