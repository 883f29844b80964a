use crate::Point;

/// Affine geometry of a triangle cell.
///
/// The reference triangle has vertices $(0,0)$, $(1,0)$, $(0,1)$ and is mapped
/// by $x = v_0 + J xi$ with $J = [v_1 - v_0, v_2 - v_0]$.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleGeometry {
  vertices: [Point; 3],
  jacobian: na::Matrix2<f64>,
  det: f64,
}
impl TriangleGeometry {
  pub fn new(vertices: [Point; 3]) -> Self {
    let jacobian = na::Matrix2::from_columns(&[vertices[1] - vertices[0], vertices[2] - vertices[0]]);
    let det = jacobian.determinant();
    Self {
      vertices,
      jacobian,
      det,
    }
  }

  pub fn new_ref() -> Self {
    Self::new([Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)])
  }

  pub fn vertices(&self) -> &[Point; 3] {
    &self.vertices
  }
  pub fn jacobian(&self) -> &na::Matrix2<f64> {
    &self.jacobian
  }

  /// The determinant (twice the signed area) of the reference map.
  pub fn det(&self) -> f64 {
    self.det
  }

  /// The (unsigned) area of the triangle.
  pub fn vol(&self) -> f64 {
    0.5 * self.det.abs()
  }

  /// The diameter of the triangle, which is its longest edge.
  pub fn diameter(&self) -> f64 {
    let [a, b, c] = &self.vertices;
    (b - a).norm().max((c - b).norm()).max((a - c).norm())
  }

  pub fn centroid(&self) -> Point {
    (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
  }

  pub fn to_physical(&self, xi: &Point) -> Point {
    self.vertices[0] + self.jacobian * xi
  }

  pub fn to_reference(&self, x: &Point) -> Point {
    // Cramer's rule, the cell is assumed non-degenerate.
    let d = x - self.vertices[0];
    let j = &self.jacobian;
    Point::new(
      (j[(1, 1)] * d[0] - j[(0, 1)] * d[1]) / self.det,
      (-j[(1, 0)] * d[0] + j[(0, 0)] * d[1]) / self.det,
    )
  }

  /// $J^(-T)$, which maps reference gradients to physical gradients.
  pub fn inv_jacobian_transpose(&self) -> na::Matrix2<f64> {
    let j = &self.jacobian;
    na::Matrix2::new(j[(1, 1)], -j[(1, 0)], -j[(0, 1)], j[(0, 0)]) / self.det
  }
}

/// Geometry of an edge seen from one of its adjacent cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetGeometry {
  a: Point,
  b: Point,
  normal: Point,
}
impl FacetGeometry {
  /// Edge from `a` to `b` with normal pointing away from `cell`.
  pub fn new(a: Point, b: Point, cell: &TriangleGeometry) -> Self {
    let t = b - a;
    let mut normal = Point::new(t[1], -t[0]).normalize();
    let midpoint = 0.5 * (a + b);
    if (midpoint - cell.centroid()).dot(&normal) < 0.0 {
      normal = -normal;
    }
    Self { a, b, normal }
  }

  pub fn length(&self) -> f64 {
    (self.b - self.a).norm()
  }
  pub fn normal(&self) -> &Point {
    &self.normal
  }

  /// Point at parameter $s in [0,1]$ along the edge.
  pub fn point(&self, s: f64) -> Point {
    self.a + s * (self.b - self.a)
  }
}
