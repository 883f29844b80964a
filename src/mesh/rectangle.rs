use super::{TriangleMesh, VertexIdx};
use crate::{Error, Point, Result};

/// Direction of the diagonal splitting each rectangle into two triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Diagonal {
  /// From the lower left to the upper right corner.
  #[default]
  Right,
  /// From the lower right to the upper left corner.
  Left,
  /// Alternating between `Right` and `Left` in a checkerboard pattern.
  RightLeft,
}

/// Structured triangulation of an axis aligned rectangle.
#[derive(Debug, Clone)]
pub struct RectangleMeshInfo {
  min: Point,
  max: Point,
  nx: usize,
  ny: usize,
  diagonal: Diagonal,
}

// constructors
impl RectangleMeshInfo {
  /// Rectangle spanned by two opposite corners, given in any order.
  pub fn new(p0: Point, p1: Point, nx: usize, ny: usize) -> Self {
    let min = p0.inf(&p1);
    let max = p0.sup(&p1);
    Self {
      min,
      max,
      nx,
      ny,
      diagonal: Diagonal::default(),
    }
  }
  pub fn new_unit(nx: usize, ny: usize) -> Self {
    Self::new(Point::zeros(), Point::new(1.0, 1.0), nx, ny)
  }
  pub fn with_diagonal(mut self, diagonal: Diagonal) -> Self {
    self.diagonal = diagonal;
    self
  }
  pub fn with_resolution(mut self, nx: usize, ny: usize) -> Self {
    self.nx = nx;
    self.ny = ny;
    self
  }
}

// getters
impl RectangleMeshInfo {
  pub fn min(&self) -> Point {
    self.min
  }
  pub fn max(&self) -> Point {
    self.max
  }
  pub fn side_lengths(&self) -> Point {
    self.max - self.min
  }
  pub fn nx(&self) -> usize {
    self.nx
  }
  pub fn ny(&self) -> usize {
    self.ny
  }
  pub fn diagonal(&self) -> Diagonal {
    self.diagonal
  }
  pub fn nnodes(&self) -> usize {
    (self.nx + 1) * (self.ny + 1)
  }
  pub fn node_idx(&self, ix: usize, iy: usize) -> VertexIdx {
    iy * (self.nx + 1) + ix
  }
  pub fn node_pos(&self, ix: usize, iy: usize) -> Point {
    let lengths = self.side_lengths();
    self.min
      + Point::new(
        ix as f64 / self.nx as f64 * lengths[0],
        iy as f64 / self.ny as f64 * lengths[1],
      )
  }
}

impl RectangleMeshInfo {
  pub fn to_mesh(&self) -> Result<TriangleMesh> {
    if self.nx == 0 || self.ny == 0 {
      return Err(Error::InvalidMesh(format!(
        "rectangle needs at least one subdivision per direction, got nx={} ny={}",
        self.nx, self.ny
      )));
    }

    let mut coords = Vec::with_capacity(self.nnodes());
    for iy in 0..=self.ny {
      for ix in 0..=self.nx {
        coords.push(self.node_pos(ix, iy));
      }
    }

    let mut cells = Vec::with_capacity(2 * self.nx * self.ny);
    for iy in 0..self.ny {
      for ix in 0..self.nx {
        let v00 = self.node_idx(ix, iy);
        let v10 = self.node_idx(ix + 1, iy);
        let v01 = self.node_idx(ix, iy + 1);
        let v11 = self.node_idx(ix + 1, iy + 1);

        let right = match self.diagonal {
          Diagonal::Right => true,
          Diagonal::Left => false,
          Diagonal::RightLeft => (ix + iy) % 2 == 0,
        };
        if right {
          cells.push([v00, v10, v11]);
          cells.push([v00, v11, v01]);
        } else {
          cells.push([v00, v10, v01]);
          cells.push([v10, v11, v01]);
        }
      }
    }

    TriangleMesh::from_cells(coords, cells)
  }
}
