//! A mesh plays the role of a container of mesh entities (cells, facets, vertices).
//! It provides a global numbering for unique identification of the entities
//! and the cell-facet incidence needed for interior penalty terms.
//! The vertex coordinates define the (affine) geometry of each cell.

pub mod rectangle;

use crate::{
  geometry::{FacetGeometry, TriangleGeometry},
  Error, Point, Result,
};

use indexmap::IndexMap;

pub type VertexIdx = usize;
pub type CellIdx = usize;
pub type FacetIdx = usize;

/// An edge of the triangulation together with its adjacent cells.
///
/// Each adjacent cell is stored with the local index of the facet inside the cell,
/// where local facet $k$ is opposite of local vertex $k$.
/// For interior facets the first cell is the `+` side and the second the `-` side.
#[derive(Debug, Clone)]
pub struct Facet {
  vertices: [VertexIdx; 2],
  cells: Vec<(CellIdx, usize)>,
}
impl Facet {
  /// Sorted vertex indices.
  pub fn vertices(&self) -> [VertexIdx; 2] {
    self.vertices
  }
  pub fn cells(&self) -> &[(CellIdx, usize)] {
    &self.cells
  }
  pub fn is_interior(&self) -> bool {
    self.cells.len() == 2
  }
  pub fn is_boundary(&self) -> bool {
    self.cells.len() == 1
  }
  pub fn plus(&self) -> CellIdx {
    self.cells[0].0
  }
  /// `None` for boundary facets.
  pub fn minus(&self) -> Option<CellIdx> {
    self.cells.get(1).map(|&(icell, _)| icell)
  }
}

/// Conforming triangulation of a planar domain.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
  coords: Vec<Point>,
  cells: Vec<[VertexIdx; 3]>,
  facets: Vec<Facet>,
  cell_facets: Vec<[FacetIdx; 3]>,
}

// constructors
impl TriangleMesh {
  pub fn from_cells(coords: Vec<Point>, cells: Vec<[VertexIdx; 3]>) -> Result<Self> {
    if cells.is_empty() {
      return Err(Error::InvalidMesh("mesh has no cells".into()));
    }
    let nvertices = coords.len();
    for (icell, cell) in cells.iter().enumerate() {
      if let Some(&iv) = cell.iter().find(|&&iv| iv >= nvertices) {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} references vertex {iv}, but there are only {nvertices} vertices"
        )));
      }
      let geo = TriangleGeometry::new(cell.map(|iv| coords[iv]));
      if geo.vol() <= f64::EPSILON * geo.diameter().powi(2) {
        return Err(Error::InvalidMesh(format!("cell {icell} is degenerate")));
      }
    }

    let mut facet_map: IndexMap<[VertexIdx; 2], Vec<(CellIdx, usize)>> = IndexMap::new();
    let mut cell_facets = Vec::with_capacity(cells.len());
    for (icell, cell) in cells.iter().enumerate() {
      let mut local_facets = [0; 3];
      for (ilocal, local_facet) in local_facets.iter_mut().enumerate() {
        let a = cell[(ilocal + 1) % 3];
        let b = cell[(ilocal + 2) % 3];
        let key = if a < b { [a, b] } else { [b, a] };
        let entry = facet_map.entry(key);
        *local_facet = entry.index();
        entry.or_default().push((icell, ilocal));
      }
      cell_facets.push(local_facets);
    }

    let mut facets = Vec::with_capacity(facet_map.len());
    for (vertices, adjacent) in facet_map {
      if adjacent.len() > 2 {
        return Err(Error::InvalidMesh(format!(
          "facet {vertices:?} is shared by {} cells",
          adjacent.len()
        )));
      }
      facets.push(Facet {
        vertices,
        cells: adjacent,
      });
    }

    Ok(Self {
      coords,
      cells,
      facets,
      cell_facets,
    })
  }
}

// getters
impl TriangleMesh {
  pub fn nvertices(&self) -> usize {
    self.coords.len()
  }
  pub fn ncells(&self) -> usize {
    self.cells.len()
  }
  pub fn nfacets(&self) -> usize {
    self.facets.len()
  }
  pub fn coords(&self) -> &[Point] {
    &self.coords
  }
  pub fn cells(&self) -> &[[VertexIdx; 3]] {
    &self.cells
  }
  pub fn cell(&self, icell: CellIdx) -> &[VertexIdx; 3] {
    &self.cells[icell]
  }
  pub fn facets(&self) -> &[Facet] {
    &self.facets
  }
  pub fn facet(&self, ifacet: FacetIdx) -> &Facet {
    &self.facets[ifacet]
  }
  /// Global facet indices of a cell, local facet $k$ is opposite of local vertex $k$.
  pub fn cell_facets(&self, icell: CellIdx) -> &[FacetIdx; 3] {
    &self.cell_facets[icell]
  }

  pub fn interior_facets(&self) -> impl Iterator<Item = &Facet> {
    self.facets.iter().filter(|f| f.is_interior())
  }
  pub fn boundary_facets(&self) -> impl Iterator<Item = &Facet> {
    self.facets.iter().filter(|f| f.is_boundary())
  }

  pub fn cell_geometry(&self, icell: CellIdx) -> TriangleGeometry {
    TriangleGeometry::new(self.cells[icell].map(|iv| self.coords[iv]))
  }

  /// Geometry of a facet, with the normal pointing out of `icell`.
  pub fn facet_geometry(&self, ifacet: FacetIdx, icell: CellIdx) -> FacetGeometry {
    let [a, b] = self.facets[ifacet].vertices;
    FacetGeometry::new(self.coords[a], self.coords[b], &self.cell_geometry(icell))
  }

  /// The mesh width $h_max$, which is the largest diameter of all cells.
  pub fn mesh_width(&self) -> f64 {
    (0..self.ncells())
      .map(|icell| self.cell_geometry(icell).diameter())
      .fold(0.0, f64::max)
  }

  /// Total area of the domain.
  pub fn vol(&self) -> f64 {
    (0..self.ncells())
      .map(|icell| self.cell_geometry(icell).vol())
      .sum()
  }
}
