use crate::{
  fe::LagrangeElement,
  geometry::TriangleGeometry,
  mesh::{CellIdx, FacetIdx, TriangleMesh},
  quadrature::{QuadRule, QuadRule1d},
  Point, Result,
};

use std::rc::Rc;

pub type DofIdx = usize;

/// Inter-element continuity of the discrete space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
  /// Globally continuous, dofs on shared vertices and edges are identified.
  Continuous,
  /// Piecewise polynomial, every cell owns its dofs.
  Discontinuous,
}

/// Maps local (per cell) dofs to global dofs.
#[derive(Debug, Clone)]
pub struct DofHandler {
  local2global_idx: Vec<Vec<DofIdx>>,
  dof_coords: Vec<Point>,
}
impl DofHandler {
  pub fn new(mesh: &TriangleMesh, element: &LagrangeElement, continuity: Continuity) -> Self {
    let nlocal = element.ndofs();
    let mut local2global_idx = Vec::with_capacity(mesh.ncells());

    let dof_coords = match continuity {
      Continuity::Continuous => {
        let nvertices = mesh.nvertices();
        let mut dof_coords = mesh.coords().to_vec();
        if element.degree() == 2 {
          dof_coords.extend(mesh.facets().iter().map(|f| {
            let [a, b] = f.vertices();
            0.5 * (mesh.coords()[a] + mesh.coords()[b])
          }));
        }
        for icell in 0..mesh.ncells() {
          let mut dofs = mesh.cell(icell).to_vec();
          if element.degree() == 2 {
            dofs.extend(mesh.cell_facets(icell).iter().map(|&ifacet| nvertices + ifacet));
          }
          local2global_idx.push(dofs);
        }
        dof_coords
      }
      Continuity::Discontinuous => {
        let mut dof_coords = Vec::with_capacity(mesh.ncells() * nlocal);
        for icell in 0..mesh.ncells() {
          let geo = mesh.cell_geometry(icell);
          dof_coords.extend(element.nodes().iter().map(|xi| geo.to_physical(xi)));
          local2global_idx.push((icell * nlocal..(icell + 1) * nlocal).collect());
        }
        dof_coords
      }
    };

    Self {
      local2global_idx,
      dof_coords,
    }
  }

  pub fn ndofs(&self) -> usize {
    self.dof_coords.len()
  }
  pub fn local2global(&self, icell: CellIdx) -> &[DofIdx] {
    &self.local2global_idx[icell]
  }
  /// Physical location of the interpolation node of each dof.
  pub fn dof_coords(&self) -> &[Point] {
    &self.dof_coords
  }
}

/// A scalar Lagrangian Finite Element Space over a triangle mesh.
///
/// Also owns the quadrature rules used for all integrals over the space, together
/// with the shape function tables on the reference quadrature nodes.
#[derive(Debug)]
pub struct FeSpace {
  mesh: Rc<TriangleMesh>,
  element: LagrangeElement,
  continuity: Continuity,
  dof_handler: DofHandler,
  quad: QuadRule,
  facet_quad: QuadRule1d,
  ref_basis: Vec<na::DVector<f64>>,
  ref_grads: Vec<na::Matrix2xX<f64>>,
}

impl FeSpace {
  pub fn new(mesh: Rc<TriangleMesh>, degree: usize, continuity: Continuity) -> Result<Self> {
    let element = LagrangeElement::new(degree)?;
    let dof_handler = DofHandler::new(&mesh, &element, continuity);

    // Quartic products of discrete fields appear in the EQ terms and energies.
    let quad = QuadRule::triangle(4 * degree);
    let facet_quad = QuadRule1d::gauss(2 * degree);

    let ref_basis = quad.nodes().iter().map(|x| element.eval_basis(x)).collect();
    let ref_grads = quad
      .nodes()
      .iter()
      .map(|x| element.eval_ref_grads(x))
      .collect();

    tracing::debug!(
      "created {continuity:?} P{degree} space with {} dofs on {} cells",
      dof_handler.ndofs(),
      mesh.ncells()
    );

    Ok(Self {
      mesh,
      element,
      continuity,
      dof_handler,
      quad,
      facet_quad,
      ref_basis,
      ref_grads,
    })
  }

  pub fn mesh(&self) -> &Rc<TriangleMesh> {
    &self.mesh
  }
  pub fn element(&self) -> &LagrangeElement {
    &self.element
  }
  pub fn degree(&self) -> usize {
    self.element.degree()
  }
  pub fn continuity(&self) -> Continuity {
    self.continuity
  }
  pub fn ndofs(&self) -> usize {
    self.dof_handler.ndofs()
  }
  pub fn dof_handler(&self) -> &DofHandler {
    &self.dof_handler
  }
  pub fn quad(&self) -> &QuadRule {
    &self.quad
  }

  pub fn cell_values(&self, icell: CellIdx) -> CellValues<'_> {
    let geometry = self.mesh.cell_geometry(icell);
    let abs_det = geometry.det().abs();
    let inv_jt = geometry.inv_jacobian_transpose();

    let points = self
      .quad
      .nodes()
      .iter()
      .map(|xi| geometry.to_physical(xi))
      .collect();
    let jxw = self.quad.weights().iter().map(|w| w * abs_det).collect();
    let grads = self.ref_grads.iter().map(|g| inv_jt * g).collect();

    CellValues {
      icell,
      dofs: self.dof_handler.local2global(icell),
      geometry,
      points,
      jxw,
      basis: &self.ref_basis,
      grads,
    }
  }

  /// Facet integration context for the interior facet `ifacet`.
  ///
  /// Returns `None` for boundary facets.
  pub fn facet_values(&self, ifacet: FacetIdx) -> Option<FacetValues<'_>> {
    let facet = self.mesh.facet(ifacet);
    let iplus = facet.plus();
    let iminus = facet.minus()?;

    let facet_geo = self.mesh.facet_geometry(ifacet, iplus);
    let points: Vec<Point> = self
      .facet_quad
      .nodes()
      .iter()
      .map(|&s| facet_geo.point(s))
      .collect();
    let jxw = self
      .facet_quad
      .weights()
      .iter()
      .map(|w| w * facet_geo.length())
      .collect();

    let plus = self.facet_side(iplus, &points);
    let minus = self.facet_side(iminus, &points);

    Some(FacetValues {
      ifacet,
      normal: *facet_geo.normal(),
      plus_diameter: self.mesh.cell_geometry(iplus).diameter(),
      jxw,
      plus,
      minus,
    })
  }

  fn facet_side(&self, icell: CellIdx, points: &[Point]) -> FacetSide<'_> {
    let geometry = self.mesh.cell_geometry(icell);
    let inv_jt = geometry.inv_jacobian_transpose();
    let refpoints: Vec<Point> = points.iter().map(|x| geometry.to_reference(x)).collect();
    FacetSide {
      icell,
      dofs: self.dof_handler.local2global(icell),
      basis: refpoints
        .iter()
        .map(|xi| self.element.eval_basis(xi))
        .collect(),
      grads: refpoints
        .iter()
        .map(|xi| inv_jt * self.element.eval_ref_grads(xi))
        .collect(),
    }
  }
}

/// Shape function values and physical gradients on the quadrature nodes of a cell.
pub struct CellValues<'a> {
  icell: CellIdx,
  dofs: &'a [DofIdx],
  geometry: TriangleGeometry,
  points: Vec<Point>,
  jxw: Vec<f64>,
  basis: &'a [na::DVector<f64>],
  grads: Vec<na::Matrix2xX<f64>>,
}
impl CellValues<'_> {
  pub fn icell(&self) -> CellIdx {
    self.icell
  }
  pub fn dofs(&self) -> &[DofIdx] {
    self.dofs
  }
  pub fn nlocal(&self) -> usize {
    self.dofs.len()
  }
  pub fn geometry(&self) -> &TriangleGeometry {
    &self.geometry
  }
  pub fn nqpoints(&self) -> usize {
    self.jxw.len()
  }
  /// Physical quadrature nodes.
  pub fn points(&self) -> &[Point] {
    &self.points
  }
  /// Quadrature weights times the Jacobian determinant.
  pub fn jxw(&self) -> &[f64] {
    &self.jxw
  }
  pub fn basis(&self, iq: usize) -> &na::DVector<f64> {
    &self.basis[iq]
  }
  pub fn grads(&self, iq: usize) -> &na::Matrix2xX<f64> {
    &self.grads[iq]
  }

  fn local_coeffs(&self, coeffs: &na::DVector<f64>) -> na::DVector<f64> {
    na::DVector::from_iterator(self.nlocal(), self.dofs.iter().map(|&idof| coeffs[idof]))
  }

  /// Values of the FE function with global coefficients `coeffs` on the quadrature nodes.
  pub fn values(&self, coeffs: &na::DVector<f64>) -> Vec<f64> {
    let local = self.local_coeffs(coeffs);
    self.basis.iter().map(|b| b.dot(&local)).collect()
  }

  /// Gradients of the FE function with global coefficients `coeffs` on the quadrature nodes.
  pub fn gradients(&self, coeffs: &na::DVector<f64>) -> Vec<Point> {
    let local = self.local_coeffs(coeffs);
    self.grads.iter().map(|g| g * &local).collect()
  }

  /// $int_K f$ for `f` given on the quadrature nodes.
  pub fn integrate(&self, f: &[f64]) -> f64 {
    self.jxw.iter().zip(f).map(|(w, v)| w * v).sum()
  }

  /// $[int_K c phi_j phi_i]_(i j)$ for a coefficient `c` given on the quadrature nodes.
  pub fn weighted_mass_elmat(&self, c: &[f64]) -> na::DMatrix<f64> {
    let n = self.nlocal();
    let mut elmat = na::DMatrix::zeros(n, n);
    for (iq, (&w, &cq)) in self.jxw.iter().zip(c).enumerate() {
      let b = &self.basis[iq];
      elmat += (w * cq) * b * b.transpose();
    }
    elmat
  }

  /// $[int_K phi_j phi_i]_(i j)$
  pub fn mass_elmat(&self) -> na::DMatrix<f64> {
    self.weighted_mass_elmat(&vec![1.0; self.nqpoints()])
  }

  /// $[int_K grad phi_j dot grad phi_i]_(i j)$
  pub fn laplace_elmat(&self) -> na::DMatrix<f64> {
    let n = self.nlocal();
    let mut elmat = na::DMatrix::zeros(n, n);
    for (iq, &w) in self.jxw.iter().enumerate() {
      let g = &self.grads[iq];
      elmat += w * g.transpose() * g;
    }
    elmat
  }

  /// $[int_K f phi_i]_i$ for `f` given on the quadrature nodes.
  pub fn load_elvec(&self, f: &[f64]) -> na::DVector<f64> {
    let mut elvec = na::DVector::zeros(self.nlocal());
    for (iq, (&w, &fq)) in self.jxw.iter().zip(f).enumerate() {
      elvec.axpy(w * fq, &self.basis[iq], 1.0);
    }
    elvec
  }
}

/// Traces of the shape functions of one adjacent cell on a facet.
pub struct FacetSide<'a> {
  icell: CellIdx,
  dofs: &'a [DofIdx],
  basis: Vec<na::DVector<f64>>,
  grads: Vec<na::Matrix2xX<f64>>,
}
impl FacetSide<'_> {
  pub fn icell(&self) -> CellIdx {
    self.icell
  }
  pub fn dofs(&self) -> &[DofIdx] {
    self.dofs
  }
}

/// Integration context on an interior facet shared by the cells `+` and `-`.
///
/// Local dofs are the dofs of `+` followed by the dofs of `-`.
/// With $n^+$ the normal pointing out of `+`, we use
/// $[v] = v^+ - v^-$ and $avg(grad v) = 1/2 (grad v^+ + grad v^-)$.
pub struct FacetValues<'a> {
  ifacet: FacetIdx,
  normal: Point,
  plus_diameter: f64,
  jxw: Vec<f64>,
  plus: FacetSide<'a>,
  minus: FacetSide<'a>,
}
impl FacetValues<'_> {
  pub fn ifacet(&self) -> FacetIdx {
    self.ifacet
  }
  /// The normal pointing out of the `+` cell.
  pub fn normal(&self) -> &Point {
    &self.normal
  }
  /// The diameter $h^+$ of the `+` cell.
  pub fn plus_diameter(&self) -> f64 {
    self.plus_diameter
  }
  pub fn plus(&self) -> &FacetSide<'_> {
    &self.plus
  }
  pub fn minus(&self) -> &FacetSide<'_> {
    &self.minus
  }
  pub fn jxw(&self) -> &[f64] {
    &self.jxw
  }
  pub fn nqpoints(&self) -> usize {
    self.jxw.len()
  }

  pub fn dofs(&self) -> Vec<DofIdx> {
    self.plus.dofs.iter().chain(self.minus.dofs).copied().collect()
  }

  /// $[phi_i]$ for all local dofs at quadrature node `iq`.
  pub fn jumps(&self, iq: usize) -> na::DVector<f64> {
    let plus = &self.plus.basis[iq];
    let minus = &self.minus.basis[iq];
    na::DVector::from_iterator(
      plus.len() + minus.len(),
      plus.iter().copied().chain(minus.iter().map(|v| -v)),
    )
  }

  /// $avg(grad phi_i) dot n^+$ for all local dofs at quadrature node `iq`.
  pub fn avg_normal_grads(&self, iq: usize) -> na::DVector<f64> {
    let plus = self.plus.grads[iq].transpose() * self.normal;
    let minus = self.minus.grads[iq].transpose() * self.normal;
    na::DVector::from_iterator(
      plus.len() + minus.len(),
      plus.iter().chain(minus.iter()).map(|v| 0.5 * v),
    )
  }

  fn local_coeffs(&self, coeffs: &na::DVector<f64>) -> na::DVector<f64> {
    let dofs = self.dofs();
    na::DVector::from_iterator(dofs.len(), dofs.iter().map(|&idof| coeffs[idof]))
  }

  /// $[u]$ on the quadrature nodes for the FE function with global coefficients `coeffs`.
  pub fn jump(&self, coeffs: &na::DVector<f64>) -> Vec<f64> {
    let local = self.local_coeffs(coeffs);
    (0..self.nqpoints())
      .map(|iq| self.jumps(iq).dot(&local))
      .collect()
  }

  /// $avg(grad u) dot n^+$ on the quadrature nodes.
  pub fn avg_normal_grad(&self, coeffs: &na::DVector<f64>) -> Vec<f64> {
    let local = self.local_coeffs(coeffs);
    (0..self.nqpoints())
      .map(|iq| self.avg_normal_grads(iq).dot(&local))
      .collect()
  }
}
