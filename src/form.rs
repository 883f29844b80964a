//! Weak forms of the mixed (phi, w) system solved in every EQ step.
//!
//! The unknowns are ordered as all phi dofs followed by all w dofs.
//! The first block row is the phase equation tested with $bar w$,
//! the second block row is the chemical potential equation tested with $bar phi$:
//!
//! $(phi, bar w) + dt gamma a_h(w, bar w) = (phi_n, bar w) + dt (s, bar w)$
//!
//! $(w, bar phi) - eps^2 a_h(phi, bar phi) - 1/2 (H_2 phi, bar phi)
//!   = (H U_n, bar phi) - 1/2 (H_2 phi_n, bar phi)$

use crate::{
  assemble::{self, Coefficient, FacetElmatProvider, FieldCoefficient, GalMat, GalVec},
  error::LinalgError,
  function::FeFunction,
  linalg::{self, FaerLu},
  space::{Continuity, FacetValues, FeSpace},
  sparse::SparseMatrix,
  Point,
};

use std::rc::Rc;

/// The spatial discretization of the symmetric diffusion form $a_h$.
pub trait WeakFormStrategy {
  /// Scheme label used in logs and output names.
  fn name(&self) -> &'static str;
  /// The continuity the discrete space must have.
  fn continuity(&self) -> Continuity;
  /// Galerkin matrix of $a_h$ on `space`.
  fn stiffness_galmat(&self, space: &FeSpace) -> GalMat;
}

/// Conforming discretization: $a_h(u, v) = (grad u, grad v)$.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContinuousGalerkin;
impl WeakFormStrategy for ContinuousGalerkin {
  fn name(&self) -> &'static str {
    "FEM-EQ"
  }
  fn continuity(&self) -> Continuity {
    Continuity::Continuous
  }
  fn stiffness_galmat(&self, space: &FeSpace) -> GalMat {
    assemble::laplace_galmat(space)
  }
}

/// Symmetric interior penalty discretization.
///
/// $a_h(u, v) = sum_K (grad u, grad v)_K
///   + sum_F int_F -avg(grad u) dot n^+ [v] - avg(grad v) dot n^+ [u] + sigma/h^+ [u][v]$
///
/// over the interior facets `F`, with $h^+$ the diameter of the `+` cell.
#[derive(Debug, Clone, Copy)]
pub struct DiscontinuousGalerkin {
  penalty: f64,
}
impl DiscontinuousGalerkin {
  pub fn new(penalty: f64) -> Self {
    Self { penalty }
  }
  pub fn penalty(&self) -> f64 {
    self.penalty
  }
}
impl WeakFormStrategy for DiscontinuousGalerkin {
  fn name(&self) -> &'static str {
    "DG-EQ"
  }
  fn continuity(&self) -> Continuity {
    Continuity::Discontinuous
  }
  fn stiffness_galmat(&self, space: &FeSpace) -> GalMat {
    let mut galmat = assemble::laplace_galmat(space);
    let facet_galmat = assemble::assemble_facet_galmat(space, SipFacetElmat::new(self.penalty));
    galmat.add_block(0, 0, 1.0, &facet_galmat);
    galmat
  }
}

/// Consistency, symmetry and penalty terms of SIP on one interior facet.
pub struct SipFacetElmat {
  penalty: f64,
}
impl SipFacetElmat {
  pub fn new(penalty: f64) -> Self {
    Self { penalty }
  }
}
impl FacetElmatProvider for SipFacetElmat {
  fn eval(&self, facet: &FacetValues) -> na::DMatrix<f64> {
    let nlocal = facet.plus().dofs().len() + facet.minus().dofs().len();
    let penalty = self.penalty / facet.plus_diameter();
    let mut elmat = na::DMatrix::zeros(nlocal, nlocal);
    for (iq, &jxw) in facet.jxw().iter().enumerate() {
      let jumps = facet.jumps(iq);
      let avgs = facet.avg_normal_grads(iq);
      // elmat[(i, j)] = a_h(phi_j, phi_i)
      elmat -= jxw * (&jumps * avgs.transpose() + &avgs * jumps.transpose());
      elmat += (jxw * penalty) * &jumps * jumps.transpose();
    }
    elmat
  }
}

/// The state the system of one step is assembled from.
pub struct FormInputs<'a> {
  pub phi: &'a FeFunction,
  pub u: &'a FeFunction,
  pub h: &'a FeFunction,
  /// Coefficient $H_2$ of the stabilization term.
  pub h2: &'a dyn Coefficient,
  /// Values of the source at the new time level, if any.
  pub source: Option<&'a dyn Coefficient>,
  pub dt: f64,
  pub eps: f64,
  pub gamma: f64,
}

/// Assembles the mixed systems of a run.
///
/// The state independent matrices `M` and `A` are assembled once.
pub struct FormBuilder {
  space: Rc<FeSpace>,
  mass: GalMat,
  stiffness: GalMat,
  mass_csc: nas::CscMatrix<f64>,
  stiffness_csc: nas::CscMatrix<f64>,
}

impl FormBuilder {
  pub fn new(space: Rc<FeSpace>, strategy: &dyn WeakFormStrategy) -> Self {
    let mass = assemble::mass_galmat(&space);
    let stiffness = strategy.stiffness_galmat(&space);
    let mass_csc = mass.to_nalgebra_csc();
    let stiffness_csc = stiffness.to_nalgebra_csc();
    tracing::debug!(
      "assembled {} operators: {} mass and {} stiffness triplets",
      strategy.name(),
      mass.ntriplets(),
      stiffness.ntriplets()
    );
    Self {
      space,
      mass,
      stiffness,
      mass_csc,
      stiffness_csc,
    }
  }

  pub fn space(&self) -> &Rc<FeSpace> {
    &self.space
  }

  /// $a_h(phi, phi)$
  pub fn gradient_energy(&self, phi: &na::DVector<f64>) -> f64 {
    linalg::quadratic_form_sparse(&self.stiffness_csc, phi)
  }

  pub fn build(&self, inputs: &FormInputs) -> MixedSystem {
    let n = self.space.ndofs();
    let FormInputs {
      phi,
      u,
      h,
      h2,
      source,
      dt,
      eps,
      gamma,
    } = *inputs;

    let h2_mass = assemble::assemble_galmat(&self.space, assemble::WeightedMassElmat(h2));
    let h2_mass_csc = h2_mass.to_nalgebra_csc();

    let mut galmat = SparseMatrix::zeros(2 * n, 2 * n);
    galmat.add_block(0, 0, 1.0, &self.mass);
    galmat.add_block(0, n, dt * gamma, &self.stiffness);
    galmat.add_block(n, 0, -eps * eps, &self.stiffness);
    galmat.add_block(n, 0, -0.5, &h2_mass);
    galmat.add_block(n, n, 1.0, &self.mass);

    let mut phase_rhs = &self.mass_csc * phi.coeffs();
    if let Some(source) = source {
      phase_rhs += dt * assemble::assemble_galvec(&self.space, assemble::LoadElvec(source));
    }

    let hu = FieldCoefficient::new(vec![h, u], |v: &[f64], _: &Point| v[0] * v[1]);
    let mut potential_rhs = assemble::assemble_galvec(&self.space, assemble::LoadElvec(hu));
    potential_rhs -= 0.5 * (&h2_mass_csc * phi.coeffs());

    let mut galvec = GalVec::zeros(2 * n);
    galvec.rows_mut(0, n).copy_from(&phase_rhs);
    galvec.rows_mut(n, n).copy_from(&potential_rhs);

    MixedSystem {
      ndofs: n,
      galmat,
      galvec,
    }
  }
}

/// The linear system of one step in the unknowns (phi, w).
pub struct MixedSystem {
  ndofs: usize,
  galmat: GalMat,
  galvec: GalVec,
}

impl MixedSystem {
  /// Returns the coefficients of phi and w.
  pub fn solve(&self) -> Result<(na::DVector<f64>, na::DVector<f64>), LinalgError> {
    let lu = FaerLu::new(self.galmat.to_nalgebra_csc())?;
    let sol = lu.solve(&self.galvec)?;
    let phi = sol.rows(0, self.ndofs).into_owned();
    let w = sol.rows(self.ndofs, self.ndofs).into_owned();
    Ok((phi, w))
  }
}

#[cfg(test)]
mod test {
  use super::{ContinuousGalerkin, DiscontinuousGalerkin, FormBuilder, FormInputs, WeakFormStrategy};
  use crate::{
    assemble::FieldCoefficient,
    function::FeFunction,
    mesh::rectangle::{Diagonal, RectangleMeshInfo},
    space::{Continuity, FeSpace},
    Point,
  };

  use approx::assert_relative_eq;
  use std::rc::Rc;

  fn dg_space(degree: usize) -> Rc<FeSpace> {
    let mesh = RectangleMeshInfo::new_unit(3, 3)
      .with_diagonal(Diagonal::RightLeft)
      .to_mesh()
      .unwrap();
    Rc::new(FeSpace::new(Rc::new(mesh), degree, Continuity::Discontinuous).unwrap())
  }

  #[test]
  fn sip_is_symmetric_and_annihilates_constants() {
    for degree in 1..=2 {
      let space = dg_space(degree);
      let galmat = DiscontinuousGalerkin::new(10.0)
        .stiffness_galmat(&space)
        .to_nalgebra_dense();
      assert_relative_eq!(galmat, galmat.transpose(), epsilon = 1e-12);
      let ones = na::DVector::from_element(space.ndofs(), 1.0);
      assert_relative_eq!(&galmat * ones, na::DVector::zeros(space.ndofs()), epsilon = 1e-12);
    }
  }

  #[test]
  fn sip_is_coercive_for_linear_elements() {
    let space = dg_space(1);
    let galmat = DiscontinuousGalerkin::new(10.0)
      .stiffness_galmat(&space)
      .to_nalgebra_dense();
    let eigenvalues = galmat.symmetric_eigen().eigenvalues;
    assert!(eigenvalues.min() > -1e-10);
    // the constants are the only kernel
    assert_eq!(eigenvalues.iter().filter(|&&l| l.abs() < 1e-10).count(), 1);
  }

  #[test]
  fn sip_reduces_to_dirichlet_form_on_continuous_fields() {
    let space = dg_space(2);
    let builder = FormBuilder::new(space.clone(), &DiscontinuousGalerkin::new(10.0));
    // gradient (2x + 1, -3), squared norm integrated over the unit square
    let phi = FeFunction::interpolate(space, |x| x[0] * x[0] + x[0] - 3.0 * x[1]);
    let exact = 4.0 / 3.0 + 2.0 + 1.0 + 9.0;
    assert_relative_eq!(builder.gradient_energy(phi.coeffs()), exact, epsilon = 1e-10);
  }

  #[test]
  fn sip_penalizes_jumps() {
    let space = dg_space(1);
    let builder = FormBuilder::new(space.clone(), &DiscontinuousGalerkin::new(10.0));
    let mut phi = FeFunction::zero(space.clone());
    for &idof in space.dof_handler().local2global(0) {
      phi.coeffs_mut()[idof] = 1.0;
    }
    assert!(builder.gradient_energy(phi.coeffs()) > 0.0);
  }

  #[test]
  fn zero_state_gives_zero_solution() {
    let mesh = Rc::new(RectangleMeshInfo::new_unit(2, 2).to_mesh().unwrap());
    let space = Rc::new(FeSpace::new(mesh, 1, Continuity::Continuous).unwrap());
    let builder = FormBuilder::new(space.clone(), &ContinuousGalerkin);
    let zero = FeFunction::zero(space.clone());
    let u = FeFunction::constant(space, 1.0);
    let h2 = FieldCoefficient::new(vec![&zero], |v: &[f64], _: &Point| v[0] * v[0]);
    let system = builder.build(&FormInputs {
      phi: &zero,
      u: &u,
      h: &zero,
      h2: &h2,
      source: None,
      dt: 1e-3,
      eps: 0.01,
      gamma: 1.0,
    });
    let (phi, w) = system.solve().unwrap();
    assert_relative_eq!(phi.amax(), 0.0);
    assert_relative_eq!(w.amax(), 0.0);
  }

  #[test]
  fn constant_field_without_potential_coupling_is_kept() {
    for strategy in [
      &ContinuousGalerkin as &dyn WeakFormStrategy,
      &DiscontinuousGalerkin::new(10.0),
    ] {
      let mesh = Rc::new(RectangleMeshInfo::new_unit(3, 3).to_mesh().unwrap());
      let space = Rc::new(FeSpace::new(mesh, 2, strategy.continuity()).unwrap());
      let builder = FormBuilder::new(space.clone(), strategy);
      let phi = FeFunction::constant(space.clone(), 0.4);
      let h = FeFunction::zero(space.clone());
      let u = FeFunction::constant(space, 1.0);
      let h2 = FieldCoefficient::new(vec![&phi], |_: &[f64], _: &Point| 2.0);
      let system = builder.build(&FormInputs {
        phi: &phi,
        u: &u,
        h: &h,
        h2: &h2,
        source: None,
        dt: 1e-2,
        eps: 0.1,
        gamma: 1.0,
      });
      // the stiffness annihilates constants, so $(phi_n, 0)$ solves the system
      let (next, w) = system.solve().unwrap();
      assert_relative_eq!(next, phi.coeffs().clone(), epsilon = 1e-12);
      assert_relative_eq!(w.amax(), 0.0, epsilon = 1e-12);
    }
  }
}
