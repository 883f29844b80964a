//! Cahn-Hilliard phase-field solver using the Invariant Energy Quadratization
//! (EQ) time discretization with continuous or discontinuous Galerkin finite
//! elements on triangulated rectangles.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod diagnostics;
pub mod energy;
pub mod error;
pub mod fe;
pub mod form;
pub mod function;
pub mod geometry;
pub mod io;
pub mod linalg;
pub mod manufactured;
pub mod mesh;
pub mod params;
pub mod potential;
pub mod quadrature;
pub mod scheme;
pub mod space;
pub mod sparse;

pub use error::{Error, Result};

/// A point in the physical or reference plane.
pub type Point = na::Vector2<f64>;
