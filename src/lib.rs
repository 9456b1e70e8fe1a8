//! Hyperelastic constitutive evaluation for finite-element assembly
//!
//! Given a displacement field sampled at quadrature points, this crate computes the
//! deformation gradient and the derived kinematic quantities (the *family data*), caches
//! them per field state, and dispatches to hyperelastic material laws to obtain stress and
//! tangent-modulus tensors in total or updated Lagrangian form. The results are returned as
//! per-quadrature-point arrays, per-element averages, or element residual/tangent blocks
//! ready to be scattered by an assembler.

/// Defines a type alias for the error type as a static string (used by gemlab and russell)
pub type StrError = &'static str;

mod error;
pub use crate::error::*;

pub mod base;
pub mod fem;
pub mod material;
pub mod prelude;
