//! Implements the base structures for the evaluation of hyperelastic terms

mod config;
mod enums;
mod parameters;
mod qp_array;
mod sample_meshes;
pub mod sym_tensor;
pub use crate::base::config::*;
pub use crate::base::enums::*;
pub use crate::base::parameters::*;
pub use crate::base::qp_array::*;
pub use crate::base::sample_meshes::*;
