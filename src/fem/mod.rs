//! Implements the evaluation of hyperelastic terms over finite element regions

mod def_grad;
mod def_grad_term;
mod evaluate_cache;
mod family_data;
mod field_state;
mod hyperelastic_term;
mod integrate;
mod region;
mod volume_mapping;
pub mod weak;
pub use crate::fem::def_grad::*;
pub use crate::fem::def_grad_term::*;
pub use crate::fem::evaluate_cache::*;
pub use crate::fem::family_data::*;
pub use crate::fem::field_state::*;
pub use crate::fem::hyperelastic_term::*;
pub use crate::fem::integrate::*;
pub use crate::fem::region::*;
pub use crate::fem::volume_mapping::*;
