//! Implements hyperelastic material laws

mod material_law;
mod neo_hookean;
mod neo_hookean_ul;
mod saint_venant_kirchhoff;
pub use crate::material::material_law::*;
pub use crate::material::neo_hookean::*;
pub use crate::material::neo_hookean_ul::*;
pub use crate::material::saint_venant_kirchhoff::*;
