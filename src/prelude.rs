//! Makes available common structures needed to evaluate hyperelastic terms
//!
//! You may write `use hyperelast::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Config, EvalMode, FamilyField, FamilyKind, Formulation, IntegMode, ParamHyperelastic, QpArray};
pub use crate::base::{SampleMeshes, TermMode, WeakKind};
pub use crate::fem::{integrate, DefGradTerm, EvaluateCache, FamilyData, FieldState, HyperelasticTerm};
pub use crate::fem::{Region, TermArgs, VolumeMapping, WeakArgs};
pub use crate::material::{Material, MaterialLaw};
pub use crate::Error;
