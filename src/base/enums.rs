use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the evaluation mode requested by the solver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalMode {
    /// Weak-form contribution (residual vector or tangent matrix per element)
    Weak,

    /// Integral over each element
    Eval,

    /// Volume-weighted average over each element
    ElAvg,

    /// Unreduced values at the quadrature points
    Qp,
}

/// Defines the quantity requested in the `eval`, `el_avg` and `qp` modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermMode {
    /// Second Piola-Kirchhoff (TL) or Kirchhoff (UL) stress
    Stress,

    /// Green strain
    Strain,

    /// Deformation gradient F
    DefGrad,

    /// Jacobian J = det(F)
    Jacobian,
}

/// Defines how values at quadrature points are reduced
///
/// The discriminants are the flags exchanged with the geometry mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegMode {
    /// Σ v dV over each element
    Integral = 0,

    /// Σ v dV / Σ dV over each element
    Average = 1,

    /// Copy, no quadrature weighting
    PointWise = 2,
}

/// Defines which weak-form block is requested
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeakKind {
    /// Internal-force (residual) vector
    Residual,

    /// Consistent tangent stiffness matrix
    Tangent,
}

/// Defines the hyperelastic formulation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formulation {
    /// Total Lagrangian: second Piola-Kirchhoff stress, reference configuration
    Total,

    /// Updated Lagrangian: Kirchhoff stress, current configuration
    Updated,
}

/// Defines the family of kinematic data shared by material laws of the same formulation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FamilyKind {
    TotalLagrangian,
    UpdatedLagrangian,
}

/// Names a kinematic field stored in the family data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FamilyField {
    /// Deformation gradient F (dim × dim)
    DefGrad,

    /// J = det(F) (1 × 1)
    DetF,

    /// Green strain E = ½(FᵀF - I) (sym × 1)
    GreenStrain,

    /// Right Cauchy-Green tensor C = FᵀF (sym × 1)
    SymC,

    /// tr(C) (1 × 1)
    TrC,

    /// Second invariant of C (1 × 1)
    In2C,

    /// C⁻¹ (sym × 1)
    SymInvC,

    /// Left Cauchy-Green tensor b = FFᵀ (sym × 1)
    SymB,

    /// tr(b) (1 × 1)
    TrB,

    /// Second invariant of b (1 × 1)
    In2B,
}

impl EvalMode {
    /// Parses the solver-facing name of the evaluation mode
    ///
    /// The `term` name is only used in the error message.
    pub fn parse(term: &str, mode: &str) -> Result<Self, Error> {
        match mode {
            "weak" => Ok(EvalMode::Weak),
            "eval" => Ok(EvalMode::Eval),
            "el_avg" => Ok(EvalMode::ElAvg),
            "qp" => Ok(EvalMode::Qp),
            _ => Err(Error::unsupported(term, mode)),
        }
    }

    /// Returns the solver-facing name
    pub fn as_str(&self) -> &'static str {
        match self {
            EvalMode::Weak => "weak",
            EvalMode::Eval => "eval",
            EvalMode::ElAvg => "el_avg",
            EvalMode::Qp => "qp",
        }
    }

    /// Returns the reduction associated with a non-weak mode
    pub fn integ_mode(&self) -> Option<IntegMode> {
        match self {
            EvalMode::Weak => None,
            EvalMode::Eval => Some(IntegMode::Integral),
            EvalMode::ElAvg => Some(IntegMode::Average),
            EvalMode::Qp => Some(IntegMode::PointWise),
        }
    }
}

impl TermMode {
    /// Parses the solver-facing name of the term mode
    pub fn parse(term: &str, term_mode: &str) -> Result<Self, Error> {
        match term_mode {
            "stress" => Ok(TermMode::Stress),
            "strain" => Ok(TermMode::Strain),
            "def_grad" => Ok(TermMode::DefGrad),
            "jacobian" => Ok(TermMode::Jacobian),
            _ => Err(Error::unsupported(term, term_mode)),
        }
    }

    /// Returns the solver-facing name
    pub fn as_str(&self) -> &'static str {
        match self {
            TermMode::Stress => "stress",
            TermMode::Strain => "strain",
            TermMode::DefGrad => "def_grad",
            TermMode::Jacobian => "jacobian",
        }
    }
}

impl IntegMode {
    /// Returns the numeric flag (0 integral, 1 average, 2 point-wise)
    pub fn fmode(&self) -> usize {
        *self as usize
    }
}

impl Formulation {
    /// Returns the numeric flag (0 total, 1 updated)
    pub fn flag(&self) -> usize {
        match self {
            Formulation::Total => 0,
            Formulation::Updated => 1,
        }
    }

    /// Returns the kind of family data consumed by this formulation
    pub fn family_kind(&self) -> FamilyKind {
        match self {
            Formulation::Total => FamilyKind::TotalLagrangian,
            Formulation::Updated => FamilyKind::UpdatedLagrangian,
        }
    }
}

impl FamilyKind {
    /// Returns the name of the evaluate-cache slot
    pub fn cache_name(&self) -> &'static str {
        match self {
            FamilyKind::TotalLagrangian => "tl_common",
            FamilyKind::UpdatedLagrangian => "ul_common",
        }
    }

    /// Returns all fields computed for this family
    pub fn fields(&self) -> &'static [FamilyField] {
        match self {
            FamilyKind::TotalLagrangian => &[
                FamilyField::DefGrad,
                FamilyField::DetF,
                FamilyField::GreenStrain,
                FamilyField::SymC,
                FamilyField::TrC,
                FamilyField::In2C,
                FamilyField::SymInvC,
            ],
            FamilyKind::UpdatedLagrangian => &[
                FamilyField::DefGrad,
                FamilyField::DetF,
                FamilyField::GreenStrain,
                FamilyField::SymB,
                FamilyField::TrB,
                FamilyField::In2B,
            ],
        }
    }

    /// Returns whether the field is computed for this family
    pub fn provides(&self, field: FamilyField) -> bool {
        self.fields().contains(&field)
    }
}

impl FamilyField {
    /// Returns the conventional name of the field
    pub fn name(&self) -> &'static str {
        match self {
            FamilyField::DefGrad => "mtx_f",
            FamilyField::DetF => "det_f",
            FamilyField::GreenStrain => "green_strain",
            FamilyField::SymC => "sym_c",
            FamilyField::TrC => "tr_c",
            FamilyField::In2C => "in2_c",
            FamilyField::SymInvC => "sym_inv_c",
            FamilyField::SymB => "sym_b",
            FamilyField::TrB => "tr_b",
            FamilyField::In2B => "in2_b",
        }
    }

    /// Returns the (nrow, ncol) of one quadrature-point block
    pub fn block_shape(&self, dim: usize) -> (usize, usize) {
        let sym = dim * (dim + 1) / 2;
        match self {
            FamilyField::DefGrad => (dim, dim),
            FamilyField::DetF | FamilyField::TrC | FamilyField::In2C | FamilyField::TrB | FamilyField::In2B => (1, 1),
            FamilyField::GreenStrain | FamilyField::SymC | FamilyField::SymInvC | FamilyField::SymB => (sym, 1),
        }
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TermMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for FamilyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
