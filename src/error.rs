//! Error types for the constitutive evaluation core

use crate::StrError;
use thiserror::Error;

/// Errors that can occur while evaluating hyperelastic terms
///
/// All failures are synchronous and surface immediately to the caller (the assembler).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Field data inconsistent with the dimension declared by the geometry mapping
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// No geometry mapping can be resolved for the field's region
    #[error("missing mapping data: {0}")]
    MissingMappingData(String),

    /// A kinematic field required by a material law is absent from the family data
    #[error("missing family data: {0}")]
    MissingFamilyData(String),

    /// The (mode, term mode) combination is not implemented
    #[error("unsupported evaluation mode in {term}! ({mode})")]
    UnsupportedEvaluationMode { term: String, mode: String },

    /// The geometry mapping could not perform the reduction over quadrature points
    #[error("integration failure: {0}")]
    IntegrationFailure(String),

    /// The deformation is not invertible (det(F) ≤ 0)
    #[error("degenerate deformation: {0}")]
    DegenerateDeformation(String),

    /// Material or configuration parameter out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Failure reported by the mesh, shape-function or linear-algebra library
    #[error("geometry error: {0}")]
    Geometry(StrError),
}

impl From<StrError> for Error {
    fn from(message: StrError) -> Self {
        Error::Geometry(message)
    }
}

impl Error {
    /// Creates an [Error::UnsupportedEvaluationMode] naming the term and the offending mode
    pub fn unsupported(term: &str, mode: &str) -> Self {
        Error::UnsupportedEvaluationMode {
            term: term.to_string(),
            mode: mode.to_string(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_works() {
        assert_eq!(
            Error::unsupported("dw_tl_he_neohook", "bogus").to_string(),
            "unsupported evaluation mode in dw_tl_he_neohook! (bogus)"
        );
        assert_eq!(
            Error::MissingFamilyData("sym_inv_c".to_string()).to_string(),
            "missing family data: sym_inv_c"
        );
        let err: Error = "cannot compute gradient".into();
        assert_eq!(err, Error::Geometry("cannot compute gradient"));
        assert_eq!(err.to_string(), "geometry error: cannot compute gradient");
    }
}
