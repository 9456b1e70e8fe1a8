use super::{NeoHookean, NeoHookeanUl, SaintVenantKirchhoff};
use crate::base::{FamilyField, Formulation, ParamHyperelastic};
use crate::Error;

/// Specifies the essential functions for hyperelastic material laws
///
/// The functions work on one quadrature point at a time. The arguments are the blocks of
/// the family-data fields listed by [MaterialLaw::required_fields], in that order.
/// Symmetric tensors use the `[11, 22, (33), 12, (13, 23)]` storage with tensor
/// off-diagonal components.
pub trait MaterialLaw: Send + Sync {
    /// Returns the name of the law (used as the term name)
    fn name(&self) -> &str;

    /// Returns the formulation (total or updated Lagrangian)
    fn formulation(&self) -> Formulation;

    /// Returns the family-data fields consumed by the stress and tangent functions
    fn required_fields(&self) -> &[FamilyField];

    /// Computes the stress (S for TL or τ for UL) in symmetric storage
    ///
    /// # Input
    ///
    /// * `sig` -- the `sym` output components
    /// * `args` -- the blocks of the required fields at the quadrature point
    /// * `dim` -- space dimension
    fn stress(&self, sig: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error>;

    /// Computes the tangent moduli (`sym × sym`, row-major)
    ///
    /// The moduli map the strain with engineering shear components onto the stress,
    /// i.e., `D_IJ = ℂ_ijkl` with `I ↔ (i, j)` and `J ↔ (k, l)`.
    fn tangent(&self, dd: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error>;
}

/// Holds the actual material law implementation
pub struct Material {
    /// Holds the actual law implementation
    pub actual: Box<dyn MaterialLaw>,
}

impl Material {
    /// Allocates a new instance
    pub fn new(param: &ParamHyperelastic) -> Result<Self, Error> {
        let (lambda, mu) = param.lame()?;
        let actual: Box<dyn MaterialLaw> = match param {
            // Saint Venant-Kirchhoff model
            ParamHyperelastic::SaintVenantKirchhoff { .. } => Box::new(SaintVenantKirchhoff::new(lambda, mu)),

            // neo-Hookean model (total Lagrangian)
            ParamHyperelastic::NeoHookean { .. } => Box::new(NeoHookean::new(lambda, mu)),

            // neo-Hookean model (updated Lagrangian)
            ParamHyperelastic::NeoHookeanUl { .. } => Box::new(NeoHookeanUl::new(lambda, mu)),
        };
        Ok(Material { actual })
    }

    /// Allocates a new instance with a custom law
    pub fn from_law(law: Box<dyn MaterialLaw>) -> Self {
        Material { actual: law }
    }
}

/// Returns ln(J) or an error if J ≤ 0
pub(crate) fn log_jacobian(jj: f64) -> Result<f64, Error> {
    if jj <= 0.0 {
        return Err(Error::DegenerateDeformation(format!("J = {:?} must be positive", jj)));
    }
    Ok(f64::ln(jj))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
