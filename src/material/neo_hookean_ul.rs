use super::{log_jacobian, MaterialLaw};
use crate::base::sym_tensor::sym_size;
use crate::base::{FamilyField, Formulation};
use crate::Error;

/// Implements the compressible neo-Hookean model (updated Lagrangian)
///
/// Returns the Kirchhoff stress and the spatial moduli (Kirchhoff-based, referred to the
/// reference volume):
///
/// ```text
/// τ = μ (b - I) + λ ln(J) I
///
/// cᵢⱼₖₗ = λ δᵢⱼ δₖₗ + (μ - λ ln(J)) (δᵢₖ δⱼₗ + δᵢₗ δⱼₖ)
/// ```
pub struct NeoHookeanUl {
    lambda: f64,
    mu: f64,
}

impl NeoHookeanUl {
    /// Allocates a new instance given the Lamé parameters
    pub fn new(lambda: f64, mu: f64) -> Self {
        NeoHookeanUl { lambda, mu }
    }
}

impl MaterialLaw for NeoHookeanUl {
    fn name(&self) -> &str {
        "dw_ul_he_neohook"
    }

    fn formulation(&self) -> Formulation {
        Formulation::Updated
    }

    fn required_fields(&self) -> &[FamilyField] {
        &[FamilyField::DetF, FamilyField::SymB]
    }

    fn stress(&self, sig: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error> {
        let ln_j = log_jacobian(args[0][0])?;
        let bb = args[1];
        for k in 0..sym_size(dim) {
            sig[k] = self.mu * bb[k];
            if k < dim {
                sig[k] += self.lambda * ln_j - self.mu;
            }
        }
        Ok(())
    }

    fn tangent(&self, dd: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error> {
        let ln_j = log_jacobian(args[0][0])?;
        let coef = self.mu - self.lambda * ln_j;
        let sym = sym_size(dim);
        for i in 0..sym {
            for j in 0..sym {
                dd[i * sym + j] = if i < dim && j < dim { self.lambda } else { 0.0 };
            }
            dd[i * sym + i] += if i < dim { 2.0 * coef } else { coef };
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
