use super::{log_jacobian, MaterialLaw};
use crate::base::sym_tensor::{sym_get, sym_pairs, sym_size};
use crate::base::{FamilyField, Formulation};
use crate::Error;

/// Implements the compressible neo-Hookean model (total Lagrangian)
///
/// ```text
/// S = μ (I - C⁻¹) + λ ln(J) C⁻¹
///
/// ℂᵢⱼₖₗ = λ C⁻¹ᵢⱼ C⁻¹ₖₗ + (μ - λ ln(J)) (C⁻¹ᵢₖ C⁻¹ⱼₗ + C⁻¹ᵢₗ C⁻¹ⱼₖ)
/// ```
pub struct NeoHookean {
    lambda: f64,
    mu: f64,
}

impl NeoHookean {
    /// Allocates a new instance given the Lamé parameters
    pub fn new(lambda: f64, mu: f64) -> Self {
        NeoHookean { lambda, mu }
    }
}

impl MaterialLaw for NeoHookean {
    fn name(&self) -> &str {
        "dw_tl_he_neohook"
    }

    fn formulation(&self) -> Formulation {
        Formulation::Total
    }

    fn required_fields(&self) -> &[FamilyField] {
        &[FamilyField::DetF, FamilyField::SymInvC]
    }

    fn stress(&self, sig: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error> {
        let ln_j = log_jacobian(args[0][0])?;
        let inv_c = args[1];
        for k in 0..sym_size(dim) {
            let delta = if k < dim { 1.0 } else { 0.0 };
            sig[k] = self.mu * (delta - inv_c[k]) + self.lambda * ln_j * inv_c[k];
        }
        Ok(())
    }

    fn tangent(&self, dd: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error> {
        let ln_j = log_jacobian(args[0][0])?;
        let inv_c = args[1];
        let ci = |i, j| sym_get(inv_c, dim, i, j);
        let coef = self.mu - self.lambda * ln_j;
        let pairs = sym_pairs(dim);
        let sym = pairs.len();
        for (a, &(i, j)) in pairs.iter().enumerate() {
            for (b, &(k, l)) in pairs.iter().enumerate() {
                dd[a * sym + b] = self.lambda * ci(i, j) * ci(k, l) + coef * (ci(i, k) * ci(j, l) + ci(i, l) * ci(j, k));
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
