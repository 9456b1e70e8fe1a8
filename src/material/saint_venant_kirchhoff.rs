use super::MaterialLaw;
use crate::base::sym_tensor::sym_size;
use crate::base::{FamilyField, Formulation};
use crate::Error;

/// Implements the Saint Venant-Kirchhoff model (total Lagrangian)
///
/// ```text
/// S = λ tr(E) I + 2 μ E
/// ```
pub struct SaintVenantKirchhoff {
    lambda: f64,
    mu: f64,
}

impl SaintVenantKirchhoff {
    /// Allocates a new instance given the Lamé parameters
    pub fn new(lambda: f64, mu: f64) -> Self {
        SaintVenantKirchhoff { lambda, mu }
    }
}

impl MaterialLaw for SaintVenantKirchhoff {
    fn name(&self) -> &str {
        "dw_tl_he_svk"
    }

    fn formulation(&self) -> Formulation {
        Formulation::Total
    }

    fn required_fields(&self) -> &[FamilyField] {
        &[FamilyField::GreenStrain]
    }

    fn stress(&self, sig: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error> {
        let ee = args[0];
        let tr: f64 = ee[..dim].iter().sum();
        for k in 0..sym_size(dim) {
            sig[k] = 2.0 * self.mu * ee[k];
            if k < dim {
                sig[k] += self.lambda * tr;
            }
        }
        Ok(())
    }

    fn tangent(&self, dd: &mut [f64], _args: &[&[f64]], dim: usize) -> Result<(), Error> {
        let sym = sym_size(dim);
        for i in 0..sym {
            for j in 0..sym {
                dd[i * sym + j] = if i < dim && j < dim { self.lambda } else { 0.0 };
            }
            dd[i * sym + i] += if i < dim { 2.0 * self.mu } else { self.mu };
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SaintVenantKirchhoff;
    use crate::material::MaterialLaw;
    use russell_lab::approx_eq;

    #[test]
    fn stress_and_tangent_work() {
        let model = SaintVenantKirchhoff::new(2.0, 3.0);
        let ee = [0.1, 0.2, 0.05];
        let mut sig = [0.0; 3];
        model.stress(&mut sig, &[&ee], 2).unwrap();
        approx_eq(sig[0], 2.0 * 0.3 + 6.0 * 0.1, 1e-15);
        approx_eq(sig[1], 2.0 * 0.3 + 6.0 * 0.2, 1e-15);
        approx_eq(sig[2], 6.0 * 0.05, 1e-15);

        // D applied to the engineering strain gives the same stress
        let mut dd = [0.0; 9];
        model.tangent(&mut dd, &[&ee], 2).unwrap();
        #[rustfmt::skip]
        let correct = [
            8.0, 2.0, 0.0,
            2.0, 8.0, 0.0,
            0.0, 0.0, 3.0,
        ];
        assert_eq!(dd, correct);
        let eps = [ee[0], ee[1], 2.0 * ee[2]];
        for i in 0..3 {
            let s: f64 = (0..3).map(|j| dd[i * 3 + j] * eps[j]).sum();
            approx_eq(s, sig[i], 1e-15);
        }
    }

    #[test]
    fn tangent_works_3d() {
        let model = SaintVenantKirchhoff::new(1.0, 0.5);
        let mut dd = [0.0; 36];
        model.tangent(&mut dd, &[&[0.0; 6]], 3).unwrap();
        assert_eq!(dd[0], 2.0);
        assert_eq!(dd[1], 1.0);
        assert_eq!(dd[2 * 6 + 0], 1.0);
        assert_eq!(dd[3 * 6 + 3], 0.5);
        assert_eq!(dd[5 * 6 + 5], 0.5);
        assert_eq!(dd[3 * 6 + 0], 0.0);
    }
}
