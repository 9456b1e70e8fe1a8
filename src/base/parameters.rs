use crate::Error;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds parameters for hyperelastic material laws
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamHyperelastic {
    /// Saint Venant-Kirchhoff model (total Lagrangian)
    ///
    /// ```text
    /// S = λ tr(E) I + 2 μ E
    /// ```
    SaintVenantKirchhoff {
        /// Young's modulus
        young: f64,

        /// Poisson's coefficient
        poisson: f64,
    },

    /// Compressible neo-Hookean model (total Lagrangian)
    ///
    /// ```text
    /// S = μ (I - C⁻¹) + λ ln(J) C⁻¹
    /// ```
    NeoHookean {
        /// Shear modulus μ
        mu: f64,

        /// Lamé's first parameter λ
        lambda: f64,
    },

    /// Compressible neo-Hookean model (updated Lagrangian)
    ///
    /// ```text
    /// τ = μ (b - I) + λ ln(J) I
    /// ```
    NeoHookeanUl {
        /// Shear modulus μ
        mu: f64,

        /// Lamé's first parameter λ
        lambda: f64,
    },
}

impl ParamHyperelastic {
    /// Returns a sample of Saint Venant-Kirchhoff parameters
    pub fn sample_saint_venant_kirchhoff() -> Self {
        ParamHyperelastic::SaintVenantKirchhoff {
            young: 1000.0,
            poisson: 0.25,
        }
    }

    /// Returns a sample of neo-Hookean parameters (total Lagrangian)
    pub fn sample_neo_hookean() -> Self {
        ParamHyperelastic::NeoHookean {
            mu: 400.0,
            lambda: 600.0,
        }
    }

    /// Returns a sample of neo-Hookean parameters (updated Lagrangian)
    pub fn sample_neo_hookean_ul() -> Self {
        ParamHyperelastic::NeoHookeanUl {
            mu: 400.0,
            lambda: 600.0,
        }
    }

    /// Returns the Lamé parameters (λ, μ)
    pub fn lame(&self) -> Result<(f64, f64), Error> {
        match *self {
            ParamHyperelastic::SaintVenantKirchhoff { young, poisson } => {
                if young <= 0.0 {
                    return Err(Error::InvalidParameter("Young's modulus must be > 0.0".to_string()));
                }
                if poisson <= -1.0 || poisson >= 0.5 {
                    return Err(Error::InvalidParameter(
                        "Poisson's coefficient must be in (-1.0, 0.5)".to_string(),
                    ));
                }
                let lambda = young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
                let mu = young / (2.0 * (1.0 + poisson));
                Ok((lambda, mu))
            }
            ParamHyperelastic::NeoHookean { mu, lambda } | ParamHyperelastic::NeoHookeanUl { mu, lambda } => {
                if mu <= 0.0 {
                    return Err(Error::InvalidParameter("shear modulus μ must be > 0.0".to_string()));
                }
                if lambda < 0.0 {
                    return Err(Error::InvalidParameter("Lamé's λ must be ≥ 0.0".to_string()));
                }
                Ok((lambda, mu))
            }
        }
    }

    /// Reads a JSON file containing the parameters
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, Error>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| Error::InvalidParameter("cannot open file".to_string()))?;
        let buffered = BufReader::new(input);
        let param = serde_json::from_reader(buffered)
            .map_err(|_| Error::InvalidParameter("cannot parse JSON file".to_string()))?;
        Ok(param)
    }

    /// Writes a JSON file with the parameters
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), Error>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| Error::InvalidParameter("cannot create directory".to_string()))?;
        }
        let mut file = File::create(&path).map_err(|_| Error::InvalidParameter("cannot create file".to_string()))?;
        serde_json::to_writer(&mut file, &self).map_err(|_| Error::InvalidParameter("cannot write file".to_string()))?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ParamHyperelastic;
    use crate::Error;
    use russell_lab::approx_eq;

    #[test]
    fn lame_works() {
        let (lambda, mu) = ParamHyperelastic::sample_saint_venant_kirchhoff().lame().unwrap();
        approx_eq(lambda, 400.0, 1e-12);
        approx_eq(mu, 400.0, 1e-12);
        let (lambda, mu) = ParamHyperelastic::sample_neo_hookean().lame().unwrap();
        assert_eq!((lambda, mu), (600.0, 400.0));
    }

    #[test]
    fn lame_handles_errors() {
        let p = ParamHyperelastic::SaintVenantKirchhoff {
            young: 0.0,
            poisson: 0.2,
        };
        assert_eq!(
            p.lame().err(),
            Some(Error::InvalidParameter("Young's modulus must be > 0.0".to_string()))
        );
        let p = ParamHyperelastic::SaintVenantKirchhoff {
            young: 1.0,
            poisson: 0.5,
        };
        assert_eq!(
            p.lame().err(),
            Some(Error::InvalidParameter(
                "Poisson's coefficient must be in (-1.0, 0.5)".to_string()
            ))
        );
        let p = ParamHyperelastic::NeoHookeanUl { mu: -1.0, lambda: 1.0 };
        assert_eq!(
            p.lame().err(),
            Some(Error::InvalidParameter("shear modulus μ must be > 0.0".to_string()))
        );
        let p = ParamHyperelastic::NeoHookean { mu: 1.0, lambda: -1.0 };
        assert_eq!(
            p.lame().err(),
            Some(Error::InvalidParameter("Lamé's λ must be ≥ 0.0".to_string()))
        );
    }

    #[test]
    fn read_and_write_json_work() {
        let param = ParamHyperelastic::sample_neo_hookean_ul();
        let full_path = "/tmp/hyperelast/test_param_hyperelastic.json";
        param.write_json(full_path).unwrap();
        let read = ParamHyperelastic::read_json(full_path).unwrap();
        assert_eq!(read, param);
        assert_eq!(
            ParamHyperelastic::read_json("/tmp/hyperelast/__does_not_exist__.json").err(),
            Some(Error::InvalidParameter("cannot open file".to_string()))
        );
    }
}
