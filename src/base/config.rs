use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Holds configuration data for the evaluation of terms
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Number of integration (Gauss) points per element
    ///
    /// None means the default rule of the element kind.
    pub ngauss: Option<usize>,

    /// Evaluates the element loops in parallel (rayon)
    pub parallel: bool,
}

impl Config {
    /// Allocates a new instance
    pub fn new() -> Self {
        Config {
            ngauss: None,
            parallel: true,
        }
    }

    /// Sets the number of integration (Gauss) points per element
    pub fn set_ngauss(&mut self, value: usize) -> Result<&mut Self, Error> {
        if value == 0 {
            return Err(Error::InvalidParameter("ngauss must be ≥ 1".to_string()));
        }
        self.ngauss = Some(value);
        Ok(self)
    }

    /// Resets the number of integration points to the default of each element kind
    pub fn set_default_ngauss(&mut self) -> &mut Self {
        self.ngauss = None;
        self
    }

    /// Enables or disables the parallel element loops
    pub fn set_parallel(&mut self, flag: bool) -> &mut Self {
        self.parallel = flag;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n")?;
        write!(f, "==================\n")?;
        write!(f, "ngauss = {:?}\n", self.ngauss)?;
        write!(f, "parallel = {:?}\n", self.parallel)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
