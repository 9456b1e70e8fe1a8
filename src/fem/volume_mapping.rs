use crate::base::{IntegMode, QpArray};
use crate::Error;

/// Holds the geometry mapping of a set of elements of the same kind
///
/// For each element `e` and quadrature point `q`, stores the gradients of the shape
/// functions with respect to the reference coordinates (`∂Nₘ/∂Xⱼ`, an `n_node × ndim`
/// row-major block) and the integration measure `dV = det(∂X/∂ξ) w`.
#[derive(Clone, Debug)]
pub struct VolumeMapping {
    ndim: usize,
    n_el: usize,
    n_qp: usize,
    n_node: usize,

    /// (n_el × n_qp × n_node × ndim)
    gradients: Vec<f64>,

    /// (n_el × n_qp)
    dv: Vec<f64>,

    /// (n_el)
    volume: Vec<f64>,
}

impl VolumeMapping {
    /// Allocates a new instance from precomputed data
    ///
    /// # Input
    ///
    /// * `ndim` -- space dimension (2 or 3)
    /// * `n_qp` -- number of quadrature points per element
    /// * `n_node` -- number of nodes per element
    /// * `gradients` -- `∂Nₘ/∂Xⱼ` with length `n_el × n_qp × n_node × ndim`
    /// * `dv` -- `det(∂X/∂ξ) w` with length `n_el × n_qp`
    pub fn new(ndim: usize, n_qp: usize, n_node: usize, gradients: Vec<f64>, dv: Vec<f64>) -> Result<Self, Error> {
        if ndim != 2 && ndim != 3 {
            return Err(Error::ShapeMismatch(format!("ndim = {} must be 2 or 3", ndim)));
        }
        if n_qp == 0 || n_node == 0 {
            return Err(Error::ShapeMismatch("n_qp and n_node must be ≥ 1".to_string()));
        }
        if dv.len() % n_qp != 0 {
            return Err(Error::ShapeMismatch(format!(
                "the length of dv ({}) must be a multiple of n_qp ({})",
                dv.len(),
                n_qp
            )));
        }
        let n_el = dv.len() / n_qp;
        if gradients.len() != n_el * n_qp * n_node * ndim {
            return Err(Error::ShapeMismatch(format!(
                "the length of gradients ({}) must equal n_el × n_qp × n_node × ndim ({})",
                gradients.len(),
                n_el * n_qp * n_node * ndim
            )));
        }
        let volume: Vec<f64> = dv.chunks(n_qp).map(|c| c.iter().sum::<f64>()).collect();
        Ok(VolumeMapping {
            ndim,
            n_el,
            n_qp,
            n_node,
            gradients,
            dv,
            volume,
        })
    }

    /// Returns the space dimension
    pub fn dim(&self) -> usize {
        self.ndim
    }

    /// Returns the number of elements
    pub fn n_el(&self) -> usize {
        self.n_el
    }

    /// Returns the number of quadrature points per element
    pub fn n_qp(&self) -> usize {
        self.n_qp
    }

    /// Returns the number of nodes per element
    pub fn n_node(&self) -> usize {
        self.n_node
    }

    /// Returns the shape-function gradients (n_node × ndim, row-major) at a quadrature point
    pub fn gradient(&self, e: usize, q: usize) -> &[f64] {
        let len = self.n_node * self.ndim;
        let start = (e * self.n_qp + q) * len;
        &self.gradients[start..start + len]
    }

    /// Returns the integration measure det(∂X/∂ξ) w at a quadrature point
    pub fn dv(&self, e: usize, q: usize) -> f64 {
        self.dv[e * self.n_qp + q]
    }

    /// Returns the volume (area in 2D) of an element
    pub fn volume(&self, e: usize) -> f64 {
        self.volume[e]
    }

    /// Integrates values given at the quadrature points over each element
    ///
    /// # Input
    ///
    /// * `out` -- `[n_el, 1, nrow, ncol]` results
    /// * `values` -- `[n_el, n_qp, nrow, ncol]` values at quadrature points
    /// * `mode` -- [IntegMode::Integral] (Σ v dV) or [IntegMode::Average] (Σ v dV / Σ dV)
    ///
    /// Returns [Error::IntegrationFailure] if the shapes do not match or an element has a
    /// non-positive volume (e.g., an inverted or degenerate element).
    pub fn integrate(&self, out: &mut QpArray, values: &QpArray, mode: IntegMode) -> Result<(), Error> {
        if mode == IntegMode::PointWise {
            return Err(Error::IntegrationFailure(
                "the mapping cannot integrate in point-wise mode".to_string(),
            ));
        }
        let [n_el, n_qp, nrow, ncol] = values.shape();
        if n_el != self.n_el || n_qp != self.n_qp {
            return Err(Error::IntegrationFailure(format!(
                "values with shape {:?} do not match the mapping (n_el = {}, n_qp = {})",
                values.shape(),
                self.n_el,
                self.n_qp
            )));
        }
        if out.shape() != [n_el, 1, nrow, ncol] {
            return Err(Error::IntegrationFailure(format!(
                "output with shape {:?} must have shape {:?}",
                out.shape(),
                [n_el, 1, nrow, ncol]
            )));
        }
        let len = nrow * ncol;
        for e in 0..n_el {
            let volume = self.volume[e];
            if volume <= 0.0 {
                return Err(Error::IntegrationFailure(format!(
                    "element {} has a non-positive volume ({:?})",
                    e, volume
                )));
            }
            let res = out.block_mut(e, 0);
            res.iter_mut().for_each(|x| *x = 0.0);
            for q in 0..n_qp {
                let dv = self.dv[e * n_qp + q];
                let val = values.block(e, q);
                for k in 0..len {
                    res[k] += val[k] * dv;
                }
            }
            if mode == IntegMode::Average {
                res.iter_mut().for_each(|x| *x /= volume);
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
