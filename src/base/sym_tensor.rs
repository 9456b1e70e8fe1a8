//! Small dense-tensor helpers for 2D and 3D
//!
//! Full tensors are stored as row-major `dim × dim` slices. Symmetric tensors use the
//! storage order `[11, 22, 12]` (2D) or `[11, 22, 33, 12, 13, 23]` (3D) with tensor
//! (not engineering) off-diagonal components.

use crate::StrError;
use russell_lab::{mat_inverse, Matrix};

const PAIRS_2D: [(usize, usize); 3] = [(0, 0), (1, 1), (0, 1)];
const PAIRS_3D: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (0, 1), (0, 2), (1, 2)];

/// Returns the number of components of a symmetric tensor: dim (dim + 1) / 2
#[inline]
pub fn sym_size(dim: usize) -> usize {
    dim * (dim + 1) / 2
}

/// Returns the (i, j) index pairs of the symmetric storage
///
/// # Panics
///
/// A panic will occur if `dim` is not 2 or 3.
pub fn sym_pairs(dim: usize) -> &'static [(usize, usize)] {
    match dim {
        2 => &PAIRS_2D,
        3 => &PAIRS_3D,
        _ => panic!("dim must be 2 or 3"),
    }
}

/// Returns the (i, j) component of a symmetric tensor given in symmetric storage
pub fn sym_get(sym: &[f64], dim: usize, i: usize, j: usize) -> f64 {
    let (i, j) = if i <= j { (i, j) } else { (j, i) };
    if i == j {
        return sym[i];
    }
    match (dim, i, j) {
        (2, 0, 1) => sym[2],
        (3, 0, 1) => sym[3],
        (3, 0, 2) => sym[4],
        (3, 1, 2) => sym[5],
        _ => panic!("invalid symmetric tensor index"),
    }
}

/// Computes the determinant of a 2×2 or 3×3 matrix (closed form)
#[rustfmt::skip]
pub fn determinant(a: &[f64], dim: usize) -> f64 {
    if dim == 2 {
        a[0] * a[3] - a[1] * a[2]
    } else {
        a[0] * (a[4] * a[8] - a[5] * a[7])
      - a[1] * (a[3] * a[8] - a[5] * a[6])
      + a[2] * (a[3] * a[7] - a[4] * a[6])
    }
}

/// Computes C = FᵀF in symmetric storage
pub fn right_cauchy_green(sym: &mut [f64], ff: &[f64], dim: usize) {
    for (k, &(i, j)) in sym_pairs(dim).iter().enumerate() {
        sym[k] = (0..dim).map(|m| ff[m * dim + i] * ff[m * dim + j]).sum();
    }
}

/// Computes b = FFᵀ in symmetric storage
pub fn left_cauchy_green(sym: &mut [f64], ff: &[f64], dim: usize) {
    for (k, &(i, j)) in sym_pairs(dim).iter().enumerate() {
        sym[k] = (0..dim).map(|m| ff[i * dim + m] * ff[j * dim + m]).sum();
    }
}

/// Returns the trace of a symmetric tensor in symmetric storage
pub fn sym_trace(sym: &[f64], dim: usize) -> f64 {
    sym[..dim].iter().sum()
}

/// Returns the second invariant ½ (tr(A)² - A:A) of a symmetric tensor in symmetric storage
pub fn sym_second_invariant(sym: &[f64], dim: usize) -> f64 {
    let tr = sym_trace(sym, dim);
    let diag: f64 = sym[..dim].iter().map(|x| x * x).sum();
    let off: f64 = sym[dim..].iter().map(|x| x * x).sum();
    0.5 * (tr * tr - diag - 2.0 * off)
}

/// Returns the dim × dim matrix of a symmetric tensor given in symmetric storage
pub fn sym_to_matrix(sym: &[f64], dim: usize) -> Matrix {
    Matrix::initialized(dim, dim, |i, j| sym_get(sym, dim, i, j))
}

/// Computes the inverse of a symmetric tensor in symmetric storage
///
/// Returns the determinant or an error if the tensor is singular.
pub fn sym_inverse(inv: &mut [f64], sym: &[f64], dim: usize) -> Result<f64, StrError> {
    let mut ai = Matrix::new(dim, dim);
    let det = mat_inverse(&mut ai, &sym_to_matrix(sym, dim))?;
    for (k, &(i, j)) in sym_pairs(dim).iter().enumerate() {
        inv[k] = ai.get(i, j);
    }
    Ok(det)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
