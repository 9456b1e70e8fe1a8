//! Implements the element residual vectors and tangent matrices of hyperelastic terms
//!
//! The element DOFs are node-major: the component `k` of node `a` is at `k + dim · a`.
//!
//! **Total Lagrangian** (reference gradients `g`, second Piola-Kirchhoff stress `S`):
//!
//! ```text
//! rₐ = Σ_q Bₐᵀ S dV
//! Kₐᵦ = Σ_q (Bₐᵀ D Bᵦ + (gₐᵀ S gᵦ) I) dV
//! ```
//!
//! **Updated Lagrangian** (spatial gradients `g̃ = F⁻ᵀ g`, Kirchhoff stress `τ`, spatial
//! moduli `c`): same expressions with `B̃`, `τ`, `c` and `g̃`, still integrated over the
//! reference volume.

use super::WeakArgs;
use crate::base::sym_tensor::{sym_pairs, sym_to_matrix};
use crate::base::{Formulation, QpArray, WeakKind};
use crate::Error;
use russell_lab::{mat_inverse, mat_mat_mul, mat_t_mat_mul, vec_mat_mul, Matrix, Vector};

/// Computes the residual vectors or tangent matrices of all elements
///
/// # Input
///
/// * `out` -- `[n_el, 1, n_dof, 1]` (residual) or `[n_el, 1, n_dof, n_dof]` (tangent)
/// * `args` -- stress, tangent, family data and mapping
/// * `parallel` -- run the element loop with rayon
pub fn assemble(out: &mut QpArray, args: &WeakArgs, parallel: bool) -> Result<(), Error> {
    let mapping = args.mapping.as_ref();
    let dim = mapping.dim();
    let (n_el, n_qp, n_node) = (mapping.n_el(), mapping.n_qp(), mapping.n_node());
    let n_dof = dim * n_node;
    let pairs = sym_pairs(dim);
    let sym = pairs.len();
    let correct = match args.kind {
        WeakKind::Residual => [n_el, 1, n_dof, 1],
        WeakKind::Tangent => [n_el, 1, n_dof, n_dof],
    };
    if out.shape() != correct {
        return Err(Error::ShapeMismatch(format!(
            "weak output with shape {:?} must have shape {:?}",
            out.shape(),
            correct
        )));
    }
    if args.stress.shape() != [n_el, n_qp, sym, 1] {
        return Err(Error::ShapeMismatch(format!(
            "stress with shape {:?} must have shape {:?}",
            args.stress.shape(),
            [n_el, n_qp, sym, 1]
        )));
    }
    if args.kind == WeakKind::Tangent && args.tangent.shape() != [n_el, n_qp, sym, sym] {
        return Err(Error::ShapeMismatch(format!(
            "tangent with shape {:?} must have shape {:?}",
            args.tangent.shape(),
            [n_el, n_qp, sym, sym]
        )));
    }
    let family = args.family.as_ref();
    out.for_each_cell_mut(parallel, |e, res| {
        res.iter_mut().for_each(|x| *x = 0.0);
        // Gᵀ (dim × n_node) in the configuration of the formulation
        let mut ggt = Matrix::new(dim, n_node);
        let mut ff = Matrix::identity(dim);
        let mut fi = Matrix::new(dim, dim);
        let mut bb = Matrix::new(sym, n_dof);
        let mut sv = Vector::new(sym);
        let mut rr = Vector::new(n_dof);
        let mut kk = Matrix::new(n_dof, n_dof);
        let mut db = Matrix::new(sym, n_dof);
        let mut sgt = Matrix::new(dim, n_node);
        let mut gsg = Matrix::new(n_node, n_node);
        for q in 0..n_qp {
            let dv = mapping.dv(e, q);
            let g0 = mapping.gradient(e, q);
            let g0t = Matrix::initialized(dim, n_node, |j, a| g0[a * dim + j]);
            let fq = family.mtx_f.block(e, q);

            // kinematics
            match args.formulation {
                Formulation::Total => {
                    ff = Matrix::initialized(dim, dim, |i, j| fq[i * dim + j]);
                    ggt = g0t;
                }
                Formulation::Updated => {
                    let jj = family.det_f.get(e, q, 0, 0);
                    if jj <= 0.0 {
                        return Err(Error::DegenerateDeformation(format!(
                            "det(F) = {:?} at element {}, point {}",
                            jj, e, q
                        )));
                    }
                    // g̃ = F⁻ᵀ g
                    mat_inverse(&mut fi, &Matrix::initialized(dim, dim, |i, j| fq[i * dim + j]))?;
                    mat_t_mat_mul(&mut ggt, 1.0, &fi, &g0t, 0.0)?;
                }
            }

            // B matrix (sym × n_dof)
            for (s, &(i, j)) in pairs.iter().enumerate() {
                for a in 0..n_node {
                    for k in 0..dim {
                        let value = if i == j {
                            ff.get(k, i) * ggt.get(i, a)
                        } else {
                            ff.get(k, i) * ggt.get(j, a) + ff.get(k, j) * ggt.get(i, a)
                        };
                        bb.set(s, k + dim * a, value);
                    }
                }
            }

            let sig = args.stress.block(e, q);
            match args.kind {
                WeakKind::Residual => {
                    // r += Bᵀ σ dV
                    sv.set_vector(sig);
                    vec_mat_mul(&mut rr, dv, &sv, &bb)?;
                    for (r, x) in res.iter_mut().zip(rr.as_data()) {
                        *r += x;
                    }
                }
                WeakKind::Tangent => {
                    // material part: K += Bᵀ D B dV
                    let t = args.tangent.block(e, q);
                    let dd = Matrix::initialized(sym, sym, |s, u| t[s * sym + u]);
                    mat_mat_mul(&mut db, 1.0, &dd, &bb, 0.0)?;
                    mat_t_mat_mul(&mut kk, dv, &bb, &db, 1.0)?;

                    // geometric part: Kₐᵦ += (gₐᵀ σ gᵦ) I dV
                    mat_mat_mul(&mut sgt, 1.0, &sym_to_matrix(sig, dim), &ggt, 0.0)?;
                    mat_t_mat_mul(&mut gsg, dv, &ggt, &sgt, 0.0)?;
                    for a in 0..n_node {
                        for b in 0..n_node {
                            for k in 0..dim {
                                kk.add(k + dim * a, k + dim * b, gsg.get(a, b));
                            }
                        }
                    }
                }
            }
        }
        if args.kind == WeakKind::Tangent {
            for r in 0..n_dof {
                for c in 0..n_dof {
                    res[r * n_dof + c] = kk.get(r, c);
                }
            }
        }
        Ok(())
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::assemble;
    use crate::base::{FamilyKind, Formulation, QpArray, WeakKind};
    use crate::fem::{FamilyData, VolumeMapping, WeakArgs};
    use crate::Error;
    use russell_lab::approx_eq;
    use std::sync::Arc;

    // one Tri3 with unit-square legs: N₀ = 1 - x - y, N₁ = x, N₂ = y
    fn tri3_args(kind: WeakKind, formulation: Formulation, ff: [f64; 4], sig: [f64; 3]) -> WeakArgs {
        let gradients = vec![-1.0, -1.0, 1.0, 0.0, 0.0, 1.0];
        let mapping = VolumeMapping::new(2, 1, 3, gradients, vec![0.5]).unwrap();
        let family_kind = match formulation {
            Formulation::Total => FamilyKind::TotalLagrangian,
            Formulation::Updated => FamilyKind::UpdatedLagrangian,
        };
        let mut family = FamilyData::empty(family_kind, 1, 1, 2);
        family.mtx_f.as_mut_data().copy_from_slice(&ff);
        family.det_f.as_mut_data()[0] = ff[0] * ff[3] - ff[1] * ff[2];
        let tangent = match kind {
            WeakKind::Residual => QpArray::new([1, 1, 1, 1]),
            WeakKind::Tangent => QpArray::new([1, 1, 3, 3]),
        };
        WeakArgs {
            stress: Arc::new(QpArray::from_data([1, 1, 3, 1], sig.to_vec()).unwrap()),
            tangent,
            family: Arc::new(family),
            mapping: Arc::new(mapping),
            kind,
            formulation,
        }
    }

    #[test]
    fn assemble_handles_errors() {
        let args = tri3_args(WeakKind::Residual, Formulation::Total, [1.0, 0.0, 0.0, 1.0], [0.0; 3]);
        let mut out = QpArray::new([1, 1, 6, 6]);
        assert_eq!(
            assemble(&mut out, &args, false).err(),
            Some(Error::ShapeMismatch(
                "weak output with shape [1, 1, 6, 6] must have shape [1, 1, 6, 1]".to_string()
            ))
        );
        let args = tri3_args(WeakKind::Residual, Formulation::Updated, [-1.0, 0.0, 0.0, 1.0], [0.0; 3]);
        let mut out = QpArray::new([1, 1, 6, 1]);
        assert_eq!(
            assemble(&mut out, &args, false).err(),
            Some(Error::DegenerateDeformation(
                "det(F) = -1.0 at element 0, point 0".to_string()
            ))
        );
    }

    #[test]
    fn residual_works() {
        // F = I and uniform σₓₓ = 2: rₐ = gₐ σ A
        let args = tri3_args(WeakKind::Residual, Formulation::Total, [1.0, 0.0, 0.0, 1.0], [2.0, 0.0, 0.0]);
        let mut out = QpArray::new([1, 1, 6, 1]);
        assemble(&mut out, &args, true).unwrap();
        let correct = [-1.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        for i in 0..6 {
            approx_eq(out.get(0, 0, i, 0), correct[i], 1e-15);
        }
        // the internal forces are self-equilibrated
        let fx: f64 = (0..3).map(|a| out.get(0, 0, 2 * a, 0)).sum();
        let fy: f64 = (0..3).map(|a| out.get(0, 0, 2 * a + 1, 0)).sum();
        approx_eq(fx, 0.0, 1e-15);
        approx_eq(fy, 0.0, 1e-15);
    }

    #[test]
    fn tangent_works_geometric_part() {
        // D = 0 and uniform S = s I: Kₐᵦ = s (gₐ · gᵦ) A I
        let s = 3.0;
        let args = tri3_args(WeakKind::Tangent, Formulation::Total, [1.0, 0.0, 0.0, 1.0], [s, s, 0.0]);
        let mut out = QpArray::new([1, 1, 6, 6]);
        assemble(&mut out, &args, false).unwrap();
        let g = [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]];
        for a in 0..3 {
            for b in 0..3 {
                let dot = g[a][0] * g[b][0] + g[a][1] * g[b][1];
                approx_eq(out.get(0, 0, 2 * a, 2 * b), s * dot * 0.5, 1e-15);
                approx_eq(out.get(0, 0, 2 * a + 1, 2 * b + 1), s * dot * 0.5, 1e-15);
                approx_eq(out.get(0, 0, 2 * a, 2 * b + 1), 0.0, 1e-15);
            }
        }
    }

    #[test]
    fn updated_lagrangian_pushes_gradients_forward() {
        // F = diag(2, 1), τ = diag(4, 0) ⇔ S = F⁻¹ τ F⁻ᵀ = diag(1, 0)
        let ff = [2.0, 0.0, 0.0, 1.0];
        let ul = tri3_args(WeakKind::Residual, Formulation::Updated, ff, [4.0, 0.0, 0.0]);
        let tl = tri3_args(WeakKind::Residual, Formulation::Total, ff, [1.0, 0.0, 0.0]);
        let mut r_ul = QpArray::new([1, 1, 6, 1]);
        let mut r_tl = QpArray::new([1, 1, 6, 1]);
        assemble(&mut r_ul, &ul, false).unwrap();
        assemble(&mut r_tl, &tl, false).unwrap();
        for i in 0..6 {
            approx_eq(r_ul.get(0, 0, i, 0), r_tl.get(0, 0, i, 0), 1e-15);
        }
        approx_eq(r_tl.get(0, 0, 2, 0), 1.0, 1e-15);
    }
}
