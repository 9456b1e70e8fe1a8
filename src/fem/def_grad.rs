use super::VolumeMapping;
use crate::base::sym_tensor::determinant;
use crate::base::QpArray;
use crate::Error;
use russell_lab::Vector;

/// Computes the deformation gradient F = I + ∂u/∂X at every quadrature point
///
/// ```text
/// Fᵢⱼ = δᵢⱼ + Σₘ uᵐᵢ ∂Nₘ/∂Xⱼ
/// ```
///
/// # Input
///
/// * `mtx_f` -- `[n_el, n_qp, dim, dim]` output
/// * `det_f` -- optional `[n_el, n_qp, 1, 1]` output for J = det(F)
/// * `coefficients` -- node-major displacement values `u[dim * node + i]`
/// * `mapping` -- geometry mapping
/// * `connectivity` -- point indices of each element
/// * `parallel` -- run the element loop with rayon
pub fn calc_def_grad(
    mtx_f: &mut QpArray,
    det_f: Option<&mut QpArray>,
    coefficients: &Vector,
    mapping: &VolumeMapping,
    connectivity: &[Vec<usize>],
    parallel: bool,
) -> Result<(), Error> {
    let dim = mapping.dim();
    let (n_el, n_qp, n_node) = (mapping.n_el(), mapping.n_qp(), mapping.n_node());
    if mtx_f.shape() != [n_el, n_qp, dim, dim] {
        return Err(Error::ShapeMismatch(format!(
            "deformation gradient array with shape {:?} must have shape {:?}",
            mtx_f.shape(),
            [n_el, n_qp, dim, dim]
        )));
    }
    if connectivity.len() != n_el {
        return Err(Error::ShapeMismatch(format!(
            "connectivity has {} elements but the mapping has {}",
            connectivity.len(),
            n_el
        )));
    }
    let n_coef = coefficients.dim();
    for conn in connectivity {
        if conn.len() != n_node {
            return Err(Error::ShapeMismatch(format!(
                "element connectivity {:?} must have {} nodes",
                conn, n_node
            )));
        }
        if let Some(m) = conn.iter().find(|&&m| dim * m + dim > n_coef) {
            return Err(Error::ShapeMismatch(format!(
                "node {} requires more than {} coefficients",
                m, n_coef
            )));
        }
    }
    let uu = coefficients.as_data();
    let block = dim * dim;
    mtx_f.for_each_cell_mut(parallel, |e, cell| {
        let conn = &connectivity[e];
        for q in 0..n_qp {
            let gg = mapping.gradient(e, q);
            let ff = &mut cell[q * block..(q + 1) * block];
            for i in 0..dim {
                for j in 0..dim {
                    let mut sum = if i == j { 1.0 } else { 0.0 };
                    for (m, &node) in conn.iter().enumerate() {
                        sum += uu[dim * node + i] * gg[m * dim + j];
                    }
                    ff[i * dim + j] = sum;
                }
            }
        }
        Ok(())
    })?;
    if let Some(det_f) = det_f {
        if det_f.shape() != [n_el, n_qp, 1, 1] {
            return Err(Error::ShapeMismatch(format!(
                "determinant array with shape {:?} must have shape {:?}",
                det_f.shape(),
                [n_el, n_qp, 1, 1]
            )));
        }
        let mtx_f = &*mtx_f;
        det_f.for_each_cell_mut(parallel, |e, cell| {
            for q in 0..n_qp {
                cell[q] = determinant(mtx_f.block(e, q), dim);
            }
            Ok(())
        })?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::calc_def_grad;
    use crate::base::{Config, QpArray, SampleMeshes};
    use crate::fem::{FieldState, Region, VolumeMapping};
    use crate::Error;
    use russell_lab::{approx_eq, Vector};

    #[test]
    fn calc_def_grad_handles_errors() {
        let mapping = VolumeMapping::new(2, 1, 3, vec![0.0; 6], vec![0.5]).unwrap();
        let uu = Vector::new(6);
        let mut wrong = QpArray::new([1, 1, 3, 3]);
        assert_eq!(
            calc_def_grad(&mut wrong, None, &uu, &mapping, &[vec![0, 1, 2]], false).err(),
            Some(Error::ShapeMismatch(
                "deformation gradient array with shape [1, 1, 3, 3] must have shape [1, 1, 2, 2]".to_string()
            ))
        );
        let mut mtx_f = QpArray::new([1, 1, 2, 2]);
        assert_eq!(
            calc_def_grad(&mut mtx_f, None, &uu, &mapping, &[], false).err(),
            Some(Error::ShapeMismatch(
                "connectivity has 0 elements but the mapping has 1".to_string()
            ))
        );
        assert_eq!(
            calc_def_grad(&mut mtx_f, None, &uu, &mapping, &[vec![0, 1, 3]], false).err(),
            Some(Error::ShapeMismatch("node 3 requires more than 6 coefficients".to_string()))
        );
        let mut det_f = QpArray::new([1, 2, 1, 1]);
        assert_eq!(
            calc_def_grad(&mut mtx_f, Some(&mut det_f), &uu, &mapping, &[vec![0, 1, 2]], false).err(),
            Some(Error::ShapeMismatch(
                "determinant array with shape [1, 2, 1, 1] must have shape [1, 1, 1, 1]".to_string()
            ))
        );
    }

    #[test]
    fn calc_def_grad_works_uniform_stretch() {
        let mesh = SampleMeshes::two_qua4();
        let region = Region::new("omega", &mesh, &[0, 1], &Config::new()).unwrap();
        let lambda = 1.1;
        let field = FieldState::new("u", 2, SampleMeshes::uniform_stretch(&mesh, lambda)).unwrap();
        let (mapping, connectivity, _) = region.get_mapping(&field).unwrap();
        let mut mtx_f = QpArray::new([2, 4, 2, 2]);
        let mut det_f = QpArray::new([2, 4, 1, 1]);
        calc_def_grad(
            &mut mtx_f,
            Some(&mut det_f),
            field.coefficients(),
            mapping,
            connectivity,
            true,
        )
        .unwrap();
        for e in 0..2 {
            for q in 0..4 {
                approx_eq(mtx_f.get(e, q, 0, 0), lambda, 1e-14);
                approx_eq(mtx_f.get(e, q, 0, 1), 0.0, 1e-14);
                approx_eq(mtx_f.get(e, q, 1, 0), 0.0, 1e-14);
                approx_eq(mtx_f.get(e, q, 1, 1), lambda, 1e-14);
                approx_eq(det_f.get(e, q, 0, 0), lambda * lambda, 1e-14);
            }
        }
    }

    #[test]
    fn calc_def_grad_works_zero_displacement_3d() {
        let mesh = SampleMeshes::one_hex8();
        let region = Region::new("cube", &mesh, &[0], &Config::new()).unwrap();
        let field = FieldState::new("u", 3, Vector::new(24)).unwrap();
        let (mapping, connectivity, _) = region.get_mapping(&field).unwrap();
        let mut mtx_f = QpArray::new([1, 8, 3, 3]);
        let mut det_f = QpArray::new([1, 8, 1, 1]);
        calc_def_grad(
            &mut mtx_f,
            Some(&mut det_f),
            field.coefficients(),
            mapping,
            connectivity,
            false,
        )
        .unwrap();
        for q in 0..8 {
            for i in 0..3 {
                for j in 0..3 {
                    let correct = if i == j { 1.0 } else { 0.0 };
                    approx_eq(mtx_f.get(0, q, i, j), correct, 1e-15);
                }
            }
            approx_eq(det_f.get(0, q, 0, 0), 1.0, 1e-15);
        }
    }
}
