use super::{calc_def_grad, VolumeMapping};
use crate::base::sym_tensor::{
    left_cauchy_green, right_cauchy_green, sym_inverse, sym_pairs, sym_second_invariant, sym_size, sym_trace,
};
use crate::base::{FamilyField, FamilyKind, QpArray};
use crate::Error;
use russell_lab::Vector;
use std::collections::BTreeMap;

/// Holds the kinematic quantities shared by all hyperelastic terms of a family
///
/// All arrays have shape `[n_el, n_qp, nrow, ncol]` where the block shape is given by
/// [FamilyField::block_shape].
#[derive(Clone, Debug)]
pub struct FamilyData {
    /// Family that produced this data
    pub kind: FamilyKind,

    /// Deformation gradient F `[n_el, n_qp, dim, dim]`
    pub mtx_f: QpArray,

    /// J = det(F) `[n_el, n_qp, 1, 1]`
    pub det_f: QpArray,

    /// Green strain E = ½(C - I) `[n_el, n_qp, sym, 1]`
    pub green_strain: QpArray,

    /// Family-specific fields (e.g., C⁻¹ for TL, b for UL)
    extra: BTreeMap<FamilyField, QpArray>,
}

impl FamilyData {
    /// Allocates zeroed family data with all fields of the family
    pub fn empty(kind: FamilyKind, n_el: usize, n_qp: usize, dim: usize) -> Self {
        let alloc = |field: FamilyField| {
            let (nrow, ncol) = field.block_shape(dim);
            QpArray::new([n_el, n_qp, nrow, ncol])
        };
        let extra = kind
            .fields()
            .iter()
            .filter(|f| !matches!(f, FamilyField::DefGrad | FamilyField::DetF | FamilyField::GreenStrain))
            .map(|&f| (f, alloc(f)))
            .collect();
        FamilyData {
            kind,
            mtx_f: alloc(FamilyField::DefGrad),
            det_f: alloc(FamilyField::DetF),
            green_strain: alloc(FamilyField::GreenStrain),
            extra,
        }
    }

    /// Computes the family data from the field coefficients
    ///
    /// # Input
    ///
    /// * `kind` -- the family
    /// * `coefficients` -- node-major field values
    /// * `mapping` -- geometry mapping of the region
    /// * `connectivity` -- point indices of each element
    /// * `parallel` -- run the element loops with rayon
    pub fn compute(
        kind: FamilyKind,
        coefficients: &Vector,
        mapping: &VolumeMapping,
        connectivity: &[Vec<usize>],
        parallel: bool,
    ) -> Result<Self, Error> {
        let dim = mapping.dim();
        let sym = sym_size(dim);
        let mut data = FamilyData::empty(kind, mapping.n_el(), mapping.n_qp(), dim);
        calc_def_grad(
            &mut data.mtx_f,
            Some(&mut data.det_f),
            coefficients,
            mapping,
            connectivity,
            parallel,
        )?;
        let (tensor, trace, invariant) = match kind {
            FamilyKind::TotalLagrangian => (FamilyField::SymC, FamilyField::TrC, FamilyField::In2C),
            FamilyKind::UpdatedLagrangian => (FamilyField::SymB, FamilyField::TrB, FamilyField::In2B),
        };
        let mut sym_tensor = data.take(tensor)?;
        let mut tr = data.take(trace)?;
        let mut in2 = data.take(invariant)?;
        let inv_c = match kind {
            FamilyKind::TotalLagrangian => Some(data.take(FamilyField::SymInvC)?),
            FamilyKind::UpdatedLagrangian => None,
        };
        let n_qp = mapping.n_qp();
        let mtx_f = &data.mtx_f;
        let det_f = &data.det_f;

        // E = ½ (FᵀF - I)
        data.green_strain.for_each_cell_mut(parallel, |e, cell| {
            for q in 0..n_qp {
                let ee = &mut cell[q * sym..(q + 1) * sym];
                right_cauchy_green(ee, mtx_f.block(e, q), dim);
                for (k, &(i, j)) in sym_pairs(dim).iter().enumerate() {
                    if i == j {
                        ee[k] -= 1.0;
                    }
                    ee[k] *= 0.5;
                }
            }
            Ok(())
        })?;

        // C = FᵀF or b = FFᵀ
        sym_tensor.for_each_cell_mut(parallel, |e, cell| {
            for q in 0..n_qp {
                let ss = &mut cell[q * sym..(q + 1) * sym];
                match kind {
                    FamilyKind::TotalLagrangian => right_cauchy_green(ss, mtx_f.block(e, q), dim),
                    FamilyKind::UpdatedLagrangian => left_cauchy_green(ss, mtx_f.block(e, q), dim),
                }
            }
            Ok(())
        })?;

        // invariants
        tr.for_each_cell_mut(parallel, |e, cell| {
            for q in 0..n_qp {
                cell[q] = sym_trace(sym_tensor.block(e, q), dim);
            }
            Ok(())
        })?;
        in2.for_each_cell_mut(parallel, |e, cell| {
            for q in 0..n_qp {
                cell[q] = sym_second_invariant(sym_tensor.block(e, q), dim);
            }
            Ok(())
        })?;

        // C⁻¹ (left zero where J ≤ 0; the laws reading it reject such points)
        if let Some(mut inv_c) = inv_c {
            inv_c.for_each_cell_mut(parallel, |e, cell| {
                for q in 0..n_qp {
                    if det_f.get(e, q, 0, 0) > 0.0 {
                        sym_inverse(&mut cell[q * sym..(q + 1) * sym], sym_tensor.block(e, q), dim)?;
                    }
                }
                Ok(())
            })?;
            data.extra.insert(FamilyField::SymInvC, inv_c);
        }

        data.extra.insert(tensor, sym_tensor);
        data.extra.insert(trace, tr);
        data.extra.insert(invariant, in2);
        Ok(data)
    }

    /// Returns a field by name
    ///
    /// Returns [Error::MissingFamilyData] if this family does not provide the field.
    pub fn get(&self, field: FamilyField) -> Result<&QpArray, Error> {
        match field {
            FamilyField::DefGrad => Ok(&self.mtx_f),
            FamilyField::DetF => Ok(&self.det_f),
            FamilyField::GreenStrain => Ok(&self.green_strain),
            _ => self
                .extra
                .get(&field)
                .ok_or_else(|| Error::MissingFamilyData(field.name().to_string())),
        }
    }

    /// Returns whether the field is available
    pub fn contains(&self, field: FamilyField) -> bool {
        self.get(field).is_ok()
    }

    /// Returns the number of elements
    pub fn n_el(&self) -> usize {
        self.mtx_f.n_el()
    }

    /// Returns the number of quadrature points per element
    pub fn n_qp(&self) -> usize {
        self.mtx_f.n_qp()
    }

    /// Returns the space dimension
    pub fn dim(&self) -> usize {
        self.mtx_f.nrow()
    }

    /// Removes an extra field to fill it while borrowing the others
    fn take(&mut self, field: FamilyField) -> Result<QpArray, Error> {
        self.extra
            .remove(&field)
            .ok_or_else(|| Error::MissingFamilyData(field.name().to_string()))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
