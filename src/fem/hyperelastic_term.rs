use super::{integrate, weak, DataKey, FamilyData, FieldState, IterateId, Region, VolumeMapping};
use crate::base::sym_tensor::sym_size;
use crate::base::{EvalMode, FamilyKind, Formulation, IntegMode, QpArray, TermMode, WeakKind};
use crate::material::Material;
use crate::Error;
use std::sync::Arc;

/// Holds the arguments of the weak-form kernels
#[derive(Clone, Debug)]
pub struct WeakArgs {
    /// Stress (S for TL, τ for UL) `[n_el, n_qp, sym, 1]`
    pub stress: Arc<QpArray>,

    /// Tangent moduli `[n_el, n_qp, sym, sym]` or the `[1, 1, 1, 1]` placeholder (residual)
    pub tangent: QpArray,

    /// Kinematic family data (F, J, ...)
    pub family: Arc<FamilyData>,

    /// Geometry mapping
    pub mapping: Arc<VolumeMapping>,

    /// Residual or tangent
    pub kind: WeakKind,

    /// Total or updated Lagrangian
    pub formulation: Formulation,
}

/// Holds the arguments prepared by [HyperelasticTerm::get_args]
#[derive(Clone, Debug)]
pub enum TermArgs {
    /// Weak-form contribution
    Weak(WeakArgs),

    /// Values at quadrature points to be reduced by [integrate]
    Integrate {
        values: QpArray,
        mapping: Arc<VolumeMapping>,
        mode: IntegMode,
    },
}

/// Identifies the linearization point of a stored stress
#[derive(Clone, Debug, PartialEq, Eq)]
struct StressStamp {
    field: String,
    step: i32,
    iterate: IterateId,
}

/// Implements a hyperelastic term: family-data lookup and stress/tangent dispatch
///
/// The term owns a single-slot stress cache: the stress computed for a residual is
/// reused by the tangent requested at the same iterate of the same field.
pub struct HyperelasticTerm {
    name: String,
    region: Arc<Region>,
    material: Material,
    kind: FamilyKind,
    last_stress: Option<(StressStamp, Arc<QpArray>)>,
}

impl HyperelasticTerm {
    /// Allocates a new instance
    ///
    /// Returns [Error::MissingFamilyData] if the material requires a field that its
    /// family does not provide.
    pub fn new(region: Arc<Region>, material: Material) -> Result<Self, Error> {
        let kind = material.actual.formulation().family_kind();
        if let Some(field) = material.actual.required_fields().iter().find(|f| !kind.provides(**f)) {
            return Err(Error::MissingFamilyData(format!(
                "{} is not provided by {}",
                field.name(),
                kind.cache_name()
            )));
        }
        Ok(HyperelasticTerm {
            name: material.actual.name().to_string(),
            region,
            material,
            kind,
            last_stress: None,
        })
    }

    /// Returns the name of the term
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the family of the kinematic data used by this term
    pub fn family_kind(&self) -> FamilyKind {
        self.kind
    }

    /// Returns whether a stress is stored for the current iterate of the field
    pub fn has_cached_stress(&self, state: &FieldState) -> bool {
        match &self.last_stress {
            Some((stamp, _)) => *stamp == HyperelasticTerm::stamp(state),
            None => false,
        }
    }

    /// Drops the stored stress
    pub fn invalidate_stress(&mut self) {
        self.last_stress = None;
    }

    /// Returns the family data of the field, computing it on a cache miss
    pub fn get_family_data(&self, state: &FieldState) -> Result<Arc<FamilyData>, Error> {
        let (mapping, connectivity, key) = self.region.get_mapping(state)?;
        let data_key = DataKey {
            mapping: key.clone(),
            derivative: state.derivative(),
        };
        let parallel = self.region.parallel();
        state
            .evaluate_cache()
            .get_or_compute(self.kind, state.step(), &data_key, state.iterate(), |may_parallel| {
                FamilyData::compute(
                    self.kind,
                    state.coefficients(),
                    mapping,
                    connectivity,
                    parallel && may_parallel,
                )
            })
    }

    /// Computes the stress at all quadrature points `[n_el, n_qp, sym, 1]`
    pub fn compute_stress(&self, family: &FamilyData) -> Result<QpArray, Error> {
        let sym = sym_size(family.dim());
        let mut stress = QpArray::new([family.n_el(), family.n_qp(), sym, 1]);
        self.run_law(&mut stress, family, sym, false)?;
        log::debug!("{}: stress computed in region {}", self.name, self.region.name());
        Ok(stress)
    }

    /// Computes the tangent moduli at all quadrature points `[n_el, n_qp, sym, sym]`
    pub fn compute_tangent(&self, family: &FamilyData) -> Result<QpArray, Error> {
        let sym = sym_size(family.dim());
        let mut tangent = QpArray::new([family.n_el(), family.n_qp(), sym, sym]);
        self.run_law(&mut tangent, family, sym * sym, true)?;
        log::debug!("{}: tangent computed in region {}", self.name, self.region.name());
        Ok(tangent)
    }

    /// Returns the output shape
    ///
    /// * weak residual: `[n_el, 1, dim × n_node, 1]`
    /// * weak tangent: `[n_el, 1, dim × n_node, dim × n_node]`
    /// * el_avg: `[n_el, 1, sym, 1]`
    /// * qp: `[n_el, n_qp, sym, 1]`
    pub fn eval_shape(
        &self,
        state: &FieldState,
        mode: EvalMode,
        term_mode: TermMode,
        diff_var: Option<&str>,
    ) -> Result<[usize; 4], Error> {
        self.check_mode(mode, term_mode)?;
        let (mapping, _, _) = self.region.get_mapping(state)?;
        let (dim, n_el) = (mapping.dim(), mapping.n_el());
        let shape = match mode {
            EvalMode::Weak => {
                let n_dof = dim * mapping.n_node();
                match diff_var {
                    None => [n_el, 1, n_dof, 1],
                    Some(_) => [n_el, 1, n_dof, n_dof],
                }
            }
            EvalMode::Qp => [n_el, mapping.n_qp(), sym_size(dim), 1],
            _ => [n_el, 1, sym_size(dim), 1],
        };
        Ok(shape)
    }

    /// Prepares the arguments of the weak-form kernels or of the integration
    ///
    /// # Input
    ///
    /// * `virtual_field` -- the test function (must match the state in dim and nodes)
    /// * `state` -- the displacement field
    /// * `mode` -- the evaluation mode
    /// * `term_mode` -- stress or strain for the `el_avg` and `qp` modes (ignored by `weak`)
    /// * `diff_var` -- `Some(name)` requests the tangent in `weak` mode
    pub fn get_args(
        &mut self,
        virtual_field: &FieldState,
        state: &FieldState,
        mode: EvalMode,
        term_mode: TermMode,
        diff_var: Option<&str>,
    ) -> Result<TermArgs, Error> {
        self.check_mode(mode, term_mode)?;
        if virtual_field.dim() != state.dim() || virtual_field.n_node() != state.n_node() {
            return Err(Error::ShapeMismatch(format!(
                "virtual field {} ({} × {}) does not match field {} ({} × {})",
                virtual_field.name(),
                virtual_field.n_node(),
                virtual_field.dim(),
                state.name(),
                state.n_node(),
                state.dim()
            )));
        }
        let family = self.get_family_data(state)?;
        let (mapping, _, _) = self.region.get_mapping(state)?;
        let mapping = mapping.clone();
        match mode {
            EvalMode::Weak => {
                let stamp = HyperelasticTerm::stamp(state);
                let (stress, tangent, kind) = match diff_var {
                    None => {
                        let stress = Arc::new(self.compute_stress(&family)?);
                        self.last_stress = Some((stamp, stress.clone()));
                        (stress, QpArray::new([1, 1, 1, 1]), WeakKind::Residual)
                    }
                    Some(var) => {
                        let stress = match &self.last_stress {
                            Some((last, stress)) if *last == stamp => {
                                log::trace!("{}: reusing the stress of iterate {}", self.name, stamp.iterate);
                                stress.clone()
                            }
                            _ => {
                                let stress = Arc::new(self.compute_stress(&family)?);
                                self.last_stress = Some((stamp, stress.clone()));
                                stress
                            }
                        };
                        log::debug!("{}: tangent with respect to {}", self.name, var);
                        (stress, self.compute_tangent(&family)?, WeakKind::Tangent)
                    }
                };
                Ok(TermArgs::Weak(WeakArgs {
                    stress,
                    tangent,
                    family,
                    mapping,
                    kind,
                    formulation: self.material.actual.formulation(),
                }))
            }
            _ => {
                let values = match term_mode {
                    TermMode::Strain => family.green_strain.clone(),
                    _ => self.compute_stress(&family)?,
                };
                let integ = mode
                    .integ_mode()
                    .ok_or_else(|| Error::unsupported(&self.name, mode.as_str()))?;
                Ok(TermArgs::Integrate {
                    values,
                    mapping,
                    mode: integ,
                })
            }
        }
    }

    /// Evaluates the term
    ///
    /// See [HyperelasticTerm::get_args] and [HyperelasticTerm::eval_shape].
    pub fn evaluate(
        &mut self,
        virtual_field: &FieldState,
        state: &FieldState,
        mode: EvalMode,
        term_mode: TermMode,
        diff_var: Option<&str>,
    ) -> Result<QpArray, Error> {
        let shape = self.eval_shape(state, mode, term_mode, diff_var)?;
        let args = self.get_args(virtual_field, state, mode, term_mode, diff_var)?;
        let mut out = QpArray::new(shape);
        match args {
            TermArgs::Weak(weak_args) => weak::assemble(&mut out, &weak_args, self.region.parallel())?,
            TermArgs::Integrate { values, mapping, mode } => integrate(&mut out, &values, &mapping, mode)?,
        }
        Ok(out)
    }

    /// Evaluates the term with solver-facing mode names
    ///
    /// The term mode is ignored by `weak` and required by `el_avg` and `qp`.
    pub fn evaluate_named(
        &mut self,
        virtual_field: &FieldState,
        state: &FieldState,
        mode: &str,
        term_mode: Option<&str>,
        diff_var: Option<&str>,
    ) -> Result<QpArray, Error> {
        let mode = EvalMode::parse(&self.name, mode)?;
        let term_mode = match (mode, term_mode) {
            (_, Some(name)) => TermMode::parse(&self.name, name)?,
            (EvalMode::Weak, None) => TermMode::Stress,
            (_, None) => return Err(Error::unsupported(&self.name, mode.as_str())),
        };
        self.evaluate(virtual_field, state, mode, term_mode, diff_var)
    }

    /// Returns an error unless the mode combination is implemented
    fn check_mode(&self, mode: EvalMode, term_mode: TermMode) -> Result<(), Error> {
        match (mode, term_mode) {
            (EvalMode::Weak, _) => Ok(()),
            (EvalMode::ElAvg | EvalMode::Qp, TermMode::Stress | TermMode::Strain) => Ok(()),
            (EvalMode::ElAvg | EvalMode::Qp, _) => Err(Error::unsupported(&self.name, term_mode.as_str())),
            (EvalMode::Eval, _) => Err(Error::unsupported(&self.name, mode.as_str())),
        }
    }

    /// Calls the stress (or tangent) function of the law at all quadrature points
    fn run_law(&self, out: &mut QpArray, family: &FamilyData, block: usize, tangent: bool) -> Result<(), Error> {
        let law = self.material.actual.as_ref();
        let fields = law
            .required_fields()
            .iter()
            .map(|field| family.get(*field))
            .collect::<Result<Vec<_>, _>>()?;
        let (n_qp, dim) = (family.n_qp(), family.dim());
        out.for_each_cell_mut(self.region.parallel(), |e, cell| {
            let mut args: Vec<&[f64]> = Vec::with_capacity(fields.len());
            for q in 0..n_qp {
                args.clear();
                args.extend(fields.iter().map(|values| values.block(e, q)));
                let res = &mut cell[q * block..(q + 1) * block];
                if tangent {
                    law.tangent(res, &args, dim)?;
                } else {
                    law.stress(res, &args, dim)?;
                }
            }
            Ok(())
        })
    }

    fn stamp(state: &FieldState) -> StressStamp {
        StressStamp {
            field: state.name().to_string(),
            step: state.step(),
            iterate: state.iterate(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
