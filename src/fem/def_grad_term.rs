use super::{calc_def_grad, integrate, FieldState, Region};
use crate::base::{EvalMode, IntegMode, QpArray, TermMode};
use crate::Error;
use std::sync::Arc;

/// Evaluates the deformation gradient F or its determinant J over a region
///
/// This term does not use the evaluate cache: every call computes F from the current
/// coefficients of the field.
pub struct DefGradTerm {
    region: Arc<Region>,
}

impl DefGradTerm {
    /// Name of the term
    pub const NAME: &'static str = "ev_def_grad";

    /// Allocates a new instance
    pub fn new(region: Arc<Region>) -> Self {
        DefGradTerm { region }
    }

    /// Returns the output shape for the given mode
    ///
    /// Returns [Error::UnsupportedEvaluationMode] for `weak` mode and for term modes
    /// other than `def_grad` and `jacobian`.
    pub fn eval_shape(&self, parameter: &FieldState, mode: EvalMode, term_mode: TermMode) -> Result<[usize; 4], Error> {
        let integ = DefGradTerm::integ_mode(mode, term_mode)?;
        let (mapping, _, _) = self.region.get_mapping(parameter)?;
        let d = match term_mode {
            TermMode::Jacobian => 1,
            _ => mapping.dim(),
        };
        let n_qp = match integ {
            IntegMode::PointWise => mapping.n_qp(),
            _ => 1,
        };
        Ok([mapping.n_el(), n_qp, d, d])
    }

    /// Evaluates F (`[.., dim, dim]`) or J (`[.., 1, 1]`)
    ///
    /// # Input
    ///
    /// * `parameter` -- the displacement field
    /// * `mode` -- [EvalMode::Eval] (integral), [EvalMode::ElAvg] (average) or [EvalMode::Qp]
    /// * `term_mode` -- [TermMode::DefGrad] or [TermMode::Jacobian]
    pub fn evaluate(&self, parameter: &FieldState, mode: EvalMode, term_mode: TermMode) -> Result<QpArray, Error> {
        let integ = DefGradTerm::integ_mode(mode, term_mode)?;
        let shape = self.eval_shape(parameter, mode, term_mode)?;
        let (mapping, connectivity, _) = self.region.get_mapping(parameter)?;
        let dim = mapping.dim();
        let (n_el, n_qp) = (mapping.n_el(), mapping.n_qp());
        let mut mtx_f = QpArray::new([n_el, n_qp, dim, dim]);
        let mut det_f = QpArray::new([n_el, n_qp, 1, 1]);
        calc_def_grad(
            &mut mtx_f,
            Some(&mut det_f),
            parameter.coefficients(),
            mapping,
            connectivity,
            self.region.parallel(),
        )?;
        log::debug!(
            "{}: {} of {} in region {} ({})",
            DefGradTerm::NAME,
            term_mode,
            parameter.name(),
            self.region.name(),
            mode
        );
        let values = match term_mode {
            TermMode::Jacobian => det_f,
            _ => mtx_f,
        };
        let mut out = QpArray::new(shape);
        integrate(&mut out, &values, mapping, integ)?;
        Ok(out)
    }

    /// Evaluates with solver-facing mode names
    ///
    /// The term mode defaults to `def_grad`.
    pub fn evaluate_named(&self, parameter: &FieldState, mode: &str, term_mode: Option<&str>) -> Result<QpArray, Error> {
        let mode = EvalMode::parse(DefGradTerm::NAME, mode)?;
        let term_mode = match term_mode {
            Some(name) => TermMode::parse(DefGradTerm::NAME, name)?,
            None => TermMode::DefGrad,
        };
        self.evaluate(parameter, mode, term_mode)
    }

    fn integ_mode(mode: EvalMode, term_mode: TermMode) -> Result<IntegMode, Error> {
        let integ = mode
            .integ_mode()
            .ok_or_else(|| Error::unsupported(DefGradTerm::NAME, mode.as_str()))?;
        match term_mode {
            TermMode::DefGrad | TermMode::Jacobian => Ok(integ),
            _ => Err(Error::unsupported(DefGradTerm::NAME, term_mode.as_str())),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
