use hyperelast::material::NeoHookean;
use hyperelast::prelude::*;
use russell_lab::{approx_eq, Vector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Reuse of the stress between the residual and the tangent
//
// TEST GOAL
//
// This test verifies that the stress computed for the residual is reused by the tangent
// requested at the same iterate, and recomputed after the iterate advances, after an
// explicit reset or when a new field state with the same name is given

/// Wraps the neo-Hookean law and counts the calls to the stress and tangent functions
struct CountingLaw {
    inner: NeoHookean,
    n_stress: Arc<AtomicUsize>,
    n_tangent: Arc<AtomicUsize>,
}

impl MaterialLaw for CountingLaw {
    fn name(&self) -> &str {
        "dw_tl_he_counting"
    }
    fn formulation(&self) -> Formulation {
        self.inner.formulation()
    }
    fn required_fields(&self) -> &[FamilyField] {
        self.inner.required_fields()
    }
    fn stress(&self, sig: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error> {
        self.n_stress.fetch_add(1, Ordering::SeqCst);
        self.inner.stress(sig, args, dim)
    }
    fn tangent(&self, dd: &mut [f64], args: &[&[f64]], dim: usize) -> Result<(), Error> {
        self.n_tangent.fetch_add(1, Ordering::SeqCst);
        self.inner.tangent(dd, args, dim)
    }
}

#[test]
fn test_stress_cache_reuse() -> Result<(), Error> {
    let mesh = SampleMeshes::two_qua4();
    let region = Arc::new(Region::new("omega", &mesh, &[0, 1], &Config::new())?);
    let mut state = FieldState::new("u", 2, SampleMeshes::distorted_field(&mesh))?;
    let virtual_field = FieldState::new("v", 2, Vector::new(12))?;
    let n_stress = Arc::new(AtomicUsize::new(0));
    let n_tangent = Arc::new(AtomicUsize::new(0));
    let law = CountingLaw {
        inner: NeoHookean::new(600.0, 400.0),
        n_stress: n_stress.clone(),
        n_tangent: n_tangent.clone(),
    };
    let mut term = HyperelasticTerm::new(region, Material::from_law(Box::new(law)))?;

    // one stress call per quadrature point (2 elements × 4 points)
    let n_point = 8;

    // residual then tangent: the stress is computed once
    let residual = term.evaluate(&virtual_field, &state, EvalMode::Weak, TermMode::Stress, None)?;
    assert_eq!(residual.shape(), [2, 1, 8, 1]);
    assert_eq!(n_stress.load(Ordering::SeqCst), n_point);
    assert!(term.has_cached_stress(&state));
    let tangent = term.evaluate(&virtual_field, &state, EvalMode::Weak, TermMode::Stress, Some("u"))?;
    assert_eq!(tangent.shape(), [2, 1, 8, 8]);
    assert_eq!(n_stress.load(Ordering::SeqCst), n_point);
    assert_eq!(n_tangent.load(Ordering::SeqCst), n_point);

    // the tangent is always recomputed
    term.evaluate(&virtual_field, &state, EvalMode::Weak, TermMode::Stress, Some("u"))?;
    assert_eq!(n_stress.load(Ordering::SeqCst), n_point);
    assert_eq!(n_tangent.load(Ordering::SeqCst), 2 * n_point);

    // new iterate: the stored stress is stale
    state.advance_iterate();
    assert!(!term.has_cached_stress(&state));
    term.evaluate(&virtual_field, &state, EvalMode::Weak, TermMode::Stress, Some("u"))?;
    assert_eq!(n_stress.load(Ordering::SeqCst), 2 * n_point);
    assert!(term.has_cached_stress(&state));

    // explicit reset
    term.invalidate_stress();
    assert!(!term.has_cached_stress(&state));
    term.evaluate(&virtual_field, &state, EvalMode::Weak, TermMode::Stress, Some("u"))?;
    assert_eq!(n_stress.load(Ordering::SeqCst), 3 * n_point);

    // el_avg and qp do not rely on the stored stress
    term.evaluate(&virtual_field, &state, EvalMode::ElAvg, TermMode::Stress, None)?;
    assert_eq!(n_stress.load(Ordering::SeqCst), 4 * n_point);

    // the family data was computed once per iterate
    assert_eq!(state.evaluate_cache().n_computed(), 1);
    Ok(())
}

#[test]
fn test_new_state_with_same_name_recomputes_stress() -> Result<(), Error> {
    let mesh = SampleMeshes::two_qua4();
    let region = Arc::new(Region::new("omega", &mesh, &[0, 1], &Config::new())?);
    let virtual_field = FieldState::new("v", 2, Vector::new(12))?;
    let n_stress = Arc::new(AtomicUsize::new(0));
    let law = CountingLaw {
        inner: NeoHookean::new(600.0, 400.0),
        n_stress: n_stress.clone(),
        n_tangent: Arc::new(AtomicUsize::new(0)),
    };
    let mut term = HyperelasticTerm::new(region.clone(), Material::from_law(Box::new(law)))?;

    // residual at the undeformed state
    let a = FieldState::new("u", 2, SampleMeshes::uniform_stretch(&mesh, 1.0))?;
    term.evaluate(&virtual_field, &a, EvalMode::Weak, TermMode::Stress, None)?;
    assert_eq!(n_stress.load(Ordering::SeqCst), 8);

    // a solver building a fresh state for the next iterate, with the same name and step
    let b = FieldState::new("u", 2, SampleMeshes::uniform_stretch(&mesh, 1.3))?;
    assert!(!term.has_cached_stress(&b));
    let tangent = term.evaluate(&virtual_field, &b, EvalMode::Weak, TermMode::Stress, Some("u"))?;
    assert_eq!(n_stress.load(Ordering::SeqCst), 16);

    // same tangent as a term that never saw the first state
    let mut fresh = HyperelasticTerm::new(region, Material::new(&ParamHyperelastic::sample_neo_hookean())?)?;
    let correct = fresh.evaluate(&virtual_field, &b, EvalMode::Weak, TermMode::Stress, Some("u"))?;
    for (x, y) in tangent.as_data().iter().zip(correct.as_data().iter()) {
        approx_eq(*x, *y, 1e-9);
    }
    Ok(())
}
