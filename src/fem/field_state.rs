use super::EvaluateCache;
use crate::Error;
use russell_lab::Vector;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a solver iterate of a field state
///
/// Ids are unique within the process: two states never share an id, even if they
/// have the same name and step.
pub type IterateId = u64;

static NEXT_ITERATE: AtomicU64 = AtomicU64::new(0);

/// Returns a fresh iterate id
fn next_iterate() -> IterateId {
    NEXT_ITERATE.fetch_add(1, Ordering::Relaxed)
}

/// Holds the state of a vector-valued unknown (e.g., displacement) at a solver iterate
///
/// The coefficients are node-major: `u[dim * node + k]`. The state owns the evaluate
/// cache holding the family data derived from the current coefficients; replacing the
/// coefficients advances the iterate and invalidates that cache.
pub struct FieldState {
    /// Name of the field
    name: String,

    /// Number of components (equal to the space dimension)
    dim: usize,

    /// Declared spatial derivative flag (0 = value, 1 = gradient)
    derivative: u8,

    /// Time-step offset (0 = current, -1 = previous)
    step: i32,

    /// Current solver iterate
    iterate: IterateId,

    /// Coefficients of the field
    coefficients: Vector,

    /// Family data derived from the current coefficients
    evaluate_cache: EvaluateCache,
}

impl FieldState {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `name` -- name of the field
    /// * `dim` -- number of components (2 or 3)
    /// * `coefficients` -- node-major values with length `dim × n_node`
    pub fn new(name: &str, dim: usize, coefficients: Vector) -> Result<Self, Error> {
        if dim != 2 && dim != 3 {
            return Err(Error::ShapeMismatch(format!(
                "field {} must have 2 or 3 components",
                name
            )));
        }
        if coefficients.dim() % dim != 0 {
            return Err(Error::ShapeMismatch(format!(
                "the number of coefficients ({}) of field {} must be a multiple of {}",
                coefficients.dim(),
                name,
                dim
            )));
        }
        Ok(FieldState {
            name: name.to_string(),
            dim,
            derivative: 0,
            step: 0,
            iterate: next_iterate(),
            coefficients,
            evaluate_cache: EvaluateCache::new(),
        })
    }

    /// Sets the declared derivative flag
    pub fn with_derivative(mut self, derivative: u8) -> Self {
        self.derivative = derivative;
        self
    }

    /// Sets the time-step offset
    pub fn with_step(mut self, step: i32) -> Self {
        self.step = step;
        self
    }

    /// Returns the name of the field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of components
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the number of nodes
    pub fn n_node(&self) -> usize {
        self.coefficients.dim() / self.dim
    }

    /// Returns the declared derivative flag
    pub fn derivative(&self) -> u8 {
        self.derivative
    }

    /// Returns the time-step offset
    pub fn step(&self) -> i32 {
        self.step
    }

    /// Returns the current solver iterate
    pub fn iterate(&self) -> IterateId {
        self.iterate
    }

    /// Returns the coefficients
    pub fn coefficients(&self) -> &Vector {
        &self.coefficients
    }

    /// Returns the evaluate cache bound to this state
    pub fn evaluate_cache(&self) -> &EvaluateCache {
        &self.evaluate_cache
    }

    /// Replaces the coefficients, advances the iterate and invalidates the cache
    pub fn set_coefficients(&mut self, coefficients: Vector) -> Result<(), Error> {
        if coefficients.dim() != self.coefficients.dim() {
            return Err(Error::ShapeMismatch(format!(
                "field {} requires {} coefficients, got {}",
                self.name,
                self.coefficients.dim(),
                coefficients.dim()
            )));
        }
        self.coefficients = coefficients;
        self.advance_iterate();
        Ok(())
    }

    /// Advances the iterate and invalidates the cache
    ///
    /// Called by the solver when a new iterate (or time step) begins.
    pub fn advance_iterate(&mut self) {
        self.iterate = next_iterate();
        self.evaluate_cache.invalidate();
        log::debug!("field {}: iterate {}", self.name, self.iterate);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::FieldState;
    use crate::Error;
    use russell_lab::Vector;

    #[test]
    fn new_handles_errors() {
        assert_eq!(
            FieldState::new("u", 1, Vector::new(3)).err(),
            Some(Error::ShapeMismatch("field u must have 2 or 3 components".to_string()))
        );
        assert_eq!(
            FieldState::new("u", 2, Vector::new(5)).err(),
            Some(Error::ShapeMismatch(
                "the number of coefficients (5) of field u must be a multiple of 2".to_string()
            ))
        );
    }

    #[test]
    fn new_works() {
        let field = FieldState::new("u", 3, Vector::new(12))
            .unwrap()
            .with_derivative(1)
            .with_step(-1);
        assert_eq!(field.name(), "u");
        assert_eq!(field.dim(), 3);
        assert_eq!(field.n_node(), 4);
        assert_eq!(field.derivative(), 1);
        assert_eq!(field.step(), -1);
        assert_eq!(field.coefficients().dim(), 12);
        assert!(field.evaluate_cache().is_empty());
    }

    #[test]
    fn set_coefficients_works() {
        let mut field = FieldState::new("u", 2, Vector::new(4)).unwrap();
        assert_eq!(
            field.set_coefficients(Vector::new(6)).err(),
            Some(Error::ShapeMismatch("field u requires 4 coefficients, got 6".to_string()))
        );
        let first = field.iterate();
        field.set_coefficients(Vector::from(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        let second = field.iterate();
        assert!(second > first);
        assert_eq!(field.coefficients()[3], 4.0);
        field.advance_iterate();
        assert!(field.iterate() > second);
    }

    #[test]
    fn iterates_are_unique_across_states() {
        let a = FieldState::new("u", 2, Vector::new(4)).unwrap();
        let b = FieldState::new("u", 2, Vector::new(4)).unwrap();
        assert_ne!(a.iterate(), b.iterate());
    }
}
