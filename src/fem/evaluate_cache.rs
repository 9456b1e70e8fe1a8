use super::{FamilyData, IterateId, MappingKey};
use crate::base::FamilyKind;
use crate::Error;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Identifies the data derived from a field on a geometry mapping
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataKey {
    /// Geometry mapping (region, basis, quadrature rule)
    pub mapping: MappingKey,

    /// Declared derivative flag of the field
    pub derivative: u8,
}

/// Identifies one slot of the evaluate cache
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SlotKey {
    kind: FamilyKind,
    step: i32,
    data_key: DataKey,
    iterate: IterateId,
}

/// A slot is filled at most once; its own lock serializes concurrent computations of the same key
type Slot = Arc<Mutex<Option<Arc<FamilyData>>>>;

/// Holds the family data computed from a field state, keyed by (family, step, data key, iterate)
///
/// Different keys are computed concurrently; requests for the same key wait for the
/// first computation and then share its result.
pub struct EvaluateCache {
    slots: Mutex<HashMap<SlotKey, Slot>>,
    n_computed: AtomicUsize,
}

/// Locks a mutex, ignoring poisoning (a panicking computation leaves its slot empty)
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Locks a slot
///
/// A rayon worker does not block on a busy slot: it keeps running pending rayon jobs
/// (possibly those of the computation holding the slot) until the slot is released.
fn lock_slot<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    if rayon::current_thread_index().is_none() {
        return lock(slot);
    }
    loop {
        match slot.try_lock() {
            Ok(guard) => return guard,
            Err(TryLockError::Poisoned(e)) => return e.into_inner(),
            Err(TryLockError::WouldBlock) => {
                if !matches!(rayon::yield_now(), Some(rayon::Yield::Executed)) {
                    std::thread::yield_now();
                }
            }
        }
    }
}

impl EvaluateCache {
    /// Allocates a new (empty) instance
    pub fn new() -> Self {
        EvaluateCache {
            slots: Mutex::new(HashMap::new()),
            n_computed: AtomicUsize::new(0),
        }
    }

    /// Returns the cached family data or computes and stores it
    ///
    /// The `compute` function is called at most once per key, even if many threads ask
    /// for the same key at the same time. If it fails, nothing is stored and the error
    /// is returned to the caller.
    ///
    /// The argument of `compute` tells whether it may run rayon loops. It is false on
    /// rayon workers: a worker holding the slot must not pick up another request for
    /// the same slot while waiting for its own parallel loop.
    pub fn get_or_compute<F>(
        &self,
        kind: FamilyKind,
        step: i32,
        data_key: &DataKey,
        iterate: IterateId,
        compute: F,
    ) -> Result<Arc<FamilyData>, Error>
    where
        F: FnOnce(bool) -> Result<FamilyData, Error>,
    {
        let key = SlotKey {
            kind,
            step,
            data_key: data_key.clone(),
            iterate,
        };
        let slot = {
            let mut slots = lock(&self.slots);
            slots.entry(key).or_default().clone()
        };
        let mut filled = lock_slot(&slot);
        if let Some(data) = filled.as_ref() {
            log::trace!(
                "{}: reusing data (region {}, step {}, iterate {})",
                kind.cache_name(),
                data_key.mapping.region,
                step,
                iterate
            );
            return Ok(data.clone());
        }
        log::debug!(
            "{}: computing data (region {}, step {}, iterate {})",
            kind.cache_name(),
            data_key.mapping.region,
            step,
            iterate
        );
        let data = Arc::new(compute(rayon::current_thread_index().is_none())?);
        self.n_computed.fetch_add(1, Ordering::SeqCst);
        *filled = Some(data.clone());
        Ok(data)
    }

    /// Returns the cached family data, if any
    pub fn get(&self, kind: FamilyKind, step: i32, data_key: &DataKey, iterate: IterateId) -> Option<Arc<FamilyData>> {
        let key = SlotKey {
            kind,
            step,
            data_key: data_key.clone(),
            iterate,
        };
        let slot = lock(&self.slots).get(&key).cloned()?;
        let filled = lock_slot(&slot);
        filled.clone()
    }

    /// Returns how many times family data has been computed by this cache
    pub fn n_computed(&self) -> usize {
        self.n_computed.load(Ordering::SeqCst)
    }

    /// Returns the number of filled slots
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock_slot(slot).is_some()).count()
    }

    /// Returns true if no slot is filled
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all cached data
    pub fn invalidate(&self) {
        lock(&self.slots).clear();
    }
}

impl Default for EvaluateCache {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
