//! The per-token resolution strategy slot.

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::error::{DiError, DiResult};

/// Type-erased value storage shared by every binding.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Lazily-invoked construction strategy for a record.
pub type RecordFactory = Arc<dyn Fn() -> DiResult<AnyArc> + Send + Sync>;

#[derive(Clone)]
struct RecordState {
    value: Option<AnyArc>,
    factory: Option<RecordFactory>,
    /// Alias records and the injector self-record re-run their factory on
    /// every access instead of caching the first result.
    memoize: bool,
}

/// One binding's resolution strategy: a precomputed value or a lazily-invoked
/// factory, memoized after the first successful creation.
///
/// Records are shared as `Arc<Record>` and mutate their strategy in place
/// ([`overwrite_with`](Record::overwrite_with)), so every holder of a record
/// reference observes a later re-registration of the same token.
///
/// The "already produced" check is value presence, never truthiness: a
/// legitimately zero or empty value stays cached.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use stratum_di::{AnyArc, Record};
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let calls_in = calls.clone();
/// let record = Record::with_factory("demo", Arc::new(move || {
///     calls_in.fetch_add(1, Ordering::SeqCst);
///     Ok(Arc::new(0usize) as AnyArc)
/// }));
///
/// let a = record.create().unwrap();
/// let b = record.create().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(calls.load(Ordering::SeqCst), 1); // factory ran once, even for a zero value
/// ```
pub struct Record {
    name: &'static str,
    state: Mutex<RecordState>,
}

impl Record {
    /// Record backed by a fixed, already-constructed value.
    pub fn with_value(name: &'static str, value: AnyArc) -> Self {
        Self {
            name,
            state: Mutex::new(RecordState {
                value: Some(value),
                factory: None,
                memoize: true,
            }),
        }
    }

    /// Record backed by a factory, cached after the first successful run.
    pub fn with_factory(name: &'static str, factory: RecordFactory) -> Self {
        Self {
            name,
            state: Mutex::new(RecordState {
                value: None,
                factory: Some(factory),
                memoize: true,
            }),
        }
    }

    /// Record backed by a factory that runs on every access (aliases).
    pub fn with_passthrough_factory(name: &'static str, factory: RecordFactory) -> Self {
        Self {
            name,
            state: Mutex::new(RecordState {
                value: None,
                factory: Some(factory),
                memoize: false,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Realizes the record's value.
    ///
    /// Returns the cached value when present; otherwise invokes the factory
    /// (outside the state lock, so factories may recurse into the injector)
    /// and caches the result. First successful creation wins. Fails with
    /// [`DiError::RecordCreation`] when neither value nor factory is set.
    pub fn create(&self) -> DiResult<AnyArc> {
        let factory = {
            let state = self.state.lock().unwrap();
            if let Some(value) = &state.value {
                return Ok(value.clone());
            }
            match &state.factory {
                Some(factory) => factory.clone(),
                None => return Err(DiError::RecordCreation(self.name)),
            }
        };

        let produced = factory()?;

        let mut state = self.state.lock().unwrap();
        if let Some(value) = &state.value {
            // A nested resolution already produced and cached a value.
            return Ok(value.clone());
        }
        if state.memoize {
            state.value = Some(produced.clone());
        }
        Ok(produced)
    }

    /// Replaces the strategy with a fixed value.
    pub fn set_value(&self, value: AnyArc) {
        let mut state = self.state.lock().unwrap();
        state.value = Some(value);
    }

    /// Replaces the strategy with a factory and clears any cached value.
    pub fn set_factory(&self, factory: RecordFactory) {
        let mut state = self.state.lock().unwrap();
        state.value = None;
        state.factory = Some(factory);
    }

    /// Adopts `other`'s entire strategy in place, so existing `Arc<Record>`
    /// references observe the new behavior. Used when a later provider
    /// re-registers an already-bound token.
    pub fn overwrite_with(&self, other: Record) {
        let incoming = other.state.into_inner().unwrap();
        let mut state = self.state.lock().unwrap();
        *state = incoming;
    }

    /// Detaches a copy of the current strategy into a fresh record.
    ///
    /// Multi-binding chains snapshot the previous record before rewriting it,
    /// so the chained factory realizes the old strategy rather than itself.
    pub fn snapshot(&self) -> Record {
        let state = self.state.lock().unwrap();
        Record {
            name: self.name,
            state: Mutex::new(state.clone()),
        }
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("Record")
            .field("name", &self.name)
            .field("resolved", &state.value.is_some())
            .field("has_factory", &state.factory.is_some())
            .field("memoize", &state.memoize)
            .finish()
    }
}
