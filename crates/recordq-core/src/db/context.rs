use crate::db::{ExecutionContext, store::RecordStore};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

///
/// ContextResolver
///
/// Maps a logical `ExecutionContext` to a concrete store context.
///
/// The background context is created on first use and reused for the
/// resolver's lifetime; `OnceLock` makes that first creation race-free.
/// The resolver also owns the write gate that serializes check-then-act
/// mutations issued through it.
///

pub struct ContextResolver<S: RecordStore> {
    store: S,
    background: OnceLock<S::Context>,
    write_gate: Mutex<()>,
}

impl<S: RecordStore> ContextResolver<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            background: OnceLock::new(),
            write_gate: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a logical context. Background resolution is idempotent.
    pub fn resolve(&self, context: ExecutionContext) -> &S::Context {
        match context {
            ExecutionContext::Interactive => self.store.interactive(),
            ExecutionContext::Background => {
                self.background.get_or_init(|| self.store.new_background())
            }
        }
    }

    /// Whether the background context has been created yet.
    #[must_use]
    pub fn has_background(&self) -> bool {
        self.background.get().is_some()
    }

    /// Hold while checking and then writing.
    pub(crate) fn write_gate(&self) -> MutexGuard<'_, ()> {
        // guards no data; a poisoned gate is still usable
        self.write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
