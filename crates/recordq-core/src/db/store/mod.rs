//! Module: db::store
//! Responsibility: the contract of the external record store, its native
//! request representation, and an in-memory reference engine.
//! Does not own: descriptor compilation or result typing.
//! Boundary: everything below this module sees only string-keyed records.

mod memory;
mod request;


pub use memory::{MemoryContext, MemoryStore, StoreSchema};
pub use request::{ComparePredicate, FetchRequest, StorePredicate, StoreSort};

use crate::value::Value;
use derive_more::Display;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failures raised by the record store itself. Callers receive these
/// unchanged inside `Error::Store`.
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("entity '{entity}' is not registered in the store schema")]
    UnknownEntity { entity: String },

    #[error("required field '{field}' is missing on {entity} record {id}")]
    MissingRequiredField {
        entity: String,
        field: String,
        id: RecordId,
    },

    #[error("record {id} does not exist")]
    RecordNotFound { id: RecordId },

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store backend error: {message}")]
    Backend { message: String },
}

///
/// RecordId
/// Store-assigned handle of one record; unique per store.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("#{_0}")]
pub struct RecordId(u64);

impl RecordId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// Record
///
/// A detached copy of one stored record: its handle, entity name and
/// string-keyed primitive fields. Absent keys are null.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    id: RecordId,
    entity: String,
    fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new(id: RecordId, entity: impl Into<String>) -> Self {
        Self {
            id,
            entity: entity.into(),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Null the field, returning its previous value.
    pub fn clear(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }
}

///
/// StoreContext
///
/// One transaction scope of the record store.
///
/// Changes (`stage`, `delete`) are pending until `save` commits them;
/// `fetch` observes this context's pending changes layered over committed
/// data. Implementations use interior mutability so a context can be shared
/// by reference.
///

pub trait StoreContext {
    /// Allocate a new, unstaged record for `entity`.
    fn create(&self, entity: &str) -> Result<Record, StoreError>;

    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Record>, StoreError>;

    /// Insert or replace a record in the pending change set.
    fn stage(&self, record: Record) -> Result<(), StoreError>;

    fn delete(&self, id: RecordId) -> Result<(), StoreError>;

    fn save(&self) -> Result<(), StoreError>;

    /// Discard every pending change.
    fn rollback(&self);

    fn has_changes(&self) -> bool;
}

///
/// RecordStore
///
/// Persistent container handing out contexts: one long-lived interactive
/// context and freshly created background contexts.
///

pub trait RecordStore {
    type Context: StoreContext;

    fn interactive(&self) -> &Self::Context;

    fn new_background(&self) -> Self::Context;
}
