mod repr;

pub use repr::*;

use crate::{
    db::record::{RecordAccessor, RecordReader},
    key::FieldKey,
    types::Urn,
};

// ============================================================================
// ENTITY CONTRACTS
// ============================================================================

///
/// EntityKind
///
/// A logical record type addressed in the store by `ENTITY_NAME`.
///
/// `from_record` is lenient by contract: returning `None` skips the record
/// during fetches instead of failing the whole read.
///

pub trait EntityKind: Sized {
    type Key: FieldKey;

    const ENTITY_NAME: &'static str;

    /// Date field used by range and latest fetches when the caller does not
    /// pass one. `None` falls back to the session's configured date field
    /// name.
    const DATE_KEY: Option<Self::Key> = None;

    /// Decode a fetched record.
    fn from_record(record: &RecordReader<'_, Self>) -> Option<Self>;

    /// Write every field of `self` into a fresh record.
    fn write_record(&self, record: &mut RecordAccessor<'_, Self>);
}

///
/// Identifiable
///
/// Entity carrying a unique `Urn` identifier field.
///

pub trait Identifiable: EntityKind {
    /// Identifier field. `None` falls back to the session's configured
    /// identifier field name.
    const IDENTIFIER_KEY: Option<Self::Key> = None;

    fn urn(&self) -> &Urn;
}
