//! Core runtime for recordq: typed field keys, representable values,
//! query/update/sort descriptors, the fetch builder and the session that
//! orchestrates inserts, upserts, updates and deletes against a
//! string-keyed record store.
#![warn(unreachable_pub)]

extern crate self as recordq;

// public exports are one module level down
pub mod db;
pub mod error;
pub mod key;
pub mod obs;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Field name looked up on an entity's key type when no explicit identifier
/// key is supplied.
pub const IDENTIFIER_FIELD: &str = "urn";

/// Field name looked up on an entity's key type when no explicit date key is
/// supplied to range and latest fetches.
pub const DATE_FIELD: &str = "date";

// re-exports
pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No stores, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            ExecutionContext,
            query::{Comparison, QueryDescriptor, SortDescriptor, Sorting, UpdateDescriptor},
        },
        key::FieldKey,
        traits::{
            BoolRepresentable, DateRepresentable, DoubleRepresentable, EntityKind, Identifiable,
            Int16Representable, IntRepresentable, Representable, StringRepresentable,
        },
        types::{Timestamp, Urn},
        value::Value,
    };
}
