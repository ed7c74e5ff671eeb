//! ## Crate layout
//! - `core`: runtime field keys, values, descriptors, the fetch builder,
//!   the session, store contract and observability.
//! - `error`: the public, serializable error surface.
//!
//! `#[derive(FieldKey)]` is re-exported at the crate root and through the
//! `prelude`; generated code refers to `::recordq::key::FieldKey`, so
//! depending on this crate alone is enough.

pub use recordq_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Re-exports
//

pub use recordq_core::{DATE_FIELD, IDENTIFIER_FIELD, db, key, obs, traits, types, value};
pub use error::{Error, ErrorKind};
pub use recordq_derive::FieldKey;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        db::{
            ExecutionContext, RangeQuery, Session, SessionConfig, Upserted,
            query::{Comparison, QueryDescriptor, SortDescriptor, Sorting, UpdateDescriptor},
            record::{RecordAccessor, RecordReader},
        },
        key::FieldKey,
        traits::{
            BoolRepresentable, DateRepresentable, DoubleRepresentable, EntityKind, Identifiable,
            Int16Representable, IntRepresentable, Representable as _, StringRepresentable,
        },
        types::{Timestamp, Urn},
        value::Value,
    };
    pub use recordq_derive::FieldKey;
}
