//! Module: db
//! Responsibility: typed query and mutation layer over a string-keyed record
//! store.
//! Does not own: persistence, transactions, or schema registration (store).

pub mod config;
pub mod context;
pub mod query;
pub mod record;
pub mod session;
pub mod store;


pub use config::SessionConfig;
pub use context::ContextResolver;
pub use query::{FetchOne, FetchQuery};
pub use session::{RangeQuery, Session, Upserted};

use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// ExecutionContext
///
/// Logical transaction scope an operation runs in.
/// `Interactive` is the store's one long-lived context; `Background` is
/// created once per resolver on first use and then reused.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    #[default]
    #[display("interactive")]
    Interactive,

    #[display("background")]
    Background,
}
