use crate::{DATE_FIELD, IDENTIFIER_FIELD, db::ExecutionContext};
use serde::{Deserialize, Serialize};

///
/// SessionConfig
///
/// Session policy. Every field has a default, so a partial JSON document
/// (or none at all) is a valid configuration.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Emit per-operation plan summaries at debug level.
    pub debug: bool,

    /// Context used by builder reads without an explicit `in_context`.
    pub read_context: ExecutionContext,

    /// Context used by builder writes without an explicit `in_context`.
    pub write_context: ExecutionContext,

    /// Wire name looked up when an entity declares no identifier key.
    pub identifier_field: String,

    /// Wire name looked up when an entity declares no date key.
    pub date_field: String,
}

impl SessionConfig {
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debug: false,
            read_context: ExecutionContext::Interactive,
            write_context: ExecutionContext::Background,
            identifier_field: IDENTIFIER_FIELD.to_string(),
            date_field: DATE_FIELD.to_string(),
        }
    }
}
