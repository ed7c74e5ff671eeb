use crate::{db::store::StoreError, traits::EntityKind};
use thiserror::Error as ThisError;

///
/// Error
///
/// Every fallible operation in this crate returns this error.
/// Store failures pass through unchanged inside `Error::Store`.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("no {entity} record matched the query")]
    ElementNotFound { entity: &'static str },

    #[error("expected exactly one {entity} record, found {count}")]
    ElementNotUnique { entity: &'static str, count: usize },

    #[error("field key '{key}' does not exist on entity {entity}")]
    KeyDoesNotExist { entity: &'static str, key: String },

    #[error("a matching {entity} record already exists")]
    ElementAlreadyExists { entity: &'static str },

    #[error("unknown entity kind '{entity}'")]
    UnknownEntityKind { entity: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub(crate) const fn not_found<E: EntityKind>() -> Self {
        Self::ElementNotFound {
            entity: E::ENTITY_NAME,
        }
    }

    pub(crate) const fn not_unique<E: EntityKind>(count: usize) -> Self {
        Self::ElementNotUnique {
            entity: E::ENTITY_NAME,
            count,
        }
    }

    pub(crate) fn key_does_not_exist<E: EntityKind>(key: impl Into<String>) -> Self {
        Self::KeyDoesNotExist {
            entity: E::ENTITY_NAME,
            key: key.into(),
        }
    }

    pub(crate) const fn already_exists<E: EntityKind>() -> Self {
        Self::ElementAlreadyExists {
            entity: E::ENTITY_NAME,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }
}
