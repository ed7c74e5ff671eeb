use recordq_core::{Error as CoreError, db::store::StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::Query(QueryErrorKind::NotFound))
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        let kind = match &err {
            CoreError::ElementNotFound { .. } => ErrorKind::Query(QueryErrorKind::NotFound),
            CoreError::ElementNotUnique { .. } => ErrorKind::Query(QueryErrorKind::NotUnique),
            CoreError::ElementAlreadyExists { .. } => {
                ErrorKind::Query(QueryErrorKind::AlreadyExists)
            }
            CoreError::KeyDoesNotExist { .. } => ErrorKind::Schema(SchemaErrorKind::UnknownField),
            CoreError::UnknownEntityKind { .. } => {
                ErrorKind::Schema(SchemaErrorKind::UnknownEntity)
            }
            CoreError::Store(store) => ErrorKind::Store(StoreErrorKind::from(store)),
        };

        Self::new(kind, err.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        CoreError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and service interfaces.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),
    Schema(SchemaErrorKind),
    Store(StoreErrorKind),
}

///
/// QueryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Valid query, but no rows matched.
    NotFound,

    /// A single-row fetch in strict mode matched more than one row.
    NotUnique,

    /// A uniqueness-checked insert found a matching row.
    AlreadyExists,
}

///
/// SchemaErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SchemaErrorKind {
    /// A field name could not be resolved on the entity's key type.
    UnknownField,

    /// The store does not know the entity.
    UnknownEntity,
}

///
/// StoreErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StoreErrorKind {
    /// The save was rejected for a missing required field.
    Invalid,

    /// A staged record vanished before it could be written.
    Conflict,

    /// The caller cannot remediate this.
    Internal,
}

impl From<&StoreError> for StoreErrorKind {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::MissingRequiredField { .. } | StoreError::UnknownEntity { .. } => {
                Self::Invalid
            }
            StoreError::RecordNotFound { .. } => Self::Conflict,
            StoreError::Poisoned | StoreError::Backend { .. } => Self::Internal,
        }
    }
}

///
/// TESTS
///
