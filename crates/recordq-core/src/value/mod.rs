pub(crate) mod compare;


use crate::types::Timestamp;
use std::fmt::{self, Display};
use ulid::Ulid;

///
/// Value
///
/// One storage primitive as the record store understands it.
/// Every typed field value flows through exactly one of these variants on its
/// way into or out of a record.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Ulid(Ulid),
    Timestamp(Timestamp),
    Blob(Vec<u8>),
    Double(f64),
    Int(i64),
    Int16(i16),
    Bool(bool),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_ulid(&self) -> Option<Ulid> {
        match self {
            Self::Ulid(u) => Some(*u),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Double view; integers widen.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Int16(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Integer view; `Int16` widens, doubles never narrow.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Int16(v) => Some(*v as i64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int16(&self) -> Option<i16> {
        match self {
            Self::Int16(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) const fn is_numeric(&self) -> bool {
        matches!(self, Self::Double(_) | Self::Int(_) | Self::Int16(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Ulid(u) => write!(f, "{u}"),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Self::Double(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

// ----------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Ulid> for Value {
    fn from(value: Ulid) -> Self {
        Self::Ulid(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::Int16(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
