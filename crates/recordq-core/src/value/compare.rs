use crate::value::Value;
use std::cmp::Ordering;

impl Value {
    /// Compare two primitives of the same family.
    ///
    /// Numeric variants compare across `Int`, `Int16` and `Double`; integer
    /// pairs compare exactly, anything involving a double compares as `f64`.
    /// Values of unrelated families are incomparable and return `None`.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Ulid(a), Self::Ulid(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Blob(a), Self::Blob(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => compare_numeric(a, b),
            _ => None,
        }
    }
}

fn compare_numeric(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_int(), b.as_int()) {
        return Some(a.cmp(&b));
    }

    a.as_double()?.partial_cmp(&b.as_double()?)
}

/// Total ordering used for sorting records on one field.
///
/// Missing values order before present ones; incomparable pairs (NaN,
/// mixed families) are treated as equal so a stable sort keeps their
/// relative order.
pub(crate) fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}
