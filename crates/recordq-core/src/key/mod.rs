
use std::{fmt::Debug, hash::Hash};

///
/// FieldKey
///
/// Finite, enumerable identifiers for the fields of one entity.
///
/// ## Semantics
/// - `string_value` is the wire name the record store sees
/// - wire names are stable and unique within the key type, so
///   `K::from_string_value(k.string_value()) == Some(k)` for every `k`
/// - `ALL` lists every key exactly once
///
/// Normally implemented with `#[derive(FieldKey)]`, which rejects duplicate
/// wire names at build time.
///

pub trait FieldKey: Copy + Debug + Eq + Hash + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Wire name of this field.
    fn string_value(self) -> &'static str;

    /// Resolve a wire name back to its key.
    fn from_string_value(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.string_value() == value)
    }
}

/// Resolve an optional explicit key, falling back to a wire-name lookup.
pub(crate) fn resolve_key<K: FieldKey>(explicit: Option<K>, fallback: &str) -> Option<K> {
    explicit.or_else(|| K::from_string_value(fallback))
}
