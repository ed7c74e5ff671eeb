use crate::{
    db::{
        record::RecordAccessor,
        store::{ComparePredicate, StorePredicate, StoreSort},
    },
    key::FieldKey,
    traits::{
        BoolRepresentable, DateRepresentable, DoubleRepresentable, EntityKind,
        Int16Representable, IntRepresentable, Representable, StringRepresentable,
    },
    types::Urn,
    value::Value,
};
use std::{cmp::Ordering, fmt};
use ulid::Ulid;

///
/// Comparison
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// Native operator rendering.
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Whether `stored.cmp(operand) == ordering` satisfies this comparison.
    #[must_use]
    pub const fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Gte => !matches!(ordering, Ordering::Less),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Lte => !matches!(ordering, Ordering::Greater),
        }
    }
}

///
/// QueryDescriptor
///
/// One typed `key op value` predicate over entity `E`.
/// A list of descriptors is an implicit conjunction.
///

pub struct QueryDescriptor<E: EntityKind> {
    key: E::Key,
    comparison: Comparison,
    value: Value,
}

impl<E: EntityKind> QueryDescriptor<E> {
    #[must_use]
    pub fn new(key: E::Key, comparison: Comparison, value: impl Representable) -> Self {
        Self {
            key,
            comparison,
            value: value.to_value(),
        }
    }

    /// Equality on any representable value.
    #[must_use]
    pub fn equals(key: E::Key, value: impl Representable) -> Self {
        Self::new(key, Comparison::Eq, value)
    }

    #[must_use]
    pub fn string(key: E::Key, comparison: Comparison, value: &impl StringRepresentable) -> Self {
        Self::from_value(key, comparison, Value::Text(value.string_value()))
    }

    #[must_use]
    pub fn double(key: E::Key, comparison: Comparison, value: &impl DoubleRepresentable) -> Self {
        Self::from_value(key, comparison, Value::Double(value.double_value()))
    }

    #[must_use]
    pub fn int(key: E::Key, comparison: Comparison, value: &impl IntRepresentable) -> Self {
        Self::from_value(key, comparison, Value::Int(value.int_value()))
    }

    #[must_use]
    pub fn int16(key: E::Key, comparison: Comparison, value: &impl Int16Representable) -> Self {
        Self::from_value(key, comparison, Value::Int16(value.int16_value()))
    }

    #[must_use]
    pub fn date(key: E::Key, comparison: Comparison, value: &impl DateRepresentable) -> Self {
        Self::from_value(key, comparison, Value::Timestamp(value.date_value()))
    }

    /// `key == value` on a boolean field.
    #[must_use]
    pub fn bool(key: E::Key, value: &impl BoolRepresentable) -> Self {
        Self::from_value(key, Comparison::Eq, Value::Bool(value.bool_value()))
    }

    /// Identity lookup on a `Urn` field.
    #[must_use]
    pub fn urn(key: E::Key, urn: &Urn) -> Self {
        Self::from_value(key, Comparison::Eq, Value::Text(urn.to_string()))
    }

    /// Identity lookup on a `Ulid` field.
    #[must_use]
    pub fn ulid(key: E::Key, ulid: Ulid) -> Self {
        Self::from_value(key, Comparison::Eq, Value::Ulid(ulid))
    }

    const fn from_value(key: E::Key, comparison: Comparison, value: Value) -> Self {
        Self {
            key,
            comparison,
            value,
        }
    }

    #[must_use]
    pub const fn key(&self) -> E::Key {
        self.key
    }

    #[must_use]
    pub const fn comparison(&self) -> Comparison {
        self.comparison
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Wire triple handed to the store.
    #[must_use]
    pub fn internal_value(&self) -> (&'static str, Comparison, &Value) {
        (self.key.string_value(), self.comparison, &self.value)
    }

    #[must_use]
    pub fn to_predicate(&self) -> ComparePredicate {
        ComparePredicate::new(self.key.string_value(), self.comparison, self.value.clone())
    }

    /// AND every descriptor together, in list order.
    #[must_use]
    pub fn compile<'a>(descriptors: impl IntoIterator<Item = &'a Self>) -> StorePredicate
    where
        E: 'a,
    {
        StorePredicate::and(descriptors.into_iter().map(Self::to_predicate).collect())
    }
}

impl<E: EntityKind> Clone for QueryDescriptor<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            comparison: self.comparison,
            value: self.value.clone(),
        }
    }
}

impl<E: EntityKind> fmt::Debug for QueryDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDescriptor")
            .field("key", &self.key)
            .field("comparison", &self.comparison)
            .field("value", &self.value)
            .finish()
    }
}

impl<E: EntityKind> PartialEq for QueryDescriptor<E> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.comparison == other.comparison && self.value == other.value
    }
}

///
/// UpdateDescriptor
///
/// One typed field assignment. `None` clears the field; a field that no
/// descriptor mentions keeps its stored value.
///

pub struct UpdateDescriptor<E: EntityKind> {
    key: E::Key,
    value: Option<Value>,
}

impl<E: EntityKind> UpdateDescriptor<E> {
    #[must_use]
    pub fn set(key: E::Key, value: impl Representable) -> Self {
        Self {
            key,
            value: Some(value.to_value()),
        }
    }

    /// Assign or clear depending on `value`.
    #[must_use]
    pub fn set_opt<V: Representable>(key: E::Key, value: Option<V>) -> Self {
        Self {
            key,
            value: value.map(|v| v.to_value()),
        }
    }

    #[must_use]
    pub const fn clear(key: E::Key) -> Self {
        Self { key, value: None }
    }

    #[must_use]
    pub fn string(key: E::Key, value: &impl StringRepresentable) -> Self {
        Self::set(key, Value::Text(value.string_value()))
    }

    #[must_use]
    pub fn double(key: E::Key, value: &impl DoubleRepresentable) -> Self {
        Self::set(key, Value::Double(value.double_value()))
    }

    #[must_use]
    pub fn int(key: E::Key, value: &impl IntRepresentable) -> Self {
        Self::set(key, Value::Int(value.int_value()))
    }

    #[must_use]
    pub fn int16(key: E::Key, value: &impl Int16Representable) -> Self {
        Self::set(key, Value::Int16(value.int16_value()))
    }

    #[must_use]
    pub fn date(key: E::Key, value: &impl DateRepresentable) -> Self {
        Self::set(key, Value::Timestamp(value.date_value()))
    }

    #[must_use]
    pub fn bool(key: E::Key, value: &impl BoolRepresentable) -> Self {
        Self::set(key, Value::Bool(value.bool_value()))
    }

    #[must_use]
    pub const fn key(&self) -> E::Key {
        self.key
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn internal_value(&self) -> (&'static str, Option<&Value>) {
        (self.key.string_value(), self.value.as_ref())
    }

    /// Write this assignment into a record.
    pub fn apply(&self, record: &mut RecordAccessor<'_, E>) {
        match &self.value {
            Some(value) => {
                record.set(self.key, value.clone());
            }
            None => {
                record.clear(self.key);
            }
        }
    }
}

impl<E: EntityKind> Clone for UpdateDescriptor<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            value: self.value.clone(),
        }
    }
}

impl<E: EntityKind> fmt::Debug for UpdateDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateDescriptor")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

///
/// Sorting
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Sorting {
    #[default]
    Ascending,
    Descending,
}

///
/// SortDescriptor
///

pub struct SortDescriptor<E: EntityKind> {
    pub key: E::Key,
    pub sorting: Sorting,
}

impl<E: EntityKind> SortDescriptor<E> {
    #[must_use]
    pub const fn new(key: E::Key, sorting: Sorting) -> Self {
        Self { key, sorting }
    }

    #[must_use]
    pub const fn ascending(key: E::Key) -> Self {
        Self::new(key, Sorting::Ascending)
    }

    #[must_use]
    pub const fn descending(key: E::Key) -> Self {
        Self::new(key, Sorting::Descending)
    }

    #[must_use]
    pub fn to_store_sort(&self) -> StoreSort {
        StoreSort {
            field: self.key.string_value().to_string(),
            ascending: self.sorting == Sorting::Ascending,
        }
    }
}

impl<E: EntityKind> Clone for SortDescriptor<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: EntityKind> Copy for SortDescriptor<E> {}

impl<E: EntityKind> fmt::Debug for SortDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescriptor")
            .field("key", &self.key)
            .field("sorting", &self.sorting)
            .finish()
    }
}
