use crate::{
    Error,
    db::store::{Record, RecordId, StoreContext, StoreError},
    key::FieldKey,
    traits::{
        BoolRepresentable, DateRepresentable, DoubleRepresentable, EntityKind,
        Int16Representable, IntRepresentable, Representable, StringRepresentable,
    },
    types::{Timestamp, Urn},
    value::Value,
};
use std::marker::PhantomData;
use ulid::Ulid;

///
/// RecordReader
///
/// Typed, read-only view of one fetched record of entity `E`.
///
/// Every getter is lenient: a missing field, a field holding a different
/// primitive, or a custom representable that fails to parse reads as `None`.
///

pub struct RecordReader<'r, E: EntityKind> {
    record: &'r Record,
    _marker: PhantomData<E>,
}

impl<'r, E: EntityKind> RecordReader<'r, E> {
    #[must_use]
    pub const fn new(record: &'r Record) -> Self {
        Self {
            record,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.record.id()
    }

    #[must_use]
    pub fn raw(&self, key: E::Key) -> Option<&'r Value> {
        self.record.get(key.string_value())
    }

    #[must_use]
    pub fn string(&self, key: E::Key) -> Option<String> {
        self.raw(key)?.as_text().map(ToString::to_string)
    }

    #[must_use]
    pub fn urn(&self, key: E::Key) -> Option<Urn> {
        self.string_representable(key)
    }

    #[must_use]
    pub fn ulid(&self, key: E::Key) -> Option<Ulid> {
        self.raw(key)?.as_ulid()
    }

    #[must_use]
    pub fn blob(&self, key: E::Key) -> Option<Vec<u8>> {
        self.raw(key)?.as_blob().map(<[u8]>::to_vec)
    }

    #[must_use]
    pub fn date(&self, key: E::Key) -> Option<Timestamp> {
        self.raw(key)?.as_timestamp()
    }

    #[must_use]
    pub fn double(&self, key: E::Key) -> Option<f64> {
        self.raw(key)?.as_double()
    }

    #[must_use]
    pub fn int(&self, key: E::Key) -> Option<i64> {
        self.raw(key)?.as_int()
    }

    #[must_use]
    pub fn int16(&self, key: E::Key) -> Option<i16> {
        self.raw(key)?.as_int16()
    }

    #[must_use]
    pub fn bool(&self, key: E::Key) -> Option<bool> {
        self.raw(key)?.as_bool()
    }

    #[must_use]
    pub fn string_representable<T: StringRepresentable>(&self, key: E::Key) -> Option<T> {
        T::from_string_value(self.raw(key)?.as_text()?)
    }

    #[must_use]
    pub fn double_representable<T: DoubleRepresentable>(&self, key: E::Key) -> Option<T> {
        T::from_double_value(self.double(key)?)
    }

    #[must_use]
    pub fn int_representable<T: IntRepresentable>(&self, key: E::Key) -> Option<T> {
        T::from_int_value(self.int(key)?)
    }

    #[must_use]
    pub fn int16_representable<T: Int16Representable>(&self, key: E::Key) -> Option<T> {
        T::from_int16_value(self.int16(key)?)
    }

    #[must_use]
    pub fn date_representable<T: DateRepresentable>(&self, key: E::Key) -> Option<T> {
        T::from_date_value(self.date(key)?)
    }

    #[must_use]
    pub fn bool_representable<T: BoolRepresentable>(&self, key: E::Key) -> Option<T> {
        T::from_bool_value(self.bool(key)?)
    }
}

///
/// RecordAccessor
///
/// Typed read/write bridge over one detached record of entity `E`.
/// Setters chain; nothing reaches the store until the owning session stages
/// and saves the record.
///

pub struct RecordAccessor<'r, E: EntityKind> {
    record: &'r mut Record,
    _marker: PhantomData<E>,
}

impl<'r, E: EntityKind> RecordAccessor<'r, E> {
    #[must_use]
    pub const fn new(record: &'r mut Record) -> Self {
        Self {
            record,
            _marker: PhantomData,
        }
    }

    /// Allocate a fresh record of `E` in `context`.
    pub fn new_instance<C: StoreContext + ?Sized>(context: &C) -> Result<Record, Error> {
        context.create(E::ENTITY_NAME).map_err(|err| match err {
            StoreError::UnknownEntity { entity } => Error::UnknownEntityKind { entity },
            other => Error::Store(other),
        })
    }

    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        E::ENTITY_NAME
    }

    #[must_use]
    pub fn reader(&self) -> RecordReader<'_, E> {
        RecordReader::new(self.record)
    }

    pub fn set(&mut self, key: E::Key, value: impl Representable) -> &mut Self {
        self.record.set(key.string_value(), value.to_value());
        self
    }

    /// Explicit null.
    pub fn clear(&mut self, key: E::Key) -> &mut Self {
        self.record.clear(key.string_value());
        self
    }

    pub fn set_string(&mut self, key: E::Key, value: &impl StringRepresentable) -> &mut Self {
        self.set(key, Value::Text(value.string_value()))
    }

    pub fn set_urn(&mut self, key: E::Key, value: &Urn) -> &mut Self {
        self.set(key, value)
    }

    pub fn set_ulid(&mut self, key: E::Key, value: Ulid) -> &mut Self {
        self.set(key, value)
    }

    pub fn set_blob(&mut self, key: E::Key, value: impl Into<Vec<u8>>) -> &mut Self {
        self.set(key, Value::Blob(value.into()))
    }

    pub fn set_date(&mut self, key: E::Key, value: &impl DateRepresentable) -> &mut Self {
        self.set(key, value.date_value())
    }

    pub fn set_double(&mut self, key: E::Key, value: &impl DoubleRepresentable) -> &mut Self {
        self.set(key, value.double_value())
    }

    pub fn set_int(&mut self, key: E::Key, value: &impl IntRepresentable) -> &mut Self {
        self.set(key, value.int_value())
    }

    pub fn set_int16(&mut self, key: E::Key, value: &impl Int16Representable) -> &mut Self {
        self.set(key, value.int16_value())
    }

    pub fn set_bool(&mut self, key: E::Key, value: &impl BoolRepresentable) -> &mut Self {
        self.set(key, value.bool_value())
    }

    /// Set when `Some`, clear when `None`.
    pub fn set_representable<V: Representable>(
        &mut self,
        key: E::Key,
        value: Option<V>,
    ) -> &mut Self {
        match value {
            Some(value) => self.set(key, value),
            None => self.clear(key),
        }
    }
}
