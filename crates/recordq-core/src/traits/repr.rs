//! Representable capabilities: how a typed value maps onto exactly one
//! storage primitive.
//!
//! Serialization into a primitive is total. Reconstruction is failable and
//! only the caller-defined representables ever refuse a value; built-in
//! primitives always round-trip.

use crate::{
    types::{Timestamp, Urn},
    value::Value,
};
use std::time::SystemTime;
use ulid::Ulid;

// ============================================================================
// PRIMITIVE CAPABILITIES
// ============================================================================

///
/// StringRepresentable
///
/// Implemented by string-backed custom types (usually enums) as well as by
/// `String` itself.
///

pub trait StringRepresentable: Sized {
    fn string_value(&self) -> String;

    fn from_string_value(value: &str) -> Option<Self>;
}

pub trait DoubleRepresentable: Sized {
    fn double_value(&self) -> f64;

    fn from_double_value(value: f64) -> Option<Self>;
}

pub trait IntRepresentable: Sized {
    fn int_value(&self) -> i64;

    fn from_int_value(value: i64) -> Option<Self>;
}

pub trait Int16Representable: Sized {
    fn int16_value(&self) -> i16;

    fn from_int16_value(value: i16) -> Option<Self>;
}

pub trait DateRepresentable: Sized {
    fn date_value(&self) -> Timestamp;

    fn from_date_value(value: Timestamp) -> Option<Self>;
}

pub trait BoolRepresentable: Sized {
    fn bool_value(&self) -> bool;

    fn from_bool_value(value: bool) -> Option<Self>;
}

impl StringRepresentable for String {
    fn string_value(&self) -> String {
        self.clone()
    }

    fn from_string_value(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl StringRepresentable for Urn {
    fn string_value(&self) -> String {
        self.as_str().to_string()
    }

    // lenient: an unparseable stored identifier reads as absent
    fn from_string_value(value: &str) -> Option<Self> {
        Self::parse(value).ok()
    }
}

impl DoubleRepresentable for f64 {
    fn double_value(&self) -> f64 {
        *self
    }

    fn from_double_value(value: f64) -> Option<Self> {
        Some(value)
    }
}

impl IntRepresentable for i64 {
    fn int_value(&self) -> i64 {
        *self
    }

    fn from_int_value(value: i64) -> Option<Self> {
        Some(value)
    }
}

impl IntRepresentable for i32 {
    fn int_value(&self) -> i64 {
        i64::from(*self)
    }

    fn from_int_value(value: i64) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl Int16Representable for i16 {
    fn int16_value(&self) -> i16 {
        *self
    }

    fn from_int16_value(value: i16) -> Option<Self> {
        Some(value)
    }
}

impl DateRepresentable for Timestamp {
    fn date_value(&self) -> Timestamp {
        *self
    }

    fn from_date_value(value: Timestamp) -> Option<Self> {
        Some(value)
    }
}

impl DateRepresentable for SystemTime {
    fn date_value(&self) -> Timestamp {
        Timestamp::from(*self)
    }

    fn from_date_value(value: Timestamp) -> Option<Self> {
        let millis = value.as_millis();
        let offset = std::time::Duration::from_millis(millis.unsigned_abs());

        if millis >= 0 {
            Self::UNIX_EPOCH.checked_add(offset)
        } else {
            Self::UNIX_EPOCH.checked_sub(offset)
        }
    }
}

impl BoolRepresentable for bool {
    fn bool_value(&self) -> bool {
        *self
    }

    fn from_bool_value(value: bool) -> Option<Self> {
        Some(value)
    }
}

// ============================================================================
// UNIFIED CAPABILITY
// ============================================================================

///
/// Representable
///
/// Anything that serializes to exactly one storage primitive.
/// Descriptors are generic over this one capability; the primitive family is
/// chosen by the implementing type or by one of the wrappers below.
///

pub trait Representable {
    fn to_value(&self) -> Value;
}

impl<T: Representable + ?Sized> Representable for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl Representable for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl Representable for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl Representable for Urn {
    fn to_value(&self) -> Value {
        Value::Text(self.as_str().to_string())
    }
}

impl Representable for Ulid {
    fn to_value(&self) -> Value {
        Value::Ulid(*self)
    }
}

impl Representable for Timestamp {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl Representable for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl Representable for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl Representable for i16 {
    fn to_value(&self) -> Value {
        Value::Int16(*self)
    }
}

impl Representable for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Representable for [u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl Representable for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl Representable for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

// ----------------------------------------------------------------------
// Capability wrappers
// ----------------------------------------------------------------------

/// Store a `StringRepresentable` as text.
#[derive(Clone, Copy, Debug)]
pub struct Text<T>(pub T);

/// Store a `DoubleRepresentable` as a double.
#[derive(Clone, Copy, Debug)]
pub struct Double<T>(pub T);

/// Store an `IntRepresentable` as a 64-bit integer.
#[derive(Clone, Copy, Debug)]
pub struct Int<T>(pub T);

/// Store an `Int16Representable` as a 16-bit integer.
#[derive(Clone, Copy, Debug)]
pub struct Int16<T>(pub T);

/// Store a `DateRepresentable` as a timestamp.
#[derive(Clone, Copy, Debug)]
pub struct Date<T>(pub T);

/// Store a `BoolRepresentable` as a boolean.
#[derive(Clone, Copy, Debug)]
pub struct Flag<T>(pub T);

impl<T: StringRepresentable> Representable for Text<T> {
    fn to_value(&self) -> Value {
        Value::Text(self.0.string_value())
    }
}

impl<T: DoubleRepresentable> Representable for Double<T> {
    fn to_value(&self) -> Value {
        Value::Double(self.0.double_value())
    }
}

impl<T: IntRepresentable> Representable for Int<T> {
    fn to_value(&self) -> Value {
        Value::Int(self.0.int_value())
    }
}

impl<T: Int16Representable> Representable for Int16<T> {
    fn to_value(&self) -> Value {
        Value::Int16(self.0.int16_value())
    }
}

impl<T: DateRepresentable> Representable for Date<T> {
    fn to_value(&self) -> Value {
        Value::Timestamp(self.0.date_value())
    }
}

impl<T: BoolRepresentable> Representable for Flag<T> {
    fn to_value(&self) -> Value {
        Value::Bool(self.0.bool_value())
    }
}
