//! The generic value type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::generic::{Array, EnumSymbol, Fixed, GenericData, Record, Utf8};
use crate::logical::BigDecimal;

/// A value of any Avro schema.
///
/// Raw Avro values map one to one onto variants. Values produced by the
/// built-in logical conversions get their own variants (`Decimal`, `Date`,
/// `TimestampMillis`, `TimestampMicros`, `Uuid`); they are only produced and
/// consumed when the matching conversion is registered.
///
/// Equality is structural and schema-free; `String` and `Utf8` holding the
/// same text are equal. Use [`GenericData::equals`] for schema-aware
/// equality.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    /// Immutable text.
    String(Arc<str>),
    /// Mutable, reusable text.
    Utf8(Utf8),
    Record(Record),
    Enum(EnumSymbol),
    Array(Array<Value>),
    Map(HashMap<String, Value>),
    Fixed(Fixed),
    Decimal(BigDecimal),
    /// Days since the Unix epoch.
    Date(i32),
    /// Milliseconds since the Unix epoch, UTC.
    TimestampMillis(i64),
    /// Microseconds since the Unix epoch, UTC.
    TimestampMicros(i64),
    Uuid(Uuid),
}

/// The variant of a [`Value`], used for conversion lookup.
///
/// `String` covers both [`Value::String`] and [`Value::Utf8`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record,
    Enum,
    Array,
    Map,
    Fixed,
    Decimal,
    Date,
    TimestampMillis,
    TimestampMicros,
    Uuid,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Bytes => "bytes",
            ValueKind::String => "string",
            ValueKind::Record => "record",
            ValueKind::Enum => "enum",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
            ValueKind::Fixed => "fixed",
            ValueKind::Decimal => "decimal",
            ValueKind::Date => "date",
            ValueKind::TimestampMillis => "timestamp-millis",
            ValueKind::TimestampMicros => "timestamp-micros",
            ValueKind::Uuid => "uuid",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(_) | Value::Utf8(_), Value::String(_) | Value::Utf8(_)) => self.as_str() == other.as_str(),
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) | (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Long(a), Value::Long(b))
            | (Value::TimestampMillis(a), Value::TimestampMillis(b))
            | (Value::TimestampMicros(a), Value::TimestampMicros(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Fixed(a), Value::Fixed(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::String(_) | Value::Utf8(_) => ValueKind::String,
            Value::Record(_) => ValueKind::Record,
            Value::Enum(_) => ValueKind::Enum,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
            Value::Fixed(_) => ValueKind::Fixed,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Date(_) => ValueKind::Date,
            Value::TimestampMillis(_) => ValueKind::TimestampMillis,
            Value::TimestampMicros(_) => ValueKind::TimestampMicros,
            Value::Uuid(_) => ValueKind::Uuid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text of a `String` or `Utf8` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&GenericData::shared().to_string(self))
    }
}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Boolean,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<u8> => Bytes,
    Utf8 => Utf8,
    Record => Record,
    EnumSymbol => Enum,
    Array<Value> => Array,
    HashMap<String, Value> => Map,
    Fixed => Fixed,
    BigDecimal => Decimal,
    Uuid => Uuid,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
