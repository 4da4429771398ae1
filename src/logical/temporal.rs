//! Conversions for `date`, `timestamp-millis`, `timestamp-micros` and `uuid`.
//!
//! Dates are days since the Unix epoch and timestamps are UTC instants, so
//! the host values keep the raw number and only change its kind. Rendering
//! goes through chrono.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat};
use uuid::Uuid;

use crate::error::GenericError;
use crate::generic::{Fixed, Value, ValueKind};
use crate::logical::Conversion;
use crate::schema::{AvroSchema, LogicalType};

// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// ISO-8601 calendar date for a day count, if representable.
pub fn format_date(days: i32) -> Option<String> {
    let from_ce = days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?;
    NaiveDate::from_num_days_from_ce_opt(from_ce).map(|date| date.to_string())
}

/// ISO-8601 UTC instant for epoch milliseconds, if representable.
pub fn format_timestamp_millis(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// ISO-8601 UTC instant for epoch microseconds, if representable.
pub fn format_timestamp_micros(micros: i64) -> Option<String> {
    DateTime::from_timestamp_micros(micros).map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Hash of a uuid: the folded xor of its two 64-bit halves.
pub fn uuid_hash(uuid: &Uuid) -> i32 {
    let (high, low) = uuid.as_u64_pair();
    let folded = high ^ low;
    ((folded >> 32) ^ folded) as i32
}

/// `date` over `int`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateConversion;

impl Conversion for DateConversion {
    fn logical_type_name(&self) -> &str {
        "date"
    }

    fn converted_kind(&self) -> ValueKind {
        ValueKind::Date
    }

    fn to_raw(&self, value: &Value, _logical: &LogicalType) -> Result<Value, GenericError> {
        match value {
            Value::Date(days) => Ok(Value::Int(*days)),
            other => Err(GenericError::mismatch("date", other.kind().name())),
        }
    }

    fn from_raw(&self, raw: Value, _logical: &LogicalType) -> Result<Value, GenericError> {
        match raw {
            Value::Int(days) => Ok(Value::Date(days)),
            other => Err(GenericError::mismatch("int", other.kind().name())),
        }
    }
}

/// `timestamp-millis` over `long`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampMillisConversion;

impl Conversion for TimestampMillisConversion {
    fn logical_type_name(&self) -> &str {
        "timestamp-millis"
    }

    fn converted_kind(&self) -> ValueKind {
        ValueKind::TimestampMillis
    }

    fn to_raw(&self, value: &Value, _logical: &LogicalType) -> Result<Value, GenericError> {
        match value {
            Value::TimestampMillis(millis) => Ok(Value::Long(*millis)),
            other => Err(GenericError::mismatch("timestamp-millis", other.kind().name())),
        }
    }

    fn from_raw(&self, raw: Value, _logical: &LogicalType) -> Result<Value, GenericError> {
        match raw {
            Value::Long(millis) => Ok(Value::TimestampMillis(millis)),
            other => Err(GenericError::mismatch("long", other.kind().name())),
        }
    }
}

/// `timestamp-micros` over `long`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampMicrosConversion;

impl Conversion for TimestampMicrosConversion {
    fn logical_type_name(&self) -> &str {
        "timestamp-micros"
    }

    fn converted_kind(&self) -> ValueKind {
        ValueKind::TimestampMicros
    }

    fn to_raw(&self, value: &Value, _logical: &LogicalType) -> Result<Value, GenericError> {
        match value {
            Value::TimestampMicros(micros) => Ok(Value::Long(*micros)),
            other => Err(GenericError::mismatch("timestamp-micros", other.kind().name())),
        }
    }

    fn from_raw(&self, raw: Value, _logical: &LogicalType) -> Result<Value, GenericError> {
        match raw {
            Value::Long(micros) => Ok(Value::TimestampMicros(micros)),
            other => Err(GenericError::mismatch("long", other.kind().name())),
        }
    }
}

/// `uuid` over `string`, or over a 16 byte `fixed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidConversion;

impl Conversion for UuidConversion {
    fn logical_type_name(&self) -> &str {
        "uuid"
    }

    fn converted_kind(&self) -> ValueKind {
        ValueKind::Uuid
    }

    fn to_raw(&self, value: &Value, logical: &LogicalType) -> Result<Value, GenericError> {
        let Value::Uuid(uuid) = value else {
            return Err(GenericError::mismatch("uuid", value.kind().name()));
        };
        match &*logical.base {
            AvroSchema::Fixed(schema) => Ok(Value::Fixed(Fixed::from_bytes(Arc::clone(schema), uuid.as_bytes())?)),
            _ => Ok(Value::String(uuid.hyphenated().to_string().into())),
        }
    }

    fn from_raw(&self, raw: Value, _logical: &LogicalType) -> Result<Value, GenericError> {
        let parsed = match &raw {
            Value::String(text) => Uuid::parse_str(text),
            Value::Utf8(text) => Uuid::parse_str(text.as_str()),
            Value::Fixed(fixed) => Uuid::from_slice(fixed.bytes()),
            other => return Err(GenericError::mismatch("string", other.kind().name())),
        };
        parsed
            .map(Value::Uuid)
            .map_err(|e| GenericError::MalformedEncoding(format!("Invalid uuid: {}", e)))
    }
}
