//! Encoder and decoder abstractions.
//!
//! The datum reader and writer drive these traits in lock-step with a
//! schema, so one traversal serves both the binary wire format and the
//! Avro JSON form used for field defaults.

use crate::error::{DecodeError, EncodeError};
use crate::logical::BigDecimal;
use crate::schema::{AvroSchema, EnumSchema, FieldSchema, LogicalType, RecordSchema};

/// A sink for schema-ordered values.
///
/// Arrays and maps are written as `*_start(len)`, the items (map entries as
/// `write_map_key` followed by the value), then `*_end()`. Union values are
/// preceded by `write_index`.
pub trait Encoder {
    fn write_null(&mut self) -> Result<(), EncodeError>;
    fn write_boolean(&mut self, value: bool) -> Result<(), EncodeError>;
    fn write_int(&mut self, value: i32) -> Result<(), EncodeError>;
    fn write_long(&mut self, value: i64) -> Result<(), EncodeError>;
    fn write_float(&mut self, value: f32) -> Result<(), EncodeError>;
    fn write_double(&mut self, value: f64) -> Result<(), EncodeError>;
    fn write_bytes(&mut self, value: &[u8]) -> Result<(), EncodeError>;
    fn write_string(&mut self, value: &str) -> Result<(), EncodeError>;
    fn write_fixed(&mut self, value: &[u8]) -> Result<(), EncodeError>;
    fn write_enum(&mut self, index: usize, symbol: &str) -> Result<(), EncodeError>;

    fn write_array_start(&mut self, len: usize) -> Result<(), EncodeError>;
    fn write_array_end(&mut self) -> Result<(), EncodeError>;
    fn write_map_start(&mut self, len: usize) -> Result<(), EncodeError>;
    fn write_map_key(&mut self, key: &str) -> Result<(), EncodeError>;
    fn write_map_end(&mut self) -> Result<(), EncodeError>;

    /// Select the union member that the next value is written under.
    fn write_index(&mut self, index: usize, member: &AvroSchema) -> Result<(), EncodeError>;

    fn write_record_start(&mut self, _schema: &RecordSchema) -> Result<(), EncodeError> {
        Ok(())
    }

    fn write_field(&mut self, _field: &FieldSchema) -> Result<(), EncodeError> {
        Ok(())
    }

    fn write_record_end(&mut self) -> Result<(), EncodeError> {
        Ok(())
    }

    /// Decimal extension, for encoders that can write a decimal natively.
    fn as_decimal_encoder(&mut self) -> Option<&mut dyn DecimalEncoder> {
        None
    }
}

/// A source of schema-ordered values.
///
/// `read_array_start` and `array_next` return item counts of successive
/// blocks; a count of zero ends the sequence. Maps work the same way with
/// `read_map_key` before each value.
pub trait Decoder {
    fn read_null(&mut self) -> Result<(), DecodeError>;
    fn read_boolean(&mut self) -> Result<bool, DecodeError>;
    fn read_int(&mut self) -> Result<i32, DecodeError>;
    fn read_long(&mut self) -> Result<i64, DecodeError>;
    fn read_float(&mut self) -> Result<f32, DecodeError>;
    fn read_double(&mut self) -> Result<f64, DecodeError>;
    fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError>;
    fn read_string(&mut self) -> Result<String, DecodeError>;
    fn read_fixed(&mut self, size: usize) -> Result<Vec<u8>, DecodeError>;

    /// Read an enum value and return its ordinal.
    fn read_enum(&mut self, schema: &EnumSchema) -> Result<usize, DecodeError>;

    /// Read the member index of a union value.
    fn read_index(&mut self, variants: &[AvroSchema]) -> Result<usize, DecodeError>;

    fn read_array_start(&mut self) -> Result<usize, DecodeError>;
    fn array_next(&mut self) -> Result<usize, DecodeError>;
    fn read_map_start(&mut self) -> Result<usize, DecodeError>;
    fn read_map_key(&mut self) -> Result<String, DecodeError>;
    fn map_next(&mut self) -> Result<usize, DecodeError>;

    fn read_record_start(&mut self, _schema: &RecordSchema) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Position on `field`; called before each field value is read.
    fn read_field_start(&mut self, _field: &FieldSchema) -> Result<(), DecodeError> {
        Ok(())
    }

    fn read_record_end(&mut self) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Decimal extension, for decoders that can read a decimal natively.
    fn as_decimal_decoder(&mut self) -> Option<&mut dyn DecimalDecoder> {
        None
    }
}

/// Native decimal writing.
pub trait DecimalEncoder {
    fn write_decimal(&mut self, value: &BigDecimal, logical: &LogicalType) -> Result<(), EncodeError>;
}

/// Native decimal reading.
pub trait DecimalDecoder {
    /// Read the next value as a decimal if it is stored in native form.
    ///
    /// Returns `Ok(None)` without consuming input when it is not, so the
    /// caller can fall back to the raw representation.
    fn read_decimal(&mut self, logical: &LogicalType) -> Result<Option<BigDecimal>, DecodeError>;
}
