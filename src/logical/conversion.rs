//! The conversion plugin interface.

use std::fmt;

use crate::error::GenericError;
use crate::generic::{host_hash, Value, ValueKind};
use crate::io::{Decoder, Encoder};
use crate::schema::LogicalType;

/// Maps between a logical type's host values and its raw backing values.
///
/// A conversion serves exactly one logical type name and produces values of
/// one [`ValueKind`]. The engine uses `converted_kind` to decide whether a
/// value belongs to a logical union member, and calls `to_raw` / `from_raw`
/// whenever it needs the backing representation.
pub trait Conversion: Send + Sync + fmt::Debug {
    /// The `logicalType` name this conversion serves.
    fn logical_type_name(&self) -> &str;

    /// The kind of host value produced by `from_raw`.
    fn converted_kind(&self) -> ValueKind;

    /// Convert a host value into its raw backing value.
    fn to_raw(&self, value: &Value, logical: &LogicalType) -> Result<Value, GenericError>;

    /// Convert a raw backing value into a host value.
    fn from_raw(&self, raw: Value, logical: &LogicalType) -> Result<Value, GenericError>;

    /// Hash of a host value.
    fn hash_code(&self, value: &Value) -> i32 {
        host_hash(value)
    }

    /// Write `value` straight to an encoder that supports it natively.
    ///
    /// Returns `Ok(false)` when the encoder has no native form, in which
    /// case the caller writes `to_raw(value)` instead.
    fn try_direct_encode(
        &self,
        _value: &Value,
        _encoder: &mut dyn Encoder,
        _logical: &LogicalType,
    ) -> Result<bool, GenericError> {
        Ok(false)
    }

    /// Read a value straight from a decoder that supports it natively.
    ///
    /// Returns `Ok(None)`, consuming nothing, when the caller should read
    /// the raw value and call `from_raw`.
    fn try_direct_decode(
        &self,
        _decoder: &mut dyn Decoder,
        _logical: &LogicalType,
    ) -> Result<Option<Value>, GenericError> {
        Ok(None)
    }
}
