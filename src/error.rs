//! Error types for the generic Avro value model

use std::io;
use thiserror::Error;

/// Errors that can occur during schema operations
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Invalid schema format
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Unsupported schema type
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// Schema parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Errors that can occur during codec operations
#[derive(Debug, Error)]
pub enum CodecError {
    /// Unsupported codec
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),
    /// Compression error
    #[error("Compression error: {0}")]
    CompressionError(String),
    /// Decompression error
    #[error("Decompression error: {0}")]
    DecompressionError(String),
}

/// Errors that can occur during decoding
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Unexpected end of data
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// Type mismatch
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Invalid varint encoding
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// String is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// A record field was absent from the input and declares no default
    #[error("Missing field: {0}")]
    MissingField(String),
}

/// Errors that can occur during encoding
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The encoder was driven in an order its output format cannot express
    #[error("Invalid encoder state: {0}")]
    InvalidState(String),
    /// Type mismatch
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by the generic value model and its structural operations.
///
/// Schema-shape errors, union resolution failures, logical-type violations
/// and configuration mistakes are all reported through this type. Lower level
/// schema, decode, encode and codec errors convert into it with `?`.
#[derive(Debug, Error)]
pub enum GenericError {
    /// An operation that needs a record schema was handed something else
    #[error("Not a record: {0}")]
    NotARecord(String),

    /// The value does not have the shape its schema describes
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Field lookup by name failed
    #[error("Not a valid schema field: {field} in record {record}")]
    FieldNotFound { record: String, field: String },

    /// Field lookup by position failed
    #[error("Field index {index} out of range for record {record} with {len} fields")]
    FieldIndexOutOfRange {
        record: String,
        index: usize,
        len: usize,
    },

    /// Array index outside the logical length
    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Fixed content length differs from the schema size
    #[error("Fixed {name} expects {expected} bytes, got {actual}")]
    FixedSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Symbol is neither a declared symbol nor an alias of one
    #[error("Unknown symbol {symbol} for enum {name}")]
    UnknownEnumSymbol { name: String, symbol: String },

    /// No union member matches the value
    #[error("Not in union {union}: {value}")]
    UnresolvedUnion { union: String, value: String },

    /// Logical type parameters are invalid for the schema they annotate
    #[error("Invalid logical type: {0}")]
    InvalidLogicalType(String),

    /// The operation is not defined for this schema type
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A decimal does not fit its declared precision or scale
    #[error("Precision violation: {0}")]
    PrecisionViolation(String),

    /// A default was requested for a field that declares none
    #[error("Field {field} not set and has no default value")]
    MissingDefault { field: String },

    /// Raw logical-type payload could not be interpreted
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A conversion for this logical type name is already registered
    #[error("Conversion already registered for logical type: {0}")]
    DuplicateConversion(String),

    /// Deep copy hit a schema/value combination it cannot copy
    #[error("Deep copy failed for schema \"{schema}\" and value \"{value}\"")]
    DeepCopy { schema: String, value: String },

    /// Schema induction failed
    #[error("Cannot induce schema: {0}")]
    InducedSchema(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Encode error
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl GenericError {
    /// Build a type mismatch error from anything printable.
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        GenericError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
