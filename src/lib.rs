//! Generic Avro values and the schema-directed operations over them.
//!
//! This library models Avro data without generated classes: a [`Value`]
//! paired with an [`AvroSchema`] is enough to validate, order, hash, copy,
//! render and encode it. Logical types plug in through [`Conversion`],
//! with decimals supported out of the box.
//!
//! ```
//! use std::sync::Arc;
//! use avro_generic::{AvroSchema, FieldSchema, GenericData, Record, RecordSchema, Value};
//!
//! let schema = Arc::new(RecordSchema::new(
//!     "Point",
//!     vec![FieldSchema::new("x", AvroSchema::Int), FieldSchema::new("y", AvroSchema::Int)],
//! ));
//! let mut point = Record::new(Arc::clone(&schema));
//! point.put(0, 1).unwrap();
//! point.put(1, 2).unwrap();
//!
//! let data = GenericData::new();
//! let value = Value::Record(point);
//! assert!(data.validate(&AvroSchema::Record(schema), &value));
//! assert_eq!(data.to_string(&value), r#"{"x": 1, "y": 2}"#);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod generic;
pub mod io;
pub mod logical;
pub mod schema;

// Re-export main types
pub use codec::Codec;
pub use config::GenericConfig;
pub use error::{CodecError, DecodeError, EncodeError, GenericError, SchemaError};
pub use generic::{
    read_block, write_block, Array, DefaultValueCache, EnumSymbol, Fixed, GenericData, GenericDatumReader,
    GenericDatumWriter, Record, Utf8, Value, ValueKind,
};
pub use io::{binary_compare, BinaryDecoder, BinaryEncoder, Decoder, Encoder, JsonDecoder, JsonEncoder};
pub use logical::{
    BigDecimal, Conversion, ConversionRegistry, DecimalConversion, DecimalLogicalType, RoundingMode,
};
pub use schema::{
    parse_schema, AvroSchema, EnumSchema, FieldSchema, FixedSchema, LogicalType, LogicalTypeName,
    RecordSchema, SchemaParser, SchemaResolutionContext,
};
