//! Encoders, decoders and binary comparison.
//!
//! # Submodules
//! - `traits`: the [`Encoder`] / [`Decoder`] interfaces and the decimal
//!   extension traits
//! - `binary`: the canonical binary encoding
//! - `json`: the Avro JSON encoding, also used to decode field defaults
//! - `compare`: ordering of binary encoded values
//! - `varint`: zig-zag varint primitives

mod binary;
mod compare;
mod json;
mod traits;
pub mod varint;

pub use binary::{BinaryDecoder, BinaryEncoder};
pub use compare::{binary_compare, skip_encoded};
pub use json::{JsonDecoder, JsonEncoder};
pub use traits::{DecimalDecoder, DecimalEncoder, Decoder, Encoder};
