//! Logical types: decimal arithmetic and the conversion plugin layer.
//!
//! # Submodules
//! - `big_decimal`: arbitrary precision decimals
//! - `rounding`: rounding modes named as in schema attributes
//! - `conversion`: the [`Conversion`] trait
//! - `registry`: per-engine conversion lookup
//! - `decimal`: the decimal logical type over bytes or string
//! - `temporal`: date, timestamp and uuid conversions

mod big_decimal;
mod conversion;
mod decimal;
mod registry;
mod rounding;
mod temporal;

pub use big_decimal::BigDecimal;
pub use conversion::Conversion;
pub use decimal::{
    DecimalBacking, DecimalConversion, DecimalLogicalType, DESER_ROUNDING_PROPERTY,
    RESERVED_PROPERTIES, SER_ROUNDING_PROPERTY,
};
pub use registry::ConversionRegistry;
pub use rounding::RoundingMode;
pub use temporal::{
    format_date, format_timestamp_micros, format_timestamp_millis, uuid_hash, DateConversion,
    TimestampMicrosConversion, TimestampMillisConversion, UuidConversion,
};
