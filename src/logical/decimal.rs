//! The `decimal` logical type.
//!
//! A decimal is backed either by `bytes` or by `string`:
//!
//! - bytes: the zig-zag varint scale followed by the big-endian two's
//!   complement unscaled value, so each encoded value carries its own scale
//! - string: the plain (non exponent) decimal text
//!
//! Writing a value whose scale exceeds the declared scale rounds with the
//! serialization rounding mode, or fails when none is configured. Reading
//! applies the deserialization rounding mode the same way. The precision
//! bound is checked after rounding.

use num_bigint::BigInt;
use tracing::trace;

use crate::error::GenericError;
use crate::generic::{decimal_hash, host_hash, Value, ValueKind};
use crate::io::varint::{decode_zigzag_int, write_zigzag_int};
use crate::io::{Decoder, Encoder};
use crate::logical::{BigDecimal, Conversion, RoundingMode};
use crate::schema::{AvroSchema, LogicalType, LogicalTypeName};

/// Schema attributes owned by the decimal logical type.
pub const RESERVED_PROPERTIES: [&str; 4] = ["precision", "scale", "serRounding", "deserRounding"];

/// Attribute selecting the rounding mode used when writing.
pub const SER_ROUNDING_PROPERTY: &str = "serRounding";

/// Attribute selecting the rounding mode used when reading.
pub const DESER_ROUNDING_PROPERTY: &str = "deserRounding";

/// Raw representation of a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalBacking {
    Bytes,
    String,
}

/// A validated decimal declaration: precision, scale, rounding policy and
/// backing type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalLogicalType {
    precision: u32,
    scale: u32,
    ser_rounding: Option<RoundingMode>,
    deser_rounding: Option<RoundingMode>,
    backing: DecimalBacking,
}

impl DecimalLogicalType {
    /// Build a declaration, checking `precision > 0` and `scale <= precision`.
    pub fn new(precision: u32, scale: u32, backing: DecimalBacking) -> Result<Self, GenericError> {
        if precision == 0 {
            return Err(GenericError::InvalidLogicalType(format!(
                "Invalid decimal precision: {} (must be positive)",
                precision
            )));
        }
        if scale > precision {
            return Err(GenericError::InvalidLogicalType(format!(
                "Invalid decimal scale: {} (greater than precision: {})",
                scale, precision
            )));
        }
        Ok(Self {
            precision,
            scale,
            ser_rounding: None,
            deser_rounding: None,
            backing,
        })
    }

    /// Set the rounding mode applied when writing.
    pub fn with_ser_rounding(mut self, mode: Option<RoundingMode>) -> Self {
        self.ser_rounding = mode;
        self
    }

    /// Set the rounding mode applied when reading.
    pub fn with_deser_rounding(mut self, mode: Option<RoundingMode>) -> Self {
        self.deser_rounding = mode;
        self
    }

    /// Interpret a logical annotation as a decimal.
    ///
    /// Rounding attributes on the schema win over the supplied defaults; an
    /// explicit `"none"` disables rounding even when a default is set.
    pub fn from_logical(
        logical: &LogicalType,
        default_ser: Option<RoundingMode>,
        default_deser: Option<RoundingMode>,
    ) -> Result<Self, GenericError> {
        let LogicalTypeName::Decimal { precision, scale } = logical.logical_type else {
            return Err(GenericError::InvalidLogicalType(format!(
                "Expected decimal, found {}",
                logical.name()
            )));
        };
        let backing = match *logical.base {
            AvroSchema::Bytes => DecimalBacking::Bytes,
            AvroSchema::String => DecimalBacking::String,
            ref other => {
                return Err(GenericError::InvalidLogicalType(format!(
                    "decimal must be backed by string or bytes, not {}",
                    other.type_name()
                )))
            }
        };
        let ser = match logical.property_str(SER_ROUNDING_PROPERTY) {
            Some(name) => RoundingMode::parse_optional(name)?,
            None => default_ser,
        };
        let deser = match logical.property_str(DESER_ROUNDING_PROPERTY) {
            Some(name) => RoundingMode::parse_optional(name)?,
            None => default_deser,
        };
        Ok(Self::new(precision, scale, backing)?
            .with_ser_rounding(ser)
            .with_deser_rounding(deser))
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn ser_rounding(&self) -> Option<RoundingMode> {
        self.ser_rounding
    }

    pub fn deser_rounding(&self) -> Option<RoundingMode> {
        self.deser_rounding
    }

    pub fn backing(&self) -> DecimalBacking {
        self.backing
    }

    fn declared_scale(&self) -> i32 {
        i32::try_from(self.scale).unwrap_or(i32::MAX)
    }

    /// Bring `value` within the declared scale and precision for writing.
    pub fn fit_for_write(&self, value: &BigDecimal) -> Result<BigDecimal, GenericError> {
        let fitted = if value.scale() > self.declared_scale() {
            match self.ser_rounding {
                Some(mode) => value.set_scale(self.declared_scale(), mode)?,
                None => {
                    return Err(GenericError::PrecisionViolation(format!(
                        "Decimal {} exceeds scale {} if you desire rounding, you can annotate type \
                         with @serRounding(\"HALF_UP\") or set the environment variable \
                         AVRO_DECIMAL_DEFAULT_SER_ROUNDING=HALF_UP",
                        value, self.scale
                    )))
                }
            }
        } else {
            value.clone()
        };
        if fitted.precision() > self.precision {
            return Err(GenericError::PrecisionViolation(format!(
                "Decimal {} exceeds precision {}",
                fitted, self.precision
            )));
        }
        Ok(fitted)
    }

    /// Apply the read-side scale policy to a decoded value.
    pub fn fit_for_read(&self, value: BigDecimal) -> Result<BigDecimal, GenericError> {
        if value.scale() <= self.declared_scale() {
            return Ok(value);
        }
        match self.deser_rounding {
            Some(mode) => value.set_scale(self.declared_scale(), mode),
            None => Err(GenericError::PrecisionViolation(format!(
                "Received Decimal {} is not compatible with scale {} if you desire rounding, \
                 you can annotate type with @deserRounding(\"HALF_UP\") or set the environment \
                 variable AVRO_DECIMAL_DEFAULT_DESER_ROUNDING=HALF_UP",
                value, self.scale
            ))),
        }
    }

    /// Encode as scale varint plus two's complement unscaled bytes.
    pub fn to_bytes(&self, value: &BigDecimal) -> Result<Vec<u8>, GenericError> {
        let fitted = self.fit_for_write(value)?;
        let unscaled = fitted.unscaled().to_signed_bytes_be();
        let mut out = Vec::with_capacity(5 + unscaled.len());
        write_zigzag_int(&mut out, fitted.scale());
        out.extend_from_slice(&unscaled);
        Ok(out)
    }

    /// Decode the bytes form.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<BigDecimal, GenericError> {
        let mut cursor = bytes;
        let scale = decode_zigzag_int(&mut cursor)
            .map_err(|e| GenericError::MalformedEncoding(format!("Invalid decimal scale: {}", e)))?;
        if cursor.is_empty() {
            return Err(GenericError::MalformedEncoding(
                "Decimal bytes hold no unscaled value".to_string(),
            ));
        }
        self.fit_for_read(BigDecimal::new(BigInt::from_signed_bytes_be(cursor), scale))
    }

    /// Encode as plain decimal text.
    pub fn to_text(&self, value: &BigDecimal) -> Result<String, GenericError> {
        Ok(self.fit_for_write(value)?.to_plain_string())
    }

    /// Decode the string form, rounding half-even to the declared precision.
    pub fn from_text(&self, text: &str) -> Result<BigDecimal, GenericError> {
        self.fit_for_read(BigDecimal::parse_with_precision(text, self.precision)?)
    }

    /// Raw value for the backing type.
    pub fn serialize(&self, value: &BigDecimal) -> Result<Value, GenericError> {
        match self.backing {
            DecimalBacking::Bytes => self.to_bytes(value).map(Value::Bytes),
            DecimalBacking::String => self.to_text(value).map(|text| Value::String(text.into())),
        }
    }

    /// Decimal from a raw backing value.
    pub fn deserialize(&self, raw: &Value) -> Result<BigDecimal, GenericError> {
        match (self.backing, raw) {
            (DecimalBacking::Bytes, Value::Bytes(bytes)) => self.from_bytes(bytes),
            (DecimalBacking::String, Value::String(text)) => self.from_text(text),
            (DecimalBacking::String, Value::Utf8(text)) => self.from_text(text.as_str()),
            (DecimalBacking::Bytes, other) => Err(GenericError::mismatch("bytes", other.kind().name())),
            (DecimalBacking::String, other) => Err(GenericError::mismatch("string", other.kind().name())),
        }
    }

    /// Post-process a value read natively by a decoder.
    fn accept_native(&self, value: BigDecimal) -> Result<BigDecimal, GenericError> {
        let value = match self.backing {
            DecimalBacking::String => value.round_to_precision(self.precision, RoundingMode::HalfEven)?,
            DecimalBacking::Bytes => value,
        };
        self.fit_for_read(value)
    }
}

/// Conversion between [`Value::Decimal`] and the raw decimal encodings.
///
/// The rounding defaults apply to schemas that carry no `serRounding` /
/// `deserRounding` attribute of their own.
#[derive(Debug, Clone, Default)]
pub struct DecimalConversion {
    default_ser_rounding: Option<RoundingMode>,
    default_deser_rounding: Option<RoundingMode>,
}

impl DecimalConversion {
    pub fn new(default_ser_rounding: Option<RoundingMode>, default_deser_rounding: Option<RoundingMode>) -> Self {
        Self {
            default_ser_rounding,
            default_deser_rounding,
        }
    }

    /// The decimal declaration for `logical` under this conversion's defaults.
    pub fn declaration(&self, logical: &LogicalType) -> Result<DecimalLogicalType, GenericError> {
        DecimalLogicalType::from_logical(logical, self.default_ser_rounding, self.default_deser_rounding)
    }
}

fn expect_decimal(value: &Value) -> Result<&BigDecimal, GenericError> {
    match value {
        Value::Decimal(decimal) => Ok(decimal),
        other => Err(GenericError::mismatch("decimal", other.kind().name())),
    }
}

impl Conversion for DecimalConversion {
    fn logical_type_name(&self) -> &str {
        "decimal"
    }

    fn converted_kind(&self) -> ValueKind {
        ValueKind::Decimal
    }

    fn to_raw(&self, value: &Value, logical: &LogicalType) -> Result<Value, GenericError> {
        self.declaration(logical)?.serialize(expect_decimal(value)?)
    }

    fn from_raw(&self, raw: Value, logical: &LogicalType) -> Result<Value, GenericError> {
        self.declaration(logical)?.deserialize(&raw).map(Value::Decimal)
    }

    fn hash_code(&self, value: &Value) -> i32 {
        match value {
            Value::Decimal(decimal) => decimal_hash(decimal),
            other => host_hash(other),
        }
    }

    fn try_direct_encode(
        &self,
        value: &Value,
        encoder: &mut dyn Encoder,
        logical: &LogicalType,
    ) -> Result<bool, GenericError> {
        let Some(native) = encoder.as_decimal_encoder() else {
            return Ok(false);
        };
        let fitted = self.declaration(logical)?.fit_for_write(expect_decimal(value)?)?;
        trace!(value = %fitted, "Writing decimal natively");
        native.write_decimal(&fitted, logical)?;
        Ok(true)
    }

    fn try_direct_decode(
        &self,
        decoder: &mut dyn Decoder,
        logical: &LogicalType,
    ) -> Result<Option<Value>, GenericError> {
        let Some(native) = decoder.as_decimal_decoder() else {
            return Ok(None);
        };
        match native.read_decimal(logical)? {
            Some(decimal) => {
                let accepted = self.declaration(logical)?.accept_native(decimal)?;
                Ok(Some(Value::Decimal(accepted)))
            }
            None => Ok(None),
        }
    }
}
