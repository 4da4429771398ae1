//! Avro JSON encoding.
//!
//! Values are built as, and read from, a `serde_json::Value` tree. Bytes and
//! fixed values are strings whose chars are the byte values (ISO-8859-1).
//! Union values are wrapped as `{"<member type name>": value}`, except null.
//!
//! The decoder is lenient in the ways field defaults need:
//! - record fields missing from the input take their declared default, or
//!   null when the field is nullable
//! - union values may be given bare, in which case the first member whose
//!   JSON shape matches is chosen
//! - `float` and `double` accept the strings `"NaN"`, `"Infinity"` and
//!   `"-Infinity"`
//!
//! Both sides implement the decimal extension, writing decimals as exact
//! JSON numbers.

use std::collections::VecDeque;

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{DecodeError, EncodeError};
use crate::io::{DecimalDecoder, DecimalEncoder, Decoder, Encoder};
use crate::logical::BigDecimal;
use crate::schema::{AvroSchema, EnumSchema, FieldSchema, LogicalType, LogicalTypeName, RecordSchema};

fn bytes_to_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn latin1_to_bytes(text: &str) -> Result<Vec<u8>, DecodeError> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                DecodeError::InvalidData(format!("Character {:?} is not a byte value", c))
            })
        })
        .collect()
}

fn non_finite_name(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

fn parse_non_finite(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

fn number_from_text(text: &str) -> Result<JsonValue, EncodeError> {
    text.parse::<Number>()
        .map(JsonValue::Number)
        .map_err(|e| EncodeError::TypeMismatch(format!("'{}' is not a JSON number: {}", text, e)))
}

fn describe(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[derive(Debug)]
enum EncodeFrame {
    Array(Vec<JsonValue>),
    Map {
        entries: Map<String, JsonValue>,
        key: Option<String>,
    },
    Record {
        fields: Map<String, JsonValue>,
        field: Option<String>,
    },
    Union(String),
}

/// Builds the Avro JSON form of a value.
#[derive(Debug, Default)]
pub struct JsonEncoder {
    stack: Vec<EncodeFrame>,
    root: Option<JsonValue>,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish encoding and return the JSON tree.
    pub fn into_value(self) -> Result<JsonValue, EncodeError> {
        if !self.stack.is_empty() {
            return Err(EncodeError::InvalidState(format!(
                "{} unterminated container(s)",
                self.stack.len()
            )));
        }
        self.root
            .ok_or_else(|| EncodeError::InvalidState("No value written".to_string()))
    }

    fn emit(&mut self, mut value: JsonValue) -> Result<(), EncodeError> {
        while matches!(self.stack.last(), Some(EncodeFrame::Union(_))) {
            if let Some(EncodeFrame::Union(branch)) = self.stack.pop() {
                let mut wrapper = Map::new();
                wrapper.insert(branch, value);
                value = JsonValue::Object(wrapper);
            }
        }

        match self.stack.last_mut() {
            None => {
                if self.root.is_some() {
                    return Err(EncodeError::InvalidState(
                        "A complete value was already written".to_string(),
                    ));
                }
                self.root = Some(value);
            }
            Some(EncodeFrame::Array(items)) => items.push(value),
            Some(EncodeFrame::Map { entries, key }) => {
                let key = key.take().ok_or_else(|| {
                    EncodeError::InvalidState("Map value written without a key".to_string())
                })?;
                entries.insert(key, value);
            }
            Some(EncodeFrame::Record { fields, field }) => {
                let name = field.take().ok_or_else(|| {
                    EncodeError::InvalidState("Record value written without a field".to_string())
                })?;
                fields.insert(name, value);
            }
            Some(EncodeFrame::Union(_)) => {
                return Err(EncodeError::InvalidState("Dangling union branch".to_string()))
            }
        }
        Ok(())
    }

    fn emit_float(&mut self, value: f64, text: String) -> Result<(), EncodeError> {
        if value.is_finite() {
            let number = number_from_text(&text)?;
            self.emit(number)
        } else {
            self.emit(JsonValue::String(non_finite_name(value).to_string()))
        }
    }
}

impl Encoder for JsonEncoder {
    fn write_null(&mut self) -> Result<(), EncodeError> {
        self.emit(JsonValue::Null)
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), EncodeError> {
        self.emit(JsonValue::Bool(value))
    }

    fn write_int(&mut self, value: i32) -> Result<(), EncodeError> {
        self.emit(JsonValue::from(value))
    }

    fn write_long(&mut self, value: i64) -> Result<(), EncodeError> {
        self.emit(JsonValue::from(value))
    }

    fn write_float(&mut self, value: f32) -> Result<(), EncodeError> {
        self.emit_float(value as f64, value.to_string())
    }

    fn write_double(&mut self, value: f64) -> Result<(), EncodeError> {
        self.emit_float(value, value.to_string())
    }

    fn write_bytes(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        self.emit(JsonValue::String(bytes_to_latin1(value)))
    }

    fn write_string(&mut self, value: &str) -> Result<(), EncodeError> {
        self.emit(JsonValue::String(value.to_string()))
    }

    fn write_fixed(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        self.write_bytes(value)
    }

    fn write_enum(&mut self, _index: usize, symbol: &str) -> Result<(), EncodeError> {
        self.write_string(symbol)
    }

    fn write_array_start(&mut self, len: usize) -> Result<(), EncodeError> {
        self.stack.push(EncodeFrame::Array(Vec::with_capacity(len)));
        Ok(())
    }

    fn write_array_end(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(EncodeFrame::Array(items)) => self.emit(JsonValue::Array(items)),
            _ => Err(EncodeError::InvalidState("Array end without array start".to_string())),
        }
    }

    fn write_map_start(&mut self, _len: usize) -> Result<(), EncodeError> {
        self.stack.push(EncodeFrame::Map {
            entries: Map::new(),
            key: None,
        });
        Ok(())
    }

    fn write_map_key(&mut self, key: &str) -> Result<(), EncodeError> {
        match self.stack.last_mut() {
            Some(EncodeFrame::Map { key: pending, .. }) => {
                *pending = Some(key.to_string());
                Ok(())
            }
            _ => Err(EncodeError::InvalidState("Map key outside of a map".to_string())),
        }
    }

    fn write_map_end(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(EncodeFrame::Map { entries, .. }) => self.emit(JsonValue::Object(entries)),
            _ => Err(EncodeError::InvalidState("Map end without map start".to_string())),
        }
    }

    fn write_index(&mut self, _index: usize, member: &AvroSchema) -> Result<(), EncodeError> {
        if !matches!(member, AvroSchema::Null) {
            self.stack.push(EncodeFrame::Union(member.type_name()));
        }
        Ok(())
    }

    fn write_record_start(&mut self, _schema: &RecordSchema) -> Result<(), EncodeError> {
        self.stack.push(EncodeFrame::Record {
            fields: Map::new(),
            field: None,
        });
        Ok(())
    }

    fn write_field(&mut self, field: &FieldSchema) -> Result<(), EncodeError> {
        match self.stack.last_mut() {
            Some(EncodeFrame::Record { field: pending, .. }) => {
                *pending = Some(field.name.clone());
                Ok(())
            }
            _ => Err(EncodeError::InvalidState("Field outside of a record".to_string())),
        }
    }

    fn write_record_end(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(EncodeFrame::Record { fields, .. }) => self.emit(JsonValue::Object(fields)),
            _ => Err(EncodeError::InvalidState("Record end without record start".to_string())),
        }
    }

    fn as_decimal_encoder(&mut self) -> Option<&mut dyn DecimalEncoder> {
        Some(self)
    }
}

impl DecimalEncoder for JsonEncoder {
    fn write_decimal(&mut self, value: &BigDecimal, _logical: &LogicalType) -> Result<(), EncodeError> {
        let number = number_from_text(&value.to_plain_string())?;
        self.emit(number)
    }
}

#[derive(Debug, Default)]
struct DecodeFrame {
    pending: VecDeque<JsonValue>,
    fields: Option<Map<String, JsonValue>>,
}

/// Reads values from their Avro JSON form.
#[derive(Debug)]
pub struct JsonDecoder {
    stack: Vec<DecodeFrame>,
}

impl JsonDecoder {
    /// Decode from an already parsed JSON tree.
    pub fn new(value: JsonValue) -> Self {
        Self {
            stack: vec![DecodeFrame {
                pending: VecDeque::from([value]),
                fields: None,
            }],
        }
    }

    /// Parse JSON text and decode from it.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(text)
            .map(Self::new)
            .map_err(|e| DecodeError::InvalidData(format!("Invalid JSON: {}", e)))
    }

    fn top(&mut self) -> Result<&mut DecodeFrame, DecodeError> {
        self.stack.last_mut().ok_or(DecodeError::UnexpectedEof)
    }

    fn next(&mut self) -> Result<JsonValue, DecodeError> {
        self.top()?.pending.pop_front().ok_or(DecodeError::UnexpectedEof)
    }

    fn peek(&self) -> Option<&JsonValue> {
        self.stack.last().and_then(|frame| frame.pending.front())
    }

    fn push_front(&mut self, value: JsonValue) -> Result<(), DecodeError> {
        self.top()?.pending.push_front(value);
        Ok(())
    }

    fn next_string(&mut self, expected: &str) -> Result<String, DecodeError> {
        match self.next()? {
            JsonValue::String(s) => Ok(s),
            other => Err(DecodeError::TypeMismatch(format!(
                "expected {}, found {}",
                expected,
                describe(&other)
            ))),
        }
    }

    fn next_floating(&mut self, expected: &str) -> Result<f64, DecodeError> {
        let value = self.next()?;
        let parsed = match &value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => parse_non_finite(s),
            _ => None,
        };
        parsed.ok_or_else(|| {
            DecodeError::TypeMismatch(format!("expected {}, found {}", expected, value))
        })
    }

    fn next_integer(&mut self, expected: &str) -> Result<i64, DecodeError> {
        let value = self.next()?;
        value.as_i64().ok_or_else(|| {
            DecodeError::TypeMismatch(format!("expected {}, found {}", expected, value))
        })
    }

    fn finish_block(&mut self) -> Result<usize, DecodeError> {
        match self.stack.pop() {
            Some(frame) if frame.pending.is_empty() => Ok(0),
            Some(frame) => Err(DecodeError::InvalidData(format!(
                "{} unread item(s) left in block",
                frame.pending.len()
            ))),
            None => Err(DecodeError::InvalidData("Block end without block start".to_string())),
        }
    }
}

/// Whether a bare JSON value has the shape of `schema`.
fn json_matches(schema: &AvroSchema, value: &JsonValue) -> bool {
    match (schema, value) {
        (AvroSchema::Null, JsonValue::Null) => true,
        (AvroSchema::Boolean, JsonValue::Bool(_)) => true,
        (AvroSchema::Int | AvroSchema::Long, JsonValue::Number(n)) => n.is_i64() || n.is_u64(),
        (AvroSchema::Float | AvroSchema::Double, JsonValue::Number(_)) => true,
        (AvroSchema::Float | AvroSchema::Double, JsonValue::String(s)) => parse_non_finite(s).is_some(),
        (AvroSchema::Bytes | AvroSchema::String, JsonValue::String(_)) => true,
        (AvroSchema::Fixed(fixed), JsonValue::String(s)) => s.chars().count() == fixed.size,
        (AvroSchema::Enum(enum_schema), JsonValue::String(s)) => enum_schema.has_symbol_or_alias(s),
        (AvroSchema::Record(_) | AvroSchema::Map(_), JsonValue::Object(_)) => true,
        (AvroSchema::Array(_), JsonValue::Array(_)) => true,
        (AvroSchema::Named(_), JsonValue::Object(_) | JsonValue::String(_)) => true,
        (AvroSchema::Logical(lt), JsonValue::Number(_))
            if matches!(lt.logical_type, LogicalTypeName::Decimal { .. }) =>
        {
            true
        }
        (AvroSchema::Logical(lt), value) => json_matches(&lt.base, value),
        _ => false,
    }
}

impl Decoder for JsonDecoder {
    fn read_null(&mut self) -> Result<(), DecodeError> {
        match self.next()? {
            JsonValue::Null => Ok(()),
            other => Err(DecodeError::TypeMismatch(format!(
                "expected null, found {}",
                describe(&other)
            ))),
        }
    }

    fn read_boolean(&mut self) -> Result<bool, DecodeError> {
        match self.next()? {
            JsonValue::Bool(b) => Ok(b),
            other => Err(DecodeError::TypeMismatch(format!(
                "expected boolean, found {}",
                describe(&other)
            ))),
        }
    }

    fn read_int(&mut self) -> Result<i32, DecodeError> {
        let value = self.next_integer("int")?;
        i32::try_from(value).map_err(|_| {
            DecodeError::InvalidData(format!("Integer overflow: {} does not fit in i32", value))
        })
    }

    fn read_long(&mut self) -> Result<i64, DecodeError> {
        self.next_integer("long")
    }

    fn read_float(&mut self) -> Result<f32, DecodeError> {
        Ok(self.next_floating("float")? as f32)
    }

    fn read_double(&mut self) -> Result<f64, DecodeError> {
        self.next_floating("double")
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let text = self.next_string("bytes")?;
        latin1_to_bytes(&text)
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        self.next_string("string")
    }

    fn read_fixed(&mut self, size: usize) -> Result<Vec<u8>, DecodeError> {
        let text = self.next_string("fixed")?;
        let bytes = latin1_to_bytes(&text)?;
        if bytes.len() != size {
            return Err(DecodeError::InvalidData(format!(
                "Fixed of size {} given {} bytes",
                size,
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    fn read_enum(&mut self, schema: &EnumSchema) -> Result<usize, DecodeError> {
        let symbol = self.next_string("enum symbol")?;
        schema.ordinal(&symbol).ok_or_else(|| {
            DecodeError::InvalidData(format!(
                "Unknown symbol '{}' for enum '{}'",
                symbol,
                schema.fullname()
            ))
        })
    }

    fn read_index(&mut self, variants: &[AvroSchema]) -> Result<usize, DecodeError> {
        let value = self.next()?;

        if value.is_null() {
            let index = variants
                .iter()
                .position(|v| matches!(v, AvroSchema::Null))
                .ok_or_else(|| DecodeError::TypeMismatch("null is not a member of the union".to_string()))?;
            self.push_front(value)?;
            return Ok(index);
        }

        if let JsonValue::Object(map) = &value {
            if map.len() == 1 {
                let wrapped = map
                    .keys()
                    .next()
                    .and_then(|key| variants.iter().position(|v| v.type_name() == *key));
                if let Some(index) = wrapped {
                    if let JsonValue::Object(map) = value {
                        if let Some((_, inner)) = map.into_iter().next() {
                            self.push_front(inner)?;
                        }
                    }
                    return Ok(index);
                }
            }
        }

        let index = variants
            .iter()
            .position(|v| json_matches(v, &value))
            .ok_or_else(|| {
                DecodeError::TypeMismatch(format!("No union member matches {}", value))
            })?;
        self.push_front(value)?;
        Ok(index)
    }

    fn read_array_start(&mut self) -> Result<usize, DecodeError> {
        match self.next()? {
            JsonValue::Array(items) if items.is_empty() => Ok(0),
            JsonValue::Array(items) => {
                let len = items.len();
                self.stack.push(DecodeFrame {
                    pending: items.into(),
                    fields: None,
                });
                Ok(len)
            }
            other => Err(DecodeError::TypeMismatch(format!(
                "expected array, found {}",
                describe(&other)
            ))),
        }
    }

    fn array_next(&mut self) -> Result<usize, DecodeError> {
        self.finish_block()
    }

    fn read_map_start(&mut self) -> Result<usize, DecodeError> {
        match self.next()? {
            JsonValue::Object(entries) if entries.is_empty() => Ok(0),
            JsonValue::Object(entries) => {
                let len = entries.len();
                let mut pending = VecDeque::with_capacity(len * 2);
                for (key, value) in entries {
                    pending.push_back(JsonValue::String(key));
                    pending.push_back(value);
                }
                self.stack.push(DecodeFrame {
                    pending,
                    fields: None,
                });
                Ok(len)
            }
            other => Err(DecodeError::TypeMismatch(format!(
                "expected map, found {}",
                describe(&other)
            ))),
        }
    }

    fn read_map_key(&mut self) -> Result<String, DecodeError> {
        self.next_string("map key")
    }

    fn map_next(&mut self) -> Result<usize, DecodeError> {
        self.finish_block()
    }

    fn read_record_start(&mut self, schema: &RecordSchema) -> Result<(), DecodeError> {
        match self.next()? {
            JsonValue::Object(fields) => {
                self.stack.push(DecodeFrame {
                    pending: VecDeque::new(),
                    fields: Some(fields),
                });
                Ok(())
            }
            other => Err(DecodeError::TypeMismatch(format!(
                "expected record {}, found {}",
                schema.fullname(),
                describe(&other)
            ))),
        }
    }

    fn read_field_start(&mut self, field: &FieldSchema) -> Result<(), DecodeError> {
        let frame = self.top()?;
        let fields = frame
            .fields
            .as_mut()
            .ok_or_else(|| DecodeError::InvalidData(format!("Field {} outside of a record", field.name)))?;

        let supplied = fields.remove(&field.name).or_else(|| {
            field
                .aliases
                .iter()
                .find_map(|alias| fields.remove(alias))
        });

        let value = match (supplied, &field.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default.clone(),
            (None, None) if matches!(field.schema, AvroSchema::Null) || field.schema.is_nullable() => {
                JsonValue::Null
            }
            (None, None) => return Err(DecodeError::MissingField(field.name.clone())),
        };
        frame.pending.push_back(value);
        Ok(())
    }

    fn read_record_end(&mut self) -> Result<(), DecodeError> {
        match self.stack.pop() {
            Some(frame) if frame.fields.is_some() => Ok(()),
            _ => Err(DecodeError::InvalidData("Record end without record start".to_string())),
        }
    }

    fn as_decimal_decoder(&mut self) -> Option<&mut dyn DecimalDecoder> {
        Some(self)
    }
}

impl DecimalDecoder for JsonDecoder {
    fn read_decimal(&mut self, logical: &LogicalType) -> Result<Option<BigDecimal>, DecodeError> {
        let native = match self.peek() {
            Some(JsonValue::Number(_)) => true,
            Some(JsonValue::String(_)) => matches!(*logical.base, AvroSchema::String),
            _ => false,
        };
        if !native {
            return Ok(None);
        }

        let text = match self.next()? {
            JsonValue::Number(n) => n.to_string(),
            JsonValue::String(s) => s,
            other => other.to_string(),
        };
        text.parse::<BigDecimal>()
            .map(Some)
            .map_err(|e| DecodeError::InvalidData(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoder_builds_nested_tree() {
        let mut encoder = JsonEncoder::new();
        let record = RecordSchema::new("R", vec![]);
        encoder.write_record_start(&record).unwrap();
        encoder.write_field(&FieldSchema::new("xs", AvroSchema::Null)).unwrap();
        encoder.write_array_start(2).unwrap();
        encoder.write_int(1).unwrap();
        encoder.write_index(1, &AvroSchema::String).unwrap();
        encoder.write_string("a").unwrap();
        encoder.write_array_end().unwrap();
        encoder.write_field(&FieldSchema::new("raw", AvroSchema::Null)).unwrap();
        encoder.write_bytes(&[0x00, 0xFF]).unwrap();
        encoder.write_record_end().unwrap();

        let value = encoder.into_value().unwrap();
        assert_eq!(value, json!({"xs": [1, {"string": "a"}], "raw": "\u{0000}\u{00ff}"}));
    }

    #[test]
    fn test_encoder_non_finite_doubles() {
        let mut encoder = JsonEncoder::new();
        encoder.write_double(f64::NEG_INFINITY).unwrap();
        assert_eq!(encoder.into_value().unwrap(), json!("-Infinity"));
    }

    #[test]
    fn test_encoder_rejects_unterminated() {
        let mut encoder = JsonEncoder::new();
        encoder.write_array_start(0).unwrap();
        assert!(encoder.into_value().is_err());
    }

    #[test]
    fn test_decoder_union_forms() {
        let variants = vec![AvroSchema::Null, AvroSchema::Int, AvroSchema::String];

        let mut decoder = JsonDecoder::new(json!({"string": "x"}));
        assert_eq!(decoder.read_index(&variants).unwrap(), 2);
        assert_eq!(decoder.read_string().unwrap(), "x");

        let mut decoder = JsonDecoder::new(json!(7));
        assert_eq!(decoder.read_index(&variants).unwrap(), 1);
        assert_eq!(decoder.read_int().unwrap(), 7);

        let mut decoder = JsonDecoder::new(JsonValue::Null);
        assert_eq!(decoder.read_index(&variants).unwrap(), 0);
        decoder.read_null().unwrap();

        let mut decoder = JsonDecoder::new(json!(true));
        assert!(decoder.read_index(&variants).is_err());
    }

    #[test]
    fn test_decoder_fills_missing_fields() {
        let record = RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("a", AvroSchema::Int).with_default(json!(5)),
                FieldSchema::new("b", AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Int])),
                FieldSchema::new("c", AvroSchema::Int),
            ],
        );
        let mut decoder = JsonDecoder::new(json!({}));
        decoder.read_record_start(&record).unwrap();
        decoder.read_field_start(&record.fields[0]).unwrap();
        assert_eq!(decoder.read_int().unwrap(), 5);
        decoder.read_field_start(&record.fields[1]).unwrap();
        assert_eq!(decoder.read_index(&[AvroSchema::Null, AvroSchema::Int]).unwrap(), 0);
        decoder.read_null().unwrap();
        assert!(matches!(
            decoder.read_field_start(&record.fields[2]),
            Err(DecodeError::MissingField(name)) if name == "c"
        ));
    }

    #[test]
    fn test_decoder_non_finite_strings() {
        let mut decoder = JsonDecoder::new(json!(["NaN", "Infinity", 1.5]));
        assert_eq!(decoder.read_array_start().unwrap(), 3);
        assert!(decoder.read_double().unwrap().is_nan());
        assert_eq!(decoder.read_float().unwrap(), f32::INFINITY);
        assert_eq!(decoder.read_double().unwrap(), 1.5);
        assert_eq!(decoder.array_next().unwrap(), 0);
    }

    #[test]
    fn test_decoder_bytes_are_latin1() {
        let mut decoder = JsonDecoder::new(json!("\u{00e9}A"));
        assert_eq!(decoder.read_bytes().unwrap(), vec![0xE9, b'A']);

        let mut decoder = JsonDecoder::new(json!("\u{0100}"));
        assert!(decoder.read_bytes().is_err());
    }

    #[test]
    fn test_decimal_extension_only_takes_native_form() {
        let logical = LogicalType::new(
            AvroSchema::Bytes,
            LogicalTypeName::Decimal {
                precision: 5,
                scale: 2,
            },
        );
        let mut decoder = JsonDecoder::parse("12.50").unwrap();
        let value = decoder.read_decimal(&logical).unwrap();
        assert_eq!(value, Some(BigDecimal::new(1250, 2)));

        let mut decoder = JsonDecoder::new(json!("\u{0004}\u{007e}"));
        assert_eq!(decoder.read_decimal(&logical).unwrap(), None);
        assert_eq!(decoder.read_bytes().unwrap(), vec![0x04, 0x7E]);
    }
}
