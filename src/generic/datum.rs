//! Schema-directed reading and writing of values through the io traits.
//!
//! The same reader serves wire data and JSON field defaults; the encoding
//! is entirely the encoder's or decoder's business.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GenericError;
use crate::generic::{Array, EnumSymbol, GenericData, Utf8, Value};
use crate::io::{Decoder, Encoder};
use crate::schema::{AvroSchema, SchemaResolutionContext};

/// Reads values of one schema.
///
/// Passing the previous value as `reuse` lets records, arrays, maps, text
/// and fixed values keep their allocations.
#[derive(Debug)]
pub struct GenericDatumReader<'a> {
    data: &'a GenericData,
    schema: AvroSchema,
    context: SchemaResolutionContext,
}

impl<'a> GenericDatumReader<'a> {
    pub fn new(data: &'a GenericData, schema: AvroSchema) -> Self {
        let context = SchemaResolutionContext::build_from_schema(&schema);
        Self::with_context(data, schema, context)
    }

    /// Reader whose named references resolve through `context`.
    pub fn with_context(data: &'a GenericData, schema: AvroSchema, context: SchemaResolutionContext) -> Self {
        Self { data, schema, context }
    }

    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }

    pub fn read(&self, reuse: Option<Value>, decoder: &mut dyn Decoder) -> Result<Value, GenericError> {
        read_datum(self.data, &self.context, reuse, &self.schema, decoder)
    }
}

/// Writes values of one schema.
#[derive(Debug)]
pub struct GenericDatumWriter<'a> {
    data: &'a GenericData,
    schema: AvroSchema,
    context: SchemaResolutionContext,
}

impl<'a> GenericDatumWriter<'a> {
    pub fn new(data: &'a GenericData, schema: AvroSchema) -> Self {
        let context = SchemaResolutionContext::build_from_schema(&schema);
        Self::with_context(data, schema, context)
    }

    pub fn with_context(data: &'a GenericData, schema: AvroSchema, context: SchemaResolutionContext) -> Self {
        Self { data, schema, context }
    }

    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }

    pub fn write(&self, value: &Value, encoder: &mut dyn Encoder) -> Result<(), GenericError> {
        write_datum(self.data, &self.context, value, &self.schema, encoder)
    }
}

pub(crate) fn read_datum(
    data: &GenericData,
    context: &SchemaResolutionContext,
    reuse: Option<Value>,
    schema: &AvroSchema,
    decoder: &mut dyn Decoder,
) -> Result<Value, GenericError> {
    let value = match schema {
        AvroSchema::Logical(logical) => {
            let Some(conversion) = data.conversions.get_for(logical) else {
                return read_datum(data, context, reuse, &logical.base, decoder);
            };
            if let Some(value) = conversion.try_direct_decode(decoder, logical)? {
                return Ok(value);
            }
            let raw = read_datum(data, context, None, &logical.base, decoder)?;
            conversion.from_raw(raw, logical)?
        }
        AvroSchema::Named(_) => {
            let resolved = context.resolve(schema)?;
            return read_datum(data, context, reuse, resolved, decoder);
        }
        AvroSchema::Null => {
            decoder.read_null()?;
            Value::Null
        }
        AvroSchema::Boolean => Value::Boolean(decoder.read_boolean()?),
        AvroSchema::Int => Value::Int(decoder.read_int()?),
        AvroSchema::Long => Value::Long(decoder.read_long()?),
        AvroSchema::Float => Value::Float(decoder.read_float()?),
        AvroSchema::Double => Value::Double(decoder.read_double()?),
        AvroSchema::Bytes => Value::Bytes(decoder.read_bytes()?),
        AvroSchema::String => {
            let text = decoder.read_string()?;
            match reuse {
                Some(Value::Utf8(mut utf8)) => {
                    utf8.set(&text);
                    Value::Utf8(utf8)
                }
                _ => Value::Utf8(Utf8::from(text)),
            }
        }
        AvroSchema::Record(record_schema) => {
            let mut record = data.new_record(reuse, record_schema);
            decoder.read_record_start(record_schema)?;
            for field in &record_schema.fields {
                decoder.read_field_start(field)?;
                let old = record.take(field.position);
                let value = read_datum(data, context, Some(old), &field.schema, decoder)?;
                record.put(field.position, value)?;
            }
            decoder.read_record_end()?;
            Value::Record(record)
        }
        AvroSchema::Enum(enum_schema) => {
            let ordinal = decoder.read_enum(enum_schema)?;
            Value::Enum(EnumSymbol::from_ordinal(Arc::clone(enum_schema), ordinal)?)
        }
        AvroSchema::Array(items) => {
            let mut array = match reuse {
                Some(Value::Array(mut array)) => {
                    array.reset();
                    array
                }
                _ => Array::new(),
            };
            let mut count = decoder.read_array_start()?;
            while count > 0 {
                array.reserve(count);
                for _ in 0..count {
                    let old = array.peek_mut().map(std::mem::take);
                    let element = read_datum(data, context, old, items, decoder)?;
                    array.push(element);
                }
                count = decoder.array_next()?;
            }
            Value::Array(array)
        }
        AvroSchema::Map(values) => {
            let mut map = match reuse {
                Some(Value::Map(mut map)) => {
                    map.clear();
                    map
                }
                _ => HashMap::new(),
            };
            let mut count = decoder.read_map_start()?;
            while count > 0 {
                map.reserve(count);
                for _ in 0..count {
                    let key = decoder.read_map_key()?;
                    let value = read_datum(data, context, None, values, decoder)?;
                    map.insert(key, value);
                }
                count = decoder.map_next()?;
            }
            Value::Map(map)
        }
        AvroSchema::Union(variants) => {
            let index = decoder.read_index(variants)?;
            let member = variants.get(index).ok_or(GenericError::IndexOutOfBounds {
                index,
                len: variants.len(),
            })?;
            return read_datum(data, context, reuse, member, decoder);
        }
        AvroSchema::Fixed(fixed_schema) => {
            let bytes = decoder.read_fixed(fixed_schema.size)?;
            Value::Fixed(data.create_fixed(reuse, &bytes, fixed_schema)?)
        }
    };
    Ok(value)
}

pub(crate) fn write_datum(
    data: &GenericData,
    context: &SchemaResolutionContext,
    value: &Value,
    schema: &AvroSchema,
    encoder: &mut dyn Encoder,
) -> Result<(), GenericError> {
    match (schema, value) {
        (AvroSchema::Logical(logical), _) => match data.conversion_by_kind(value.kind(), logical) {
            Some(conversion) => {
                if conversion.try_direct_encode(value, encoder, logical)? {
                    return Ok(());
                }
                let raw = conversion.to_raw(value, logical)?;
                write_datum(data, context, &raw, &logical.base, encoder)
            }
            None => write_datum(data, context, value, &logical.base, encoder),
        },
        (AvroSchema::Named(name), _) => match context.get(name) {
            Some(resolved) => write_datum(data, context, value, resolved, encoder),
            None => {
                let resolved = data.resolve_named(name, value)?;
                write_datum(data, context, value, &resolved, encoder)
            }
        },
        (AvroSchema::Null, Value::Null) => Ok(encoder.write_null()?),
        (AvroSchema::Boolean, Value::Boolean(b)) => Ok(encoder.write_boolean(*b)?),
        (AvroSchema::Int, Value::Int(n)) => Ok(encoder.write_int(*n)?),
        (AvroSchema::Long, Value::Long(n)) => Ok(encoder.write_long(*n)?),
        (AvroSchema::Float, Value::Float(n)) => Ok(encoder.write_float(*n)?),
        (AvroSchema::Double, Value::Double(n)) => Ok(encoder.write_double(*n)?),
        (AvroSchema::Bytes, Value::Bytes(bytes)) => Ok(encoder.write_bytes(bytes)?),
        (AvroSchema::String, Value::String(_) | Value::Utf8(_)) => {
            Ok(encoder.write_string(value.as_str().unwrap_or_default())?)
        }
        (AvroSchema::Record(record_schema), Value::Record(record)) => {
            encoder.write_record_start(record_schema)?;
            for field in &record_schema.fields {
                let field_value = record.get(field.position).ok_or_else(|| GenericError::FieldIndexOutOfRange {
                    record: record_schema.fullname(),
                    index: field.position,
                    len: record.len(),
                })?;
                encoder.write_field(field)?;
                write_datum(data, context, field_value, &field.schema, encoder)?;
            }
            Ok(encoder.write_record_end()?)
        }
        (AvroSchema::Enum(enum_schema), Value::Enum(_) | Value::String(_) | Value::Utf8(_)) => {
            let symbol = match value {
                Value::Enum(symbol) => symbol.symbol(),
                _ => value.as_str().unwrap_or_default(),
            };
            let ordinal = enum_schema.ordinal(symbol).ok_or_else(|| GenericError::UnknownEnumSymbol {
                name: enum_schema.fullname(),
                symbol: symbol.to_string(),
            })?;
            Ok(encoder.write_enum(ordinal, &enum_schema.symbols[ordinal])?)
        }
        (AvroSchema::Array(items), Value::Array(array)) => {
            encoder.write_array_start(array.len())?;
            for element in array {
                write_datum(data, context, element, items, encoder)?;
            }
            Ok(encoder.write_array_end()?)
        }
        (AvroSchema::Map(values), Value::Map(map)) => {
            encoder.write_map_start(map.len())?;
            for (key, entry) in map {
                encoder.write_map_key(key)?;
                write_datum(data, context, entry, values, encoder)?;
            }
            Ok(encoder.write_map_end()?)
        }
        (AvroSchema::Union(variants), _) => {
            let index = data.resolve_union_members(variants, value)?;
            let member = &variants[index];
            encoder.write_index(index, member)?;
            write_datum(data, context, value, member, encoder)
        }
        (AvroSchema::Fixed(fixed_schema), Value::Fixed(fixed)) => {
            if fixed.len() != fixed_schema.size {
                return Err(GenericError::FixedSizeMismatch {
                    name: fixed_schema.fullname(),
                    expected: fixed_schema.size,
                    actual: fixed.len(),
                });
            }
            Ok(encoder.write_fixed(fixed.bytes())?)
        }
        _ => Err(GenericError::mismatch(schema.type_name(), value.kind().name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::{Fixed, Record};
    use crate::io::{BinaryDecoder, BinaryEncoder, JsonDecoder, JsonEncoder};
    use crate::logical::BigDecimal;
    use crate::schema::{EnumSchema, FieldSchema, FixedSchema, LogicalType, LogicalTypeName, RecordSchema};

    fn decimal_schema() -> AvroSchema {
        AvroSchema::Logical(LogicalType::new(
            AvroSchema::Bytes,
            LogicalTypeName::Decimal { precision: 9, scale: 2 },
        ))
    }

    fn schema() -> Arc<RecordSchema> {
        Arc::new(RecordSchema::new(
            "Order",
            vec![
                FieldSchema::new("id", AvroSchema::Long),
                FieldSchema::new("note", AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::String])),
                FieldSchema::new(
                    "status",
                    AvroSchema::Enum(Arc::new(EnumSchema::new("Status", vec!["NEW".into(), "DONE".into()]))),
                ),
                FieldSchema::new("lines", AvroSchema::Array(Box::new(AvroSchema::Int))),
                FieldSchema::new("attrs", AvroSchema::Map(Box::new(AvroSchema::Double))),
                FieldSchema::new("tag", AvroSchema::Fixed(Arc::new(FixedSchema::new("Tag", 2)))),
                FieldSchema::new("total", decimal_schema()),
            ],
        ))
    }

    fn order(data: &GenericData, schema: &Arc<RecordSchema>) -> Value {
        let mut record = Record::new(Arc::clone(schema));
        record.put(0, 42i64).unwrap();
        record.put(1, "rush").unwrap();
        record.put(2, data.create_enum("DONE", schema_enum(schema)).unwrap()).unwrap();
        record
            .put(3, Array::from(vec![Value::Int(1), Value::Int(2)]))
            .unwrap();
        record
            .put(4, HashMap::from([("w".to_string(), Value::Double(1.5))]))
            .unwrap();
        let tag = match &schema.fields[5].schema {
            AvroSchema::Fixed(fixed) => Fixed::from_bytes(Arc::clone(fixed), &[7, 8]).unwrap(),
            _ => unreachable!(),
        };
        record.put(5, tag).unwrap();
        record.put(6, BigDecimal::new(12_345, 2)).unwrap();
        Value::Record(record)
    }

    fn schema_enum(schema: &RecordSchema) -> &Arc<EnumSchema> {
        match &schema.fields[2].schema {
            AvroSchema::Enum(e) => e,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_binary_roundtrip() {
        let data = GenericData::new();
        let schema = schema();
        let record_schema = AvroSchema::Record(Arc::clone(&schema));
        let value = order(&data, &schema);

        let mut encoder = BinaryEncoder::new();
        GenericDatumWriter::new(&data, record_schema.clone())
            .write(&value, &mut encoder)
            .unwrap();
        let bytes = encoder.into_inner();

        let reader = GenericDatumReader::new(&data, record_schema.clone());
        let mut decoder = BinaryDecoder::new(&bytes);
        let decoded = reader.read(None, &mut decoder).unwrap();
        assert!(decoder.is_empty());
        assert!(data.equals(&value, &decoded, &record_schema).unwrap());
    }

    #[test]
    fn test_json_roundtrip_uses_native_decimal() {
        let data = GenericData::new();
        let schema = schema();
        let record_schema = AvroSchema::Record(Arc::clone(&schema));
        let value = order(&data, &schema);

        let mut encoder = JsonEncoder::new();
        GenericDatumWriter::new(&data, record_schema.clone())
            .write(&value, &mut encoder)
            .unwrap();
        let json = encoder.into_value().unwrap();
        assert!(json["total"].is_number());

        let decoded = GenericDatumReader::new(&data, record_schema.clone())
            .read(None, &mut JsonDecoder::new(json))
            .unwrap();
        assert!(data.equals(&value, &decoded, &record_schema).unwrap());
    }

    #[test]
    fn test_reuse_keeps_record() {
        let data = GenericData::new();
        let schema = schema();
        let record_schema = AvroSchema::Record(Arc::clone(&schema));
        let value = order(&data, &schema);

        let mut encoder = BinaryEncoder::new();
        let writer = GenericDatumWriter::new(&data, record_schema.clone());
        writer.write(&value, &mut encoder).unwrap();
        writer.write(&value, &mut encoder).unwrap();
        let bytes = encoder.into_inner();

        let reader = GenericDatumReader::new(&data, record_schema.clone());
        let mut decoder = BinaryDecoder::new(&bytes);
        let first = reader.read(None, &mut decoder).unwrap();
        let second = reader.read(Some(first), &mut decoder).unwrap();
        assert!(data.equals(&value, &second, &record_schema).unwrap());
    }

    #[test]
    fn test_write_rejects_wrong_shape() {
        let data = GenericData::new();
        let mut encoder = BinaryEncoder::new();
        let writer = GenericDatumWriter::new(&data, AvroSchema::Int);
        assert!(matches!(
            writer.write(&Value::from("x"), &mut encoder),
            Err(GenericError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_write_rejects_unknown_enum_text() {
        let data = GenericData::new();
        let status = AvroSchema::Enum(Arc::new(EnumSchema::new("Status", vec!["NEW".into()])));
        let mut encoder = BinaryEncoder::new();
        let err = GenericDatumWriter::new(&data, status)
            .write(&Value::from("GONE"), &mut encoder)
            .unwrap_err();
        assert!(matches!(err, GenericError::UnknownEnumSymbol { .. }));
    }

    #[test]
    fn test_decimal_over_precision_fails_to_write() {
        let data = GenericData::new();
        let mut encoder = BinaryEncoder::new();
        let err = GenericDatumWriter::new(&data, decimal_schema())
            .write(&Value::Decimal(BigDecimal::new(1_000_000_000i64, 2)), &mut encoder)
            .unwrap_err();
        assert!(matches!(err, GenericError::PrecisionViolation(_)));
    }
}
