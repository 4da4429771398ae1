//! Ordering, equality and hashing of values under a schema.
//!
//! The ordering matches [`binary_compare`](crate::io::binary_compare) on the
//! encoded forms: records go field by field honouring `order`, enums by
//! ordinal, arrays element-wise then by length, unions by member index,
//! text and bytes byte-wise. Maps can only be tested for equality.
//!
//! Hashes are 32-bit and stable across runs so they can be compared with
//! other Avro implementations.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GenericError;
use crate::generic::{GenericData, Record, Value};
use crate::logical::{uuid_hash, BigDecimal};
use crate::schema::{AvroSchema, EnumSchema, FieldOrder, RecordSchema};

impl GenericData {
    /// Order `a` against `b` under `schema`.
    pub fn compare(&self, a: &Value, b: &Value, schema: &AvroSchema) -> Result<Ordering, GenericError> {
        self.compare_with(a, b, schema, false)
    }

    /// Whether `a` equals `b` under `schema`. Maps are allowed here.
    pub fn equals(&self, a: &Value, b: &Value, schema: &AvroSchema) -> Result<bool, GenericError> {
        Ok(self.compare_with(a, b, schema, true)? == Ordering::Equal)
    }

    /// Order or equality test; `equals_only` allows maps and only promises
    /// `Equal` versus not `Equal`.
    pub fn compare_with(
        &self,
        a: &Value,
        b: &Value,
        schema: &AvroSchema,
        equals_only: bool,
    ) -> Result<Ordering, GenericError> {
        if std::ptr::eq(a, b) {
            return Ok(Ordering::Equal);
        }
        match schema {
            AvroSchema::Logical(logical) => {
                if a.kind() == b.kind() && self.conversion_by_kind(a.kind(), logical).is_some() {
                    if equals_only {
                        return Ok(if a == b { Ordering::Equal } else { Ordering::Greater });
                    }
                    if let Some(ordering) = natural_order(a, b) {
                        return Ok(ordering);
                    }
                }
                self.compare_with(a, b, &logical.base, equals_only)
            }
            AvroSchema::Named(name) => {
                let resolved = self.resolve_named(name, a)?;
                self.compare_with(a, b, &resolved, equals_only)
            }
            AvroSchema::Record(record_schema) => match (a, b) {
                (Value::Record(x), Value::Record(y)) => self.compare_records(x, y, record_schema, equals_only),
                (Value::Record(_), other) | (other, _) => Err(not_a_record(record_schema, other)),
            },
            AvroSchema::Enum(enum_schema) => {
                let x = enum_ordinal(enum_schema, a)?;
                let y = enum_ordinal(enum_schema, b)?;
                Ok(x.cmp(&y))
            }
            AvroSchema::Array(items) => match (a, b) {
                (Value::Array(x), Value::Array(y)) => {
                    for (left, right) in x.iter().zip(y.iter()) {
                        let ordering = self.compare_with(left, right, items, equals_only)?;
                        if ordering != Ordering::Equal {
                            return Ok(ordering);
                        }
                    }
                    Ok(x.len().cmp(&y.len()))
                }
                _ => Err(mismatch_pair("array", a, b)),
            },
            AvroSchema::Map(values) => {
                if !equals_only {
                    return Err(GenericError::UnsupportedOperation("Can't compare maps!".to_string()));
                }
                match (a, b) {
                    (Value::Map(x), Value::Map(y)) => self.maps_equal(x, y, values),
                    _ => Err(mismatch_pair("map", a, b)),
                }
            }
            AvroSchema::Union(variants) => {
                let i = self.resolve_union_members(variants, a)?;
                let j = self.resolve_union_members(variants, b)?;
                if i == j {
                    self.compare_with(a, b, &variants[i], equals_only)
                } else {
                    Ok(i.cmp(&j))
                }
            }
            AvroSchema::Null => match (a, b) {
                (Value::Null, Value::Null) => Ok(Ordering::Equal),
                _ => Err(mismatch_pair("null", a, b)),
            },
            AvroSchema::Boolean => match (a, b) {
                (Value::Boolean(x), Value::Boolean(y)) => Ok(x.cmp(y)),
                _ => Err(mismatch_pair("boolean", a, b)),
            },
            AvroSchema::Int => match (a, b) {
                (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
                _ => Err(mismatch_pair("int", a, b)),
            },
            AvroSchema::Long => match (a, b) {
                (Value::Long(x), Value::Long(y)) => Ok(x.cmp(y)),
                _ => Err(mismatch_pair("long", a, b)),
            },
            AvroSchema::Float => match (a, b) {
                (Value::Float(x), Value::Float(y)) => Ok(x.total_cmp(y)),
                _ => Err(mismatch_pair("float", a, b)),
            },
            AvroSchema::Double => match (a, b) {
                (Value::Double(x), Value::Double(y)) => Ok(x.total_cmp(y)),
                _ => Err(mismatch_pair("double", a, b)),
            },
            AvroSchema::String => match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => Ok(x.as_bytes().cmp(y.as_bytes())),
                _ => Err(mismatch_pair("string", a, b)),
            },
            AvroSchema::Bytes => match (a, b) {
                (Value::Bytes(x), Value::Bytes(y)) => Ok(x.cmp(y)),
                _ => Err(mismatch_pair("bytes", a, b)),
            },
            AvroSchema::Fixed(_) => match (a, b) {
                (Value::Fixed(x), Value::Fixed(y)) => Ok(x.bytes().cmp(y.bytes())),
                _ => Err(mismatch_pair("fixed", a, b)),
            },
        }
    }

    /// Compare two records field by field under `schema`.
    pub fn compare_records(
        &self,
        a: &Record,
        b: &Record,
        schema: &RecordSchema,
        equals_only: bool,
    ) -> Result<Ordering, GenericError> {
        for field in &schema.fields {
            if field.order == FieldOrder::Ignore {
                continue;
            }
            let x = field_value(a, schema, field.position)?;
            let y = field_value(b, schema, field.position)?;
            let ordering = self.compare_with(x, y, &field.schema, equals_only)?;
            if ordering != Ordering::Equal {
                return Ok(if field.order == FieldOrder::Descending {
                    ordering.reverse()
                } else {
                    ordering
                });
            }
        }
        Ok(Ordering::Equal)
    }

    fn maps_equal(
        &self,
        a: &HashMap<String, Value>,
        b: &HashMap<String, Value>,
        values: &AvroSchema,
    ) -> Result<Ordering, GenericError> {
        if a.len() != b.len() {
            return Ok(Ordering::Greater);
        }
        for (key, x) in a {
            let Some(y) = b.get(key) else {
                return Ok(Ordering::Greater);
            };
            if self.compare_with(x, y, values, true)? != Ordering::Equal {
                return Ok(Ordering::Greater);
            }
        }
        Ok(Ordering::Equal)
    }

    /// 32-bit hash of `value` under `schema`, consistent with
    /// [`GenericData::equals`].
    pub fn hash_code(&self, value: &Value, schema: &AvroSchema) -> Result<i32, GenericError> {
        if value.is_null() {
            return Ok(0);
        }
        match schema {
            AvroSchema::Logical(logical) => match self.conversion_by_kind(value.kind(), logical) {
                Some(conversion) => Ok(conversion.hash_code(value)),
                None => self.hash_code(value, &logical.base),
            },
            AvroSchema::Named(name) => {
                let resolved = self.resolve_named(name, value)?;
                self.hash_code(value, &resolved)
            }
            AvroSchema::Record(record_schema) => match value {
                Value::Record(record) => self.hash_fields(record, record_schema),
                other => Err(not_a_record(record_schema, other)),
            },
            AvroSchema::Enum(enum_schema) => Ok(enum_ordinal(enum_schema, value)? as i32),
            AvroSchema::Array(items) => match value {
                Value::Array(array) => array.iter().try_fold(1i32, |acc, element| {
                    Ok(combine(acc, self.hash_code(element, items)?))
                }),
                other => Err(GenericError::mismatch("array", other.kind().name())),
            },
            AvroSchema::Map(values) => match value {
                Value::Map(map) => map.iter().try_fold(0i32, |acc, (key, v)| {
                    Ok(acc.wrapping_add(hash_bytes(key.as_bytes()) ^ self.hash_code(v, values)?))
                }),
                other => Err(GenericError::mismatch("map", other.kind().name())),
            },
            AvroSchema::Union(variants) => {
                let index = self.resolve_union_members(variants, value)?;
                self.hash_code(value, &variants[index])
            }
            AvroSchema::Null => Ok(0),
            _ => match value {
                Value::Boolean(_)
                | Value::Int(_)
                | Value::Long(_)
                | Value::Float(_)
                | Value::Double(_)
                | Value::Bytes(_)
                | Value::String(_)
                | Value::Utf8(_)
                | Value::Fixed(_) => Ok(host_hash(value)),
                other => Err(GenericError::mismatch(schema.type_name(), other.kind().name())),
            },
        }
    }

    /// Hash of a record under its own schema.
    pub fn hash_record(&self, record: &Record) -> Result<i32, GenericError> {
        self.hash_fields(record, record.schema())
    }

    fn hash_fields(&self, record: &Record, schema: &RecordSchema) -> Result<i32, GenericError> {
        let mut hash = 1i32;
        for field in &schema.fields {
            if field.order == FieldOrder::Ignore {
                continue;
            }
            let value = field_value(record, schema, field.position)?;
            hash = combine(hash, self.hash_code(value, &field.schema)?);
        }
        Ok(hash)
    }
}

fn field_value<'a>(record: &'a Record, schema: &RecordSchema, position: usize) -> Result<&'a Value, GenericError> {
    record.get(position).ok_or_else(|| GenericError::FieldIndexOutOfRange {
        record: schema.fullname(),
        index: position,
        len: record.len(),
    })
}

/// Position of the value's symbol in `schema`, which need not be the schema
/// the symbol was built under.
fn enum_ordinal(schema: &Arc<EnumSchema>, value: &Value) -> Result<usize, GenericError> {
    let symbol = match value {
        Value::Enum(symbol) if Arc::ptr_eq(symbol.schema(), schema) => return Ok(symbol.ordinal()),
        Value::Enum(symbol) => symbol.symbol(),
        Value::String(_) | Value::Utf8(_) => value.as_str().unwrap_or_default(),
        other => return Err(GenericError::mismatch(schema.fullname(), other.kind().name())),
    };
    schema.ordinal(symbol).ok_or_else(|| GenericError::UnknownEnumSymbol {
        name: schema.fullname(),
        symbol: symbol.to_string(),
    })
}

/// Natural order of two host values of the same logical kind.
fn natural_order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Decimal(x), Value::Decimal(y)) => Some(x.cmp_numeric(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::TimestampMillis(x), Value::TimestampMillis(y))
        | (Value::TimestampMicros(x), Value::TimestampMicros(y)) => Some(x.cmp(y)),
        (Value::Uuid(x), Value::Uuid(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn not_a_record(schema: &RecordSchema, value: &Value) -> GenericError {
    GenericError::NotARecord(format!("{} value given for record {}", value.kind(), schema.fullname()))
}

fn mismatch_pair(expected: &str, a: &Value, b: &Value) -> GenericError {
    GenericError::mismatch(expected, format!("{} and {}", a.kind(), b.kind()))
}

fn combine(acc: i32, hash: i32) -> i32 {
    acc.wrapping_mul(31).wrapping_add(hash)
}

/// Byte hash: `31 * h + b` over signed bytes, starting at zero.
pub fn hash_bytes(bytes: &[u8]) -> i32 {
    bytes
        .iter()
        .fold(0i32, |hash, b| combine(hash, i32::from(*b as i8)))
}

pub fn hash_long(value: i64) -> i32 {
    (value ^ ((value as u64) >> 32) as i64) as i32
}

pub fn hash_float(value: f32) -> i32 {
    let bits = if value.is_nan() { f32::NAN.to_bits() } else { value.to_bits() };
    bits as i32
}

pub fn hash_double(value: f64) -> i32 {
    let bits = if value.is_nan() { f64::NAN.to_bits() } else { value.to_bits() };
    hash_long(bits as i64)
}

/// Hash of a decimal: the byte hash of its unscaled value, mixed with the
/// scale.
pub fn decimal_hash(value: &BigDecimal) -> i32 {
    combine(hash_bytes(&value.unscaled().to_signed_bytes_be()), value.scale())
}

/// Hash of a value without a schema.
///
/// Agrees with [`GenericData::hash_code`] for every value whose schema is
/// implied by the value itself, and is what conversions fall back to.
pub fn host_hash(value: &Value) -> i32 {
    match value {
        Value::Null => 0,
        Value::Boolean(b) => {
            if *b {
                1231
            } else {
                1237
            }
        }
        Value::Int(v) | Value::Date(v) => *v,
        Value::Long(v) | Value::TimestampMillis(v) | Value::TimestampMicros(v) => hash_long(*v),
        Value::Float(v) => hash_float(*v),
        Value::Double(v) => hash_double(*v),
        Value::Bytes(bytes) => hash_bytes(bytes),
        Value::String(text) => hash_bytes(text.as_bytes()),
        Value::Utf8(text) => hash_bytes(text.as_bytes()),
        Value::Fixed(fixed) => hash_bytes(fixed.bytes()),
        Value::Enum(symbol) => symbol.ordinal() as i32,
        Value::Record(record) => GenericData::shared().hash_record(record).unwrap_or(0),
        Value::Array(array) => array.iter().fold(1, |acc, v| combine(acc, host_hash(v))),
        Value::Map(map) => map
            .iter()
            .fold(0i32, |acc, (k, v)| acc.wrapping_add(hash_bytes(k.as_bytes()) ^ host_hash(v))),
        Value::Decimal(decimal) => decimal_hash(decimal),
        Value::Uuid(uuid) => uuid_hash(uuid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::{Array, EnumSymbol};
    use crate::schema::FieldSchema;
    use std::sync::Arc;

    #[test]
    fn test_byte_hash_matches_reference_values() {
        assert_eq!(hash_bytes(b""), 0);
        assert_eq!(hash_bytes(b"a"), 97);
        assert_eq!(hash_bytes(b"ab"), 97 * 31 + 98);
        assert_eq!(hash_bytes(&[0xFF]), -1);
    }

    #[test]
    fn test_scalar_hashes() {
        assert_eq!(hash_long(1), 1);
        assert_eq!(hash_long(-1), 0);
        assert_eq!(hash_long(1 << 32), 1);
        assert_eq!(hash_float(f32::NAN), hash_float(-f32::NAN));
        assert_eq!(host_hash(&Value::Boolean(true)), 1231);
        assert_eq!(host_hash(&Value::Null), 0);
    }

    #[test]
    fn test_enum_hash_is_ordinal() {
        let data = GenericData::new();
        let schema = Arc::new(EnumSchema::new("E", vec!["A".into(), "B".into()]));
        let b = Value::Enum(EnumSymbol::new(schema.clone(), "B").unwrap());
        assert_eq!(data.hash_code(&b, &AvroSchema::Enum(schema)).unwrap(), 1);
    }

    #[test]
    fn test_enum_ordinal_follows_call_schema() {
        let data = GenericData::new();
        let reversed = Arc::new(EnumSchema::new("E", vec!["C".into(), "B".into(), "A".into()]));
        let declared = AvroSchema::Enum(Arc::new(EnumSchema::new("E", vec!["A".into(), "B".into(), "C".into()])));
        let a = Value::Enum(EnumSymbol::new(reversed.clone(), "A").unwrap());
        let c = Value::Enum(EnumSymbol::new(reversed, "C").unwrap());

        assert_eq!(data.compare(&a, &c, &declared).unwrap(), Ordering::Less);
        assert_eq!(data.hash_code(&a, &declared).unwrap(), 0);
        assert_eq!(data.hash_code(&c, &declared).unwrap(), 2);
    }

    #[test]
    fn test_non_record_under_record_schema() {
        let data = GenericData::new();
        let schema = Arc::new(RecordSchema::new("R", vec![FieldSchema::new("a", AvroSchema::Int)]));
        let record = Value::Record(Record::from_values(schema.clone(), vec![1.into()]).unwrap());
        let record_schema = AvroSchema::Record(schema);
        assert!(matches!(
            data.compare(&record, &Value::Int(1), &record_schema),
            Err(GenericError::NotARecord(_))
        ));
        assert!(matches!(
            data.hash_code(&Value::Int(1), &record_schema),
            Err(GenericError::NotARecord(_))
        ));
    }

    #[test]
    fn test_record_order_respects_field_order() {
        let data = GenericData::new();
        let schema = Arc::new(RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("a", AvroSchema::Int),
                FieldSchema::new("b", AvroSchema::Int).with_order(FieldOrder::Ignore),
                FieldSchema::new("c", AvroSchema::Int).with_order(FieldOrder::Descending),
            ],
        ));
        let left = Record::from_values(schema.clone(), vec![1.into(), 99.into(), 5.into()]).unwrap();
        let right = Record::from_values(schema.clone(), vec![1.into(), (-1).into(), 7.into()]).unwrap();
        let record_schema = AvroSchema::Record(schema);
        assert_eq!(
            data.compare(&Value::Record(left.clone()), &Value::Record(right), &record_schema).unwrap(),
            Ordering::Greater
        );

        let ignored = Record::from_values(left.schema().clone(), vec![1.into(), 0.into(), 5.into()]).unwrap();
        let (x, y) = (Value::Record(left), Value::Record(ignored));
        assert!(data.equals(&x, &y, &record_schema).unwrap());
        assert_eq!(
            data.hash_code(&x, &record_schema).unwrap(),
            data.hash_code(&y, &record_schema).unwrap()
        );
    }

    #[test]
    fn test_maps_are_equality_only() {
        let data = GenericData::new();
        let schema = AvroSchema::Map(Box::new(AvroSchema::Int));
        let a = Value::Map(HashMap::from([("k".to_string(), Value::Int(1))]));
        let b = Value::Map(HashMap::from([("k".to_string(), Value::Int(1))]));
        assert!(data.equals(&a, &b, &schema).unwrap());
        assert!(matches!(
            data.compare(&a, &b, &schema),
            Err(GenericError::UnsupportedOperation(message)) if message == "Can't compare maps!"
        ));
    }

    #[test]
    fn test_arrays_compare_then_by_length() {
        let data = GenericData::new();
        let schema = AvroSchema::Array(Box::new(AvroSchema::Int));
        let short = Value::Array(Array::from(vec![Value::Int(3)]));
        let long = Value::Array(Array::from(vec![Value::Int(3), Value::Int(0)]));
        assert_eq!(data.compare(&short, &long, &schema).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_union_orders_by_member_index() {
        let data = GenericData::new();
        let schema = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Int]);
        assert_eq!(data.compare(&Value::Null, &Value::Int(-5), &schema).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_decimal_order_is_numeric() {
        use crate::schema::{LogicalType, LogicalTypeName};
        let data = GenericData::new();
        let schema = AvroSchema::Logical(LogicalType::new(
            AvroSchema::Bytes,
            LogicalTypeName::Decimal { precision: 10, scale: 2 },
        ));
        let a = Value::Decimal(BigDecimal::new(20, 1));
        let b = Value::Decimal(BigDecimal::new(200, 2));
        assert_eq!(data.compare(&a, &b, &schema).unwrap(), Ordering::Equal);
        assert!(!data.equals(&a, &b, &schema).unwrap());
    }
}
