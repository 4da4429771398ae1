//! Schema-directed deep copies.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GenericError;
use crate::generic::{Array, EnumSymbol, Fixed, GenericData, Record, Value};
use crate::schema::AvroSchema;

impl GenericData {
    /// Copy `value` so that no mutable part is shared with the original.
    ///
    /// Records, fixed values and enum symbols are rebuilt under `schema`.
    /// Immutable values (`String`, logical host values) are shared.
    pub fn deep_copy(&self, schema: &AvroSchema, value: &Value) -> Result<Value, GenericError> {
        match value {
            Value::Null => return Ok(Value::Null),
            Value::String(_)
            | Value::Decimal(_)
            | Value::Date(_)
            | Value::TimestampMillis(_)
            | Value::TimestampMicros(_)
            | Value::Uuid(_) => return Ok(value.clone()),
            _ => {}
        }

        match (schema, value) {
            (AvroSchema::Logical(logical), _) => match self.conversion_by_kind(value.kind(), logical) {
                Some(conversion) => {
                    let raw = conversion.to_raw(value, logical)?;
                    let copied = self.deep_copy(&logical.base, &raw)?;
                    conversion.from_raw(copied, logical)
                }
                None => self.deep_copy(&logical.base, value),
            },
            (AvroSchema::Named(name), _) => {
                let resolved = self.resolve_named(name, value)?;
                self.deep_copy(&resolved, value)
            }
            (AvroSchema::Record(schema), Value::Record(record)) => {
                let mut copy = Record::new(Arc::clone(schema));
                for field in &schema.fields {
                    let original = record.get(field.position).ok_or_else(|| GenericError::FieldIndexOutOfRange {
                        record: schema.fullname(),
                        index: field.position,
                        len: record.len(),
                    })?;
                    copy.put(field.position, self.deep_copy(&field.schema, original)?)?;
                }
                Ok(Value::Record(copy))
            }
            (AvroSchema::Record(schema), other) => Err(GenericError::NotARecord(format!(
                "{} value given for record {}",
                other.kind(),
                schema.fullname()
            ))),
            (AvroSchema::Array(items), Value::Array(array)) => array
                .iter()
                .map(|element| self.deep_copy(items, element))
                .collect::<Result<Array<Value>, _>>()
                .map(Value::Array),
            (AvroSchema::Map(values), Value::Map(map)) => map
                .iter()
                .map(|(key, v)| Ok((key.clone(), self.deep_copy(values, v)?)))
                .collect::<Result<HashMap<String, Value>, GenericError>>()
                .map(Value::Map),
            (AvroSchema::Union(variants), _) => {
                let index = self.resolve_union_members(variants, value)?;
                self.deep_copy(&variants[index], value)
            }
            (AvroSchema::Fixed(schema), Value::Fixed(fixed)) => {
                Fixed::from_bytes(Arc::clone(schema), fixed.bytes()).map(Value::Fixed)
            }
            (AvroSchema::Enum(schema), Value::Enum(symbol)) => {
                EnumSymbol::new(Arc::clone(schema), symbol.symbol()).map(Value::Enum)
            }
            (AvroSchema::String, Value::Utf8(_))
            | (AvroSchema::Bytes, Value::Bytes(_))
            | (AvroSchema::Int, Value::Int(_))
            | (AvroSchema::Long, Value::Long(_))
            | (AvroSchema::Float, Value::Float(_))
            | (AvroSchema::Double, Value::Double(_))
            | (AvroSchema::Boolean, Value::Boolean(_)) => Ok(value.clone()),
            _ => Err(GenericError::DeepCopy {
                schema: schema.to_json(),
                value: self.to_string(value),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, RecordSchema};

    #[test]
    fn test_copy_is_isolated() {
        let data = GenericData::new();
        let schema = Arc::new(RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("items", AvroSchema::Array(Box::new(AvroSchema::Bytes))),
                FieldSchema::new("attrs", AvroSchema::Map(Box::new(AvroSchema::Long))),
            ],
        ));
        let original = Value::Record(
            Record::from_values(
                schema.clone(),
                vec![
                    Value::Array(Array::from(vec![Value::Bytes(vec![1, 2])])),
                    Value::Map(HashMap::from([("k".to_string(), Value::Long(1))])),
                ],
            )
            .unwrap(),
        );
        let record_schema = AvroSchema::Record(schema);
        let mut copy = data.deep_copy(&record_schema, &original).unwrap();
        assert!(data.equals(&original, &copy, &record_schema).unwrap());

        if let Some(Value::Array(items)) = copy.as_record_mut().and_then(|r| r.get_mut(0)) {
            items.push(Value::Bytes(vec![3]));
        }
        assert!(!data.equals(&original, &copy, &record_schema).unwrap());
        assert_eq!(original.as_record().unwrap().get(0).unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_copy_through_union_and_null() {
        let data = GenericData::new();
        let schema = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::String]);
        assert_eq!(data.deep_copy(&schema, &Value::Null).unwrap(), Value::Null);
        assert_eq!(data.deep_copy(&schema, &Value::from("x")).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_mismatched_value_fails() {
        let data = GenericData::new();
        assert!(matches!(
            data.deep_copy(&AvroSchema::Int, &Value::Bytes(vec![])),
            Err(GenericError::DeepCopy { .. })
        ));

        let record = AvroSchema::Record(Arc::new(RecordSchema::new(
            "R",
            vec![FieldSchema::new("a", AvroSchema::Int)],
        )));
        assert!(matches!(
            data.deep_copy(&record, &Value::Int(3)),
            Err(GenericError::NotARecord(_))
        ));
    }
}
