//! Inferring a schema from a value.

use crate::error::GenericError;
use crate::generic::{GenericData, Value};
use crate::schema::{AvroSchema, LogicalType, LogicalTypeName};

impl GenericData {
    /// Build the schema `value` is an instance of.
    ///
    /// Named values answer with their own schema. Arrays and maps must be
    /// non-empty and uniformly typed.
    pub fn induce(&self, value: &Value) -> Result<AvroSchema, GenericError> {
        let schema = match value {
            Value::Null => AvroSchema::Null,
            Value::Boolean(_) => AvroSchema::Boolean,
            Value::Int(_) => AvroSchema::Int,
            Value::Long(_) => AvroSchema::Long,
            Value::Float(_) => AvroSchema::Float,
            Value::Double(_) => AvroSchema::Double,
            Value::Bytes(_) => AvroSchema::Bytes,
            Value::String(_) | Value::Utf8(_) => AvroSchema::String,
            Value::Record(record) => AvroSchema::Record(record.schema().clone()),
            Value::Enum(symbol) => AvroSchema::Enum(symbol.schema().clone()),
            Value::Fixed(fixed) => AvroSchema::Fixed(fixed.schema().clone()),
            Value::Array(array) => {
                let items = self.induce_uniform(array.iter(), "No mixed type arrays.")?;
                match items {
                    Some(items) => AvroSchema::Array(Box::new(items)),
                    None => return Err(GenericError::InducedSchema(format!("Empty array: {}", self.to_string(value)))),
                }
            }
            Value::Map(map) => {
                let values = self.induce_uniform(map.values(), "No mixed type map values.")?;
                match values {
                    Some(values) => AvroSchema::Map(Box::new(values)),
                    None => return Err(GenericError::InducedSchema(format!("Empty map: {}", self.to_string(value)))),
                }
            }
            Value::Decimal(decimal) => {
                let scale = u32::try_from(decimal.scale()).map_err(|_| {
                    GenericError::InducedSchema(format!("Can't create schema for: {}", decimal))
                })?;
                let precision = decimal.precision().max(scale).max(1);
                logical(AvroSchema::Bytes, LogicalTypeName::Decimal { precision, scale })
            }
            Value::Date(_) => logical(AvroSchema::Int, LogicalTypeName::Date),
            Value::TimestampMillis(_) => logical(AvroSchema::Long, LogicalTypeName::TimestampMillis),
            Value::TimestampMicros(_) => logical(AvroSchema::Long, LogicalTypeName::TimestampMicros),
            Value::Uuid(_) => logical(AvroSchema::String, LogicalTypeName::Uuid),
        };
        Ok(schema)
    }

    fn induce_uniform<'a, I>(&self, values: I, mixed: &str) -> Result<Option<AvroSchema>, GenericError>
    where
        I: Iterator<Item = &'a Value>,
    {
        let mut induced: Option<AvroSchema> = None;
        for value in values {
            let schema = self.induce(value)?;
            match &induced {
                None => induced = Some(schema),
                Some(existing) if *existing == schema => {}
                Some(_) => return Err(GenericError::InducedSchema(mixed.to_string())),
            }
        }
        Ok(induced)
    }
}

fn logical(base: AvroSchema, name: LogicalTypeName) -> AvroSchema {
    AvroSchema::Logical(LogicalType::new(base, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::Array;
    use crate::logical::BigDecimal;
    use std::collections::HashMap;

    #[test]
    fn test_induce_containers() {
        let data = GenericData::new();
        let array = Value::Array(Array::from(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(data.induce(&array).unwrap(), AvroSchema::Array(Box::new(AvroSchema::Int)));

        let map = Value::Map(HashMap::from([("a".to_string(), Value::from("x"))]));
        assert_eq!(data.induce(&map).unwrap(), AvroSchema::Map(Box::new(AvroSchema::String)));
    }

    #[test]
    fn test_induce_rejects_mixed_and_empty() {
        let data = GenericData::new();
        let mixed = Value::Array(Array::from(vec![Value::Int(1), Value::Long(2)]));
        assert!(matches!(
            data.induce(&mixed),
            Err(GenericError::InducedSchema(message)) if message == "No mixed type arrays."
        ));
        let empty = Value::Map(HashMap::new());
        assert!(matches!(
            data.induce(&empty),
            Err(GenericError::InducedSchema(message)) if message.starts_with("Empty map")
        ));
    }

    #[test]
    fn test_induce_decimal() {
        let data = GenericData::new();
        let schema = data.induce(&Value::Decimal(BigDecimal::new(12345, 2))).unwrap();
        assert_eq!(schema.to_json_value()["precision"], 5);
        assert_eq!(schema.to_json_value()["scale"], 2);
    }
}
