//! Generic records.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::GenericError;
use crate::generic::{GenericData, Value};
use crate::schema::{FieldSchema, RecordSchema};

/// A record: a schema plus one value slot per field, in field order.
///
/// Equality, hashing, ordering and `Display` all go through the shared
/// [`GenericData`] engine under the record's own schema.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Box<[Value]>,
}

impl Record {
    /// New record with every field set to null.
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = vec![Value::Null; schema.fields.len()].into_boxed_slice();
        Self { schema, values }
    }

    /// Record from values given in field order.
    pub fn from_values(schema: Arc<RecordSchema>, values: Vec<Value>) -> Result<Self, GenericError> {
        if values.len() != schema.fields.len() {
            return Err(GenericError::mismatch(
                format!("{} field values for {}", schema.fields.len(), schema.fullname()),
                values.len().to_string(),
            ));
        }
        Ok(Self {
            schema,
            values: values.into_boxed_slice(),
        })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Value> {
        self.values.get_mut(position)
    }

    /// Value of the field called `name`.
    pub fn get_by_name(&self, name: &str) -> Result<&Value, GenericError> {
        let position = self.position_of(name)?;
        Ok(&self.values[position])
    }

    /// Set the field at `position`.
    pub fn put(&mut self, position: usize, value: impl Into<Value>) -> Result<(), GenericError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(position)
            .ok_or_else(|| GenericError::FieldIndexOutOfRange {
                record: self.schema.fullname(),
                index: position,
                len,
            })?;
        *slot = value.into();
        Ok(())
    }

    /// Set the field called `name`.
    pub fn put_by_name(&mut self, name: &str, value: impl Into<Value>) -> Result<(), GenericError> {
        let position = self.position_of(name)?;
        self.values[position] = value.into();
        Ok(())
    }

    /// Move the value out of a slot, leaving null behind.
    pub(crate) fn take(&mut self, position: usize) -> Value {
        self.values.get_mut(position).map(std::mem::take).unwrap_or_default()
    }

    /// Field values in field order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Fields paired with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldSchema, &Value)> {
        self.schema.fields.iter().zip(self.values.iter())
    }

    fn position_of(&self, name: &str) -> Result<usize, GenericError> {
        self.schema
            .field(name)
            .map(|field| field.position)
            .filter(|position| *position < self.values.len())
            .ok_or_else(|| GenericError::FieldNotFound {
                record: self.schema.fullname(),
                field: name.to_string(),
            })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        if !Arc::ptr_eq(&self.schema, &other.schema) && self.schema != other.schema {
            return false;
        }
        GenericData::shared()
            .compare_records(self, other, &self.schema, true)
            .map_or(false, |ordering| ordering == Ordering::Equal)
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        GenericData::shared()
            .compare_records(self, other, &self.schema, false)
            .ok()
    }
}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(GenericData::shared().hash_record(self).unwrap_or(0));
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&GenericData::shared().record_to_string(self))
    }
}
