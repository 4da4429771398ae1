//! Materializing field defaults.
//!
//! Defaults are declared as JSON in the schema. They are decoded with the
//! same datum reader used for wire data, so a default of a record type
//! picks up the defaults of its own fields.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::GenericError;
use crate::generic::datum::read_datum;
use crate::generic::{GenericData, Record, Value};
use crate::io::JsonDecoder;
use crate::schema::{AvroSchema, FieldSchema, RecordSchema, SchemaResolutionContext};

/// Identifies a field default independently of where the field lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DefaultKey {
    field: String,
    position: usize,
    schema: String,
    default: String,
}

impl DefaultKey {
    fn of(field: &FieldSchema, default: &serde_json::Value) -> Self {
        Self {
            field: field.name.clone(),
            position: field.position,
            schema: field.schema.to_json(),
            default: default.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<DefaultKey, Value>,
    order: VecDeque<DefaultKey>,
}

/// Bounded cache of decoded defaults, oldest entry evicted first.
///
/// A capacity of zero disables caching.
#[derive(Debug)]
pub struct DefaultValueCache {
    capacity: usize,
    inner: RwLock<CacheInner>,
}

impl DefaultValueCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.order.clear();
    }

    fn get(&self, key: &DefaultKey) -> Option<Value> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(key)
            .cloned()
    }

    fn insert(&self, key: DefaultKey, value: Value) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have decoded the same default; keep the newest.
        if inner.entries.insert(key.clone(), value).is_some() {
            return;
        }
        inner.order.push_back(key);
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }
}

impl GenericData {
    /// The default value of `field`, decoded from its JSON declaration.
    ///
    /// Named types referenced by the field must be defined inside the
    /// field's own schema; use [`GenericData::default_value_with_context`]
    /// when they are defined elsewhere in the enclosing schema.
    pub fn default_value(&self, field: &FieldSchema) -> Result<Value, GenericError> {
        let context = SchemaResolutionContext::build_from_schema(&field.schema);
        self.default_value_with_context(field, &context)
    }

    pub fn default_value_with_context(
        &self,
        field: &FieldSchema,
        context: &SchemaResolutionContext,
    ) -> Result<Value, GenericError> {
        let default = field.default.as_ref().ok_or_else(|| GenericError::MissingDefault {
            field: field.name.clone(),
        })?;

        // For a union the default belongs to the first member.
        let schema = match &field.schema {
            AvroSchema::Union(variants) => variants.first().unwrap_or(&field.schema),
            other => other,
        };
        if default.is_null() && matches!(schema, AvroSchema::Null) {
            return Ok(Value::Null);
        }

        let key = DefaultKey::of(field, default);
        if let Some(cached) = self.defaults.get(&key) {
            return Ok(cached);
        }

        let mut decoder = JsonDecoder::new(default.clone());
        let value = read_datum(self, context, None, schema, &mut decoder)?;
        debug!(field = %field.name, "Materialized field default");
        self.defaults.insert(key, value.clone());
        Ok(value)
    }

    /// A record of `schema` with every defaulted field filled in.
    ///
    /// Fields without a default are left null.
    pub fn new_record_with_defaults(&self, schema: &Arc<RecordSchema>) -> Result<Record, GenericError> {
        let context = SchemaResolutionContext::build_from_schema(&AvroSchema::Record(Arc::clone(schema)));
        let mut record = Record::new(Arc::clone(schema));
        for field in &schema.fields {
            match self.default_value_with_context(field, &context) {
                Ok(value) => record.put(field.position, value)?,
                Err(GenericError::MissingDefault { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(record)
    }

    /// Drop every cached default.
    pub fn clear_default_cache(&self) {
        self.defaults.clear();
    }
}
