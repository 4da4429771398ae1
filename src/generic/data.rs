//! The engine: conversions, defaults and the schema-directed operations.

use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::config::GenericConfig;
use crate::error::GenericError;
use crate::generic::defaults::DefaultValueCache;
use crate::generic::{EnumSymbol, Fixed, Record, Value, ValueKind};
use crate::logical::{Conversion, ConversionRegistry};
use crate::schema::{AvroSchema, EnumSchema, FixedSchema, LogicalType, RecordSchema};

static SHARED: OnceLock<GenericData> = OnceLock::new();

/// Schema-directed operations over [`Value`]s.
///
/// An engine owns a conversion registry and a cache of materialized field
/// defaults. The operations themselves live across several modules:
/// ordering and hashing in `compare`, rendering in `render`, copying in
/// `copy`, schema induction in `induce`, and defaults in `defaults`.
///
/// Configure an engine before sharing it; every operation takes `&self`.
#[derive(Debug)]
pub struct GenericData {
    pub(crate) conversions: ConversionRegistry,
    pub(crate) defaults: DefaultValueCache,
    config: GenericConfig,
}

impl Default for GenericData {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericData {
    /// Engine with the built-in conversions and default settings.
    pub fn new() -> Self {
        Self::with_config(GenericConfig::default())
    }

    pub fn with_config(config: GenericConfig) -> Self {
        Self {
            conversions: ConversionRegistry::from_config(&config),
            defaults: DefaultValueCache::new(config.default_cache_capacity),
            config,
        }
    }

    /// Engine with the given conversions instead of the built-in ones.
    pub fn with_conversions(config: GenericConfig, conversions: ConversionRegistry) -> Self {
        Self {
            conversions,
            defaults: DefaultValueCache::new(config.default_cache_capacity),
            config,
        }
    }

    /// Process-wide engine, configured from the environment on first use.
    pub fn shared() -> &'static GenericData {
        SHARED.get_or_init(|| {
            let config = GenericConfig::from_env().unwrap_or_else(|e| {
                warn!("Ignoring invalid environment configuration: {}", e);
                GenericConfig::default()
            });
            debug!(?config, "Initialized shared engine");
            GenericData::with_config(config)
        })
    }

    pub fn config(&self) -> &GenericConfig {
        &self.config
    }

    pub fn conversions(&self) -> &ConversionRegistry {
        &self.conversions
    }

    pub fn conversions_mut(&mut self) -> &mut ConversionRegistry {
        &mut self.conversions
    }

    /// Register a conversion.
    pub fn add_conversion(&mut self, conversion: Arc<dyn Conversion>) -> Result<(), GenericError> {
        self.conversions.register(conversion)
    }

    /// Conversion for `logical` that handles values of `kind`.
    pub fn conversion_by_kind(&self, kind: ValueKind, logical: &LogicalType) -> Option<&Arc<dyn Conversion>> {
        self.conversions.get_by_kind(kind, logical)
    }

    /// Whether `value` conforms to `schema`.
    pub fn validate(&self, schema: &AvroSchema, value: &Value) -> bool {
        match (schema, value) {
            (AvroSchema::Logical(logical), _) => {
                match self.conversion_by_kind(value.kind(), logical) {
                    Some(conversion) => conversion
                        .to_raw(value, logical)
                        .is_ok_and(|raw| self.validate(&logical.base, &raw)),
                    None => self.validate(&logical.base, value),
                }
            }
            (AvroSchema::Named(name), _) => match own_schema(value) {
                Some(own) if own.type_name() == *name => self.validate(&own, value),
                _ => false,
            },
            (AvroSchema::Record(schema), Value::Record(record)) => schema.fields.iter().all(|field| {
                record
                    .get(field.position)
                    .is_some_and(|v| self.validate(&field.schema, v))
            }),
            (AvroSchema::Enum(schema), Value::Enum(symbol)) => schema.has_symbol_or_alias(symbol.symbol()),
            (AvroSchema::Enum(schema), Value::String(_) | Value::Utf8(_)) => {
                value.as_str().is_some_and(|s| schema.has_symbol_or_alias(s))
            }
            (AvroSchema::Array(items), Value::Array(array)) => array.iter().all(|v| self.validate(items, v)),
            (AvroSchema::Map(values), Value::Map(map)) => map.values().all(|v| self.validate(values, v)),
            (AvroSchema::Union(variants), _) => self
                .resolve_union_members(variants, value)
                .is_ok_and(|index| self.validate(&variants[index], value)),
            (AvroSchema::Fixed(schema), Value::Fixed(fixed)) => fixed.len() == schema.size,
            (AvroSchema::String, Value::String(_) | Value::Utf8(_))
            | (AvroSchema::Bytes, Value::Bytes(_))
            | (AvroSchema::Int, Value::Int(_))
            | (AvroSchema::Long, Value::Long(_))
            | (AvroSchema::Float, Value::Float(_))
            | (AvroSchema::Double, Value::Double(_))
            | (AvroSchema::Boolean, Value::Boolean(_))
            | (AvroSchema::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// Index of the member of `union` that `value` belongs to.
    ///
    /// Members are tried in this order: `null` for a null value, a logical
    /// member whose conversion produces values of the value's kind, then the
    /// member whose type name equals [`GenericData::schema_name`].
    pub fn resolve_union(&self, union: &AvroSchema, value: &Value) -> Result<usize, GenericError> {
        match union {
            AvroSchema::Union(variants) => self.resolve_union_members(variants, value),
            other => Err(GenericError::mismatch("union", other.type_name())),
        }
    }

    pub(crate) fn resolve_union_members(&self, variants: &[AvroSchema], value: &Value) -> Result<usize, GenericError> {
        if value.is_null() {
            if let Some(index) = variants.iter().position(|v| matches!(v, AvroSchema::Null)) {
                return Ok(index);
            }
        } else {
            let kind = value.kind();
            let logical = variants.iter().position(|member| {
                member
                    .logical()
                    .is_some_and(|logical| self.conversion_by_kind(kind, logical).is_some())
            });
            if let Some(index) = logical {
                return Ok(index);
            }
        }

        if let Ok(name) = self.schema_name(value) {
            if let Some(index) = variants.iter().position(|v| v.type_name() == name) {
                return Ok(index);
            }
        }

        let union = serde_json::Value::Array(variants.iter().map(AvroSchema::to_json_value).collect());
        Err(GenericError::UnresolvedUnion {
            union: union.to_string(),
            value: self.to_string(value),
        })
    }

    /// The name a union member must have to hold `value`.
    ///
    /// Named values answer with their schema's full name, everything else
    /// with its type tag. Logical host values have no name of their own.
    pub fn schema_name(&self, value: &Value) -> Result<String, GenericError> {
        let name = match value {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) | Value::Utf8(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(record) => return Ok(record.schema().fullname()),
            Value::Enum(symbol) => return Ok(symbol.schema().fullname()),
            Value::Fixed(fixed) => return Ok(fixed.schema().fullname()),
            Value::Decimal(_)
            | Value::Date(_)
            | Value::TimestampMillis(_)
            | Value::TimestampMicros(_)
            | Value::Uuid(_) => {
                return Err(GenericError::UnsupportedOperation(format!(
                    "Unknown datum type {}: {}",
                    value.kind(),
                    self.to_string(value)
                )))
            }
        };
        Ok(name.to_string())
    }

    /// Whether `value` is an instance of `schema`, looking only at its
    /// outer shape.
    pub fn instance_of(&self, schema: &AvroSchema, value: &Value) -> bool {
        match (schema, value) {
            (AvroSchema::Logical(logical), _) => {
                self.conversion_by_kind(value.kind(), logical).is_some() || self.instance_of(&logical.base, value)
            }
            (AvroSchema::Record(_) | AvroSchema::Enum(_) | AvroSchema::Fixed(_) | AvroSchema::Named(_), _) => {
                own_schema(value).is_some_and(|own| own.type_name() == schema.type_name())
            }
            (AvroSchema::Union(variants), _) => variants.iter().any(|v| self.instance_of(v, value)),
            (AvroSchema::Array(_), Value::Array(_))
            | (AvroSchema::Map(_), Value::Map(_))
            | (AvroSchema::String, Value::String(_) | Value::Utf8(_))
            | (AvroSchema::Bytes, Value::Bytes(_))
            | (AvroSchema::Int, Value::Int(_))
            | (AvroSchema::Long, Value::Long(_))
            | (AvroSchema::Float, Value::Float(_))
            | (AvroSchema::Double, Value::Double(_))
            | (AvroSchema::Boolean, Value::Boolean(_))
            | (AvroSchema::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// A record of `schema`, reusing `old` when it already has that schema.
    pub fn new_record(&self, old: Option<Value>, schema: &Arc<RecordSchema>) -> Record {
        match old {
            Some(Value::Record(record)) if same_schema(record.schema(), schema) => record,
            _ => Record::new(Arc::clone(schema)),
        }
    }

    /// A fixed value holding `bytes`, reusing `old` when it has the same
    /// schema.
    pub fn create_fixed(
        &self,
        old: Option<Value>,
        bytes: &[u8],
        schema: &Arc<FixedSchema>,
    ) -> Result<Fixed, GenericError> {
        match old {
            Some(Value::Fixed(mut fixed)) if same_schema(fixed.schema(), schema) => {
                fixed.copy_from(bytes)?;
                Ok(fixed)
            }
            _ => Fixed::from_bytes(Arc::clone(schema), bytes),
        }
    }

    /// The symbol `symbol` of `schema`.
    pub fn create_enum(&self, symbol: &str, schema: &Arc<EnumSchema>) -> Result<EnumSymbol, GenericError> {
        EnumSymbol::new(Arc::clone(schema), symbol)
    }

    /// Schema to use for a value found under a named reference: the value's
    /// own schema when its name matches.
    pub(crate) fn resolve_named(&self, name: &str, value: &Value) -> Result<AvroSchema, GenericError> {
        match own_schema(value) {
            Some(own) if own.type_name() == name => Ok(own),
            _ => Err(GenericError::mismatch(name, value.kind().name())),
        }
    }
}

fn same_schema<T: PartialEq>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}

/// The schema carried by a named value.
pub(crate) fn own_schema(value: &Value) -> Option<AvroSchema> {
    match value {
        Value::Record(record) => Some(AvroSchema::Record(Arc::clone(record.schema()))),
        Value::Enum(symbol) => Some(AvroSchema::Enum(Arc::clone(symbol.schema()))),
        Value::Fixed(fixed) => Some(AvroSchema::Fixed(Arc::clone(fixed.schema()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical::BigDecimal;
    use crate::schema::{FieldSchema, LogicalTypeName};

    fn decimal_member() -> AvroSchema {
        AvroSchema::Logical(LogicalType::new(
            AvroSchema::Bytes,
            LogicalTypeName::Decimal { precision: 10, scale: 2 },
        ))
    }

    #[test]
    fn test_union_resolution_order() {
        let data = GenericData::new();
        let union = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Bytes, decimal_member()]);
        assert_eq!(data.resolve_union(&union, &Value::Null).unwrap(), 0);
        assert_eq!(data.resolve_union(&union, &Value::Bytes(vec![1])).unwrap(), 1);
        assert_eq!(
            data.resolve_union(&union, &Value::Decimal(BigDecimal::new(1, 0))).unwrap(),
            2
        );
    }

    #[test]
    fn test_unresolved_union_message() {
        let data = GenericData::new();
        let union = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Int]);
        let err = data.resolve_union(&union, &Value::from("x")).unwrap_err();
        assert_eq!(err.to_string(), r#"Not in union ["null","int"]: "x""#);
    }

    #[test]
    fn test_logical_value_without_conversion_does_not_resolve() {
        let mut data = GenericData::new();
        data.conversions_mut().clear();
        let union = AvroSchema::Union(vec![AvroSchema::Null, decimal_member()]);
        assert!(matches!(
            data.resolve_union(&union, &Value::Decimal(BigDecimal::new(1, 0))),
            Err(GenericError::UnresolvedUnion { .. })
        ));
    }

    #[test]
    fn test_named_union_members() {
        let data = GenericData::new();
        let a = Arc::new(RecordSchema::new("A", vec![]).with_namespace("ns"));
        let b = Arc::new(RecordSchema::new("B", vec![]).with_namespace("ns"));
        let union = AvroSchema::Union(vec![AvroSchema::Record(a), AvroSchema::Record(b.clone())]);
        let value = Value::Record(Record::new(b));
        assert_eq!(data.schema_name(&value).unwrap(), "ns.B");
        assert_eq!(data.resolve_union(&union, &value).unwrap(), 1);
    }

    #[test]
    fn test_validate() {
        let data = GenericData::new();
        let schema = Arc::new(RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("id", AvroSchema::Long),
                FieldSchema::new("tag", AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::String])),
            ],
        ));
        let mut record = Record::new(schema.clone());
        record.put(0, 5i64).unwrap();
        assert!(data.validate(&AvroSchema::Record(schema.clone()), &Value::Record(record.clone())));

        record.put(0, 5i32).unwrap();
        assert!(!data.validate(&AvroSchema::Record(schema), &Value::Record(record)));

        assert!(data.validate(&decimal_member(), &Value::Decimal(BigDecimal::new(125, 2))));
        assert!(!data.validate(&decimal_member(), &Value::Decimal(BigDecimal::new(1255, 3))));
    }

    #[test]
    fn test_record_reuse() {
        let data = GenericData::new();
        let schema = Arc::new(RecordSchema::new("R", vec![FieldSchema::new("a", AvroSchema::Int)]));
        let mut old = Record::new(schema.clone());
        old.put(0, 7).unwrap();
        let reused = data.new_record(Some(Value::Record(old)), &schema);
        assert_eq!(reused.get(0), Some(&Value::Int(7)));
        let fresh = data.new_record(Some(Value::Int(1)), &schema);
        assert_eq!(fresh.get(0), Some(&Value::Null));
    }

    #[test]
    fn test_instance_of() {
        let data = GenericData::new();
        assert!(data.instance_of(&AvroSchema::String, &Value::from("x")));
        assert!(!data.instance_of(&AvroSchema::Long, &Value::Int(1)));
        assert!(data.instance_of(&decimal_member(), &Value::Decimal(BigDecimal::new(1, 0))));
        assert!(data.instance_of(&decimal_member(), &Value::Bytes(vec![])));
    }
}
