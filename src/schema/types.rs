//! Schema tree.
//!
//! Records, enums and fixed types sit behind an `Arc`: every value built
//! against a named type holds a handle to it, and one parsed schema is
//! shared by all threads reading or writing through it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

/// A schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(Arc<RecordSchema>),
    Enum(Arc<EnumSchema>),
    Array(Box<AvroSchema>),
    Map(Box<AvroSchema>),
    /// Members in declaration order; a branch is addressed by its index.
    Union(Vec<AvroSchema>),
    Fixed(Arc<FixedSchema>),
    /// Full name of a named type declared elsewhere in the same tree.
    Named(String),
    /// A base schema annotated with `logicalType`.
    Logical(LogicalType),
}

/// `namespace.name`, or just `name` outside any namespace.
fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}.{name}"),
        _ => name.to_string(),
    }
}

/// Header shared by the three named kinds.
fn named_json(
    kind: &str,
    name: &str,
    namespace: Option<&str>,
    doc: Option<&str>,
    aliases: &[String],
) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("type".into(), json!(kind));
    obj.insert("name".into(), json!(name));
    if let Some(ns) = namespace {
        obj.insert("namespace".into(), json!(ns));
    }
    if let Some(doc) = doc {
        obj.insert("doc".into(), json!(doc));
    }
    if !aliases.is_empty() {
        obj.insert("aliases".into(), json!(aliases));
    }
    obj
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub namespace: Option<String>,
    /// Declaration order; `fields[i].position == i`.
    pub fields: Vec<FieldSchema>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
}

impl RecordSchema {
    /// Builds a record, numbering the fields in the order given.
    pub fn new(name: impl Into<String>, mut fields: Vec<FieldSchema>) -> Self {
        for (position, field) in fields.iter_mut().enumerate() {
            field.position = position;
        }
        Self {
            name: name.into(),
            namespace: None,
            fields,
            doc: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn fullname(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn to_json_value(&self) -> Value {
        let mut obj = named_json(
            "record",
            &self.name,
            self.namespace.as_deref(),
            self.doc.as_deref(),
            &self.aliases,
        );
        obj.insert(
            "fields".into(),
            self.fields.iter().map(FieldSchema::to_json_value).collect(),
        );
        Value::Object(obj)
    }
}

/// One record field.
///
/// `default` is kept as the JSON written in the schema; it is turned into
/// a value only when a record is materialized with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub position: usize,
    pub schema: AvroSchema,
    pub default: Option<Value>,
    pub doc: Option<String>,
    pub order: FieldOrder,
    pub aliases: Vec<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, schema: AvroSchema) -> Self {
        Self {
            name: name.into(),
            position: 0,
            schema,
            default: None,
            doc: None,
            order: FieldOrder::default(),
            aliases: Vec::new(),
        }
    }

    pub fn with_default(self, default: Value) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        Self {
            doc: Some(doc.into()),
            ..self
        }
    }

    pub fn with_order(self, order: FieldOrder) -> Self {
        Self { order, ..self }
    }

    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("name".into(), json!(self.name));
        obj.insert("type".into(), self.schema.to_json_value());
        if let Some(default) = &self.default {
            obj.insert("default".into(), default.clone());
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".into(), json!(doc));
        }
        if self.order != FieldOrder::Ascending {
            obj.insert("order".into(), json!(self.order.as_str()));
        }
        if !self.aliases.is_empty() {
            obj.insert("aliases".into(), json!(self.aliases));
        }
        Value::Object(obj)
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} type:{} pos:{}", self.name, self.schema.type_name(), self.position)
    }
}

/// How a field takes part in record ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Ascending,
    /// Inverts the field's comparison result.
    Descending,
    /// Skipped by ordering, equality and hashing.
    Ignore,
}

impl FieldOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::Ignore => "ignore",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: String,
    pub namespace: Option<String>,
    pub symbols: Vec<String>,
    /// Alias spelling to the declared symbol it stands for.
    pub symbol_aliases: HashMap<String, String>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    pub default: Option<String>,
}

impl EnumSchema {
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            symbols,
            symbol_aliases: HashMap::new(),
            doc: None,
            aliases: Vec::new(),
            default: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Accept `alias` wherever `symbol` is expected.
    pub fn with_symbol_alias(mut self, symbol: impl Into<String>, alias: impl Into<String>) -> Self {
        self.symbol_aliases.insert(alias.into(), symbol.into());
        self
    }

    pub fn fullname(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }

    /// Position of a declared symbol. Aliases are not consulted.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|declared| declared == symbol)
    }

    /// The declared symbol `symbol` names, directly or through an alias.
    pub fn resolve_symbol<'a>(&'a self, symbol: &'a str) -> Option<&'a str> {
        match self.symbol_index(symbol) {
            Some(_) => Some(symbol),
            None => self.symbol_aliases.get(symbol).map(String::as_str),
        }
    }

    pub fn ordinal(&self, symbol: &str) -> Option<usize> {
        let declared = self.resolve_symbol(symbol)?;
        self.symbol_index(declared)
    }

    pub fn has_symbol_or_alias(&self, symbol: &str) -> bool {
        self.ordinal(symbol).is_some()
    }

    pub fn to_json_value(&self) -> Value {
        let mut obj = named_json(
            "enum",
            &self.name,
            self.namespace.as_deref(),
            self.doc.as_deref(),
            &self.aliases,
        );
        obj.insert("symbols".into(), json!(self.symbols));

        if !self.symbol_aliases.is_empty() {
            // Grouped per symbol, each alias list sorted, for stable output.
            let mut by_symbol: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
            for (alias, target) in &self.symbol_aliases {
                if let Some(index) = self.symbol_index(target) {
                    by_symbol.entry(index).or_default().push(alias.as_str());
                }
            }
            let grouped: Map<String, Value> = by_symbol
                .into_iter()
                .map(|(index, mut aliases)| {
                    aliases.sort_unstable();
                    (self.symbols[index].clone(), json!(aliases))
                })
                .collect();
            obj.insert("symbolAliases".into(), Value::Object(grouped));
        }

        if let Some(default) = &self.default {
            obj.insert("default".into(), json!(default));
        }
        Value::Object(obj)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: String,
    pub namespace: Option<String>,
    /// Exact byte length of every value.
    pub size: usize,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
}

impl FixedSchema {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            size,
            doc: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn fullname(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }

    pub fn to_json_value(&self) -> Value {
        let mut obj = named_json(
            "fixed",
            &self.name,
            self.namespace.as_deref(),
            self.doc.as_deref(),
            &self.aliases,
        );
        obj.insert("size".into(), json!(self.size));
        Value::Object(obj)
    }
}

/// A `logicalType` annotation over a base schema.
///
/// Attributes other than the structural keys are kept in `properties`
/// (`serRounding` and `deserRounding` for decimals), so a conversion can
/// read its own settings from the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalType {
    pub base: Box<AvroSchema>,
    pub logical_type: LogicalTypeName,
    pub properties: Map<String, Value>,
}

impl LogicalType {
    pub fn new(base: AvroSchema, logical_type: LogicalTypeName) -> Self {
        Self {
            base: Box::new(base),
            logical_type,
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        self.logical_type.name()
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key)?.as_str()
    }

    /// The base type's JSON with `logicalType`, decimal parameters and the
    /// kept attributes merged in.
    pub fn to_json_value(&self) -> Value {
        let mut obj = match self.base.to_json_value() {
            Value::Object(obj) => obj,
            primitive => Map::from_iter([("type".to_string(), primitive)]),
        };
        obj.insert("logicalType".into(), json!(self.name()));
        if let LogicalTypeName::Decimal { precision, scale } = self.logical_type {
            obj.insert("precision".into(), json!(precision));
            obj.insert("scale".into(), json!(scale));
        }
        obj.extend(self.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        Value::Object(obj)
    }
}

/// Known logical types, plus a catch-all for names a user conversion may
/// claim.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalTypeName {
    Decimal { precision: u32, scale: u32 },
    Uuid,
    /// Days since the Unix epoch.
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    /// fixed(12): months, days, milliseconds.
    Duration,
    LocalTimestampMillis,
    LocalTimestampMicros,
    Custom(String),
}

impl LogicalTypeName {
    pub fn name(&self) -> &str {
        match self {
            Self::Decimal { .. } => "decimal",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::TimeMillis => "time-millis",
            Self::TimeMicros => "time-micros",
            Self::TimestampMillis => "timestamp-millis",
            Self::TimestampMicros => "timestamp-micros",
            Self::Duration => "duration",
            Self::LocalTimestampMillis => "local-timestamp-millis",
            Self::LocalTimestampMicros => "local-timestamp-micros",
            Self::Custom(name) => name,
        }
    }
}

impl AvroSchema {
    /// Type tag of a primitive, `None` for anything else.
    fn primitive_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bytes => "bytes",
            Self::String => "string",
            _ => return None,
        })
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive_name().is_some()
    }

    /// Record, enum or fixed.
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Enum(_) | Self::Fixed(_))
    }

    /// Full name of a named type or of a reference to one.
    pub fn fullname(&self) -> Option<String> {
        match self {
            Self::Record(record) => Some(record.fullname()),
            Self::Enum(schema) => Some(schema.fullname()),
            Self::Fixed(fixed) => Some(fixed.fullname()),
            Self::Named(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// The name a union branch is looked up by. Named types answer with
    /// their full name; logical annotations defer to the base type.
    pub fn type_name(&self) -> String {
        if let Some(tag) = self.primitive_name() {
            return tag.to_string();
        }
        match self {
            Self::Array(_) => "array".to_string(),
            Self::Map(_) => "map".to_string(),
            Self::Union(_) => "union".to_string(),
            Self::Logical(logical) => logical.base.type_name(),
            named => named.fullname().unwrap_or_default(),
        }
    }

    pub fn logical(&self) -> Option<&LogicalType> {
        match self {
            Self::Logical(logical) => Some(logical),
            _ => None,
        }
    }

    /// True for a union with a null branch.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Union(members) if members.contains(&Self::Null))
    }

    /// Branch of a union whose [`type_name`](Self::type_name) is `name`.
    pub fn index_named(&self, name: &str) -> Option<usize> {
        let Self::Union(members) = self else {
            return None;
        };
        members.iter().position(|member| member.type_name() == name)
    }

    /// Compact JSON text of the schema.
    ///
    /// ```
    /// use avro_generic::schema::AvroSchema;
    ///
    /// let schema = AvroSchema::Array(Box::new(AvroSchema::String));
    /// assert_eq!(schema.to_json(), r#"{"type":"array","items":"string"}"#);
    /// ```
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    pub fn to_json_value(&self) -> Value {
        if let Some(tag) = self.primitive_name() {
            return json!(tag);
        }
        match self {
            Self::Record(record) => record.to_json_value(),
            Self::Enum(schema) => schema.to_json_value(),
            Self::Fixed(fixed) => fixed.to_json_value(),
            Self::Array(items) => json!({"type": "array", "items": items.to_json_value()}),
            Self::Map(values) => json!({"type": "map", "values": values.to_json_value()}),
            Self::Union(members) => members.iter().map(Self::to_json_value).collect(),
            Self::Named(name) => json!(name),
            Self::Logical(logical) => logical.to_json_value(),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for AvroSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}
