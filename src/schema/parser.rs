//! Schema JSON to [`AvroSchema`].
//!
//! Logical type attributes are checked while parsing: once a decimal
//! schema parses, its precision, scale and rounding attributes are usable
//! by the conversions as they are.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SchemaError;
use crate::logical::RoundingMode;
use crate::schema::{
    AvroSchema, EnumSchema, FieldOrder, FieldSchema, FixedSchema, LogicalType, LogicalTypeName,
    RecordSchema,
};

/// Precision used when a decimal declares none.
pub const DEFAULT_DECIMAL_PRECISION: u32 = 36;

type JsonObject = Map<String, Value>;

/// Keys that describe the annotated type rather than the annotation.
const STRUCTURAL_KEYS: [&str; 7] = ["type", "logicalType", "name", "namespace", "size", "doc", "aliases"];

/// Parse a schema in permissive mode.
///
/// ```
/// use avro_generic::schema::{parse_schema, AvroSchema};
///
/// let schema = parse_schema(r#"{"type": "array", "items": "long"}"#).unwrap();
/// assert_eq!(schema, AvroSchema::Array(Box::new(AvroSchema::Long)));
/// ```
pub fn parse_schema(json: &str) -> Result<AvroSchema, SchemaError> {
    parse_schema_with_options(json, false)
}

/// Parse a schema, choosing how naming and union rule violations are
/// handled.
///
/// Strict mode fails on duplicate union branches, unions nested in
/// unions, and names outside `[A-Za-z_][A-Za-z0-9_]*`. Permissive mode
/// logs a warning for each and carries on. Logical type attributes are
/// validated either way.
///
/// ```
/// use avro_generic::schema::parse_schema_with_options;
///
/// assert!(parse_schema_with_options(r#"["int", "int"]"#, false).is_ok());
/// assert!(parse_schema_with_options(r#"["int", "int"]"#, true).is_err());
/// ```
pub fn parse_schema_with_options(json: &str, strict: bool) -> Result<AvroSchema, SchemaError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {e}")))?;
    SchemaParser::new().with_strict(strict).parse(&value)
}

/// Parses schema JSON, remembering every named type it meets so later
/// references to it resolve.
#[derive(Debug, Default)]
pub struct SchemaParser {
    named_types: HashMap<String, AvroSchema>,
    /// Namespace of the innermost enclosing named type.
    namespace: Option<String>,
    strict: bool,
}

/// Name, namespace and documentation of a record, enum or fixed.
struct NamedHeader {
    name: String,
    namespace: Option<String>,
    doc: Option<String>,
    aliases: Vec<String>,
}

impl NamedHeader {
    fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that fails on naming and union rule violations.
    pub fn new_strict() -> Self {
        Self::new().with_strict(true)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn parse(&mut self, value: &Value) -> Result<AvroSchema, SchemaError> {
        match value {
            Value::String(name) => Ok(self.type_reference(name)),
            Value::Array(members) => self.parse_union(members),
            Value::Object(obj) => self.parse_object(obj),
            other => Err(SchemaError::InvalidSchema(format!(
                "A schema is a string, an object or an array, not {other}"
            ))),
        }
    }

    /// A named type seen so far, by full name.
    pub fn get_named_type(&self, fullname: &str) -> Option<&AvroSchema> {
        self.named_types.get(fullname)
    }

    pub fn named_types(&self) -> &HashMap<String, AvroSchema> {
        &self.named_types
    }

    /// Fails in strict mode, warns otherwise.
    fn report(&self, message: String) -> Result<(), SchemaError> {
        if self.strict {
            return Err(SchemaError::InvalidSchema(message));
        }
        warn!("{}", message);
        Ok(())
    }

    /// A primitive, or a reference to a named type. References are kept by
    /// full name and need not be defined yet, which is how a record refers
    /// to itself.
    fn type_reference(&self, name: &str) -> AvroSchema {
        primitive(name).unwrap_or_else(|| AvroSchema::Named(self.qualify(name)))
    }

    fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) if !name.contains('.') => format!("{ns}.{name}"),
            _ => name.to_string(),
        }
    }

    fn parse_object(&mut self, obj: &JsonObject) -> Result<AvroSchema, SchemaError> {
        if obj.contains_key("logicalType") {
            return self.parse_logical(obj);
        }

        let kind = match obj.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(nested @ (Value::Object(_) | Value::Array(_))) => return self.parse(nested),
            Some(other) => {
                return Err(SchemaError::InvalidSchema(format!(
                    "'type' must be a string, object or array, found: {other}"
                )))
            }
            None => return Err(SchemaError::InvalidSchema("Missing 'type' field".to_string())),
        };

        if let Some(schema) = primitive(kind) {
            return Ok(schema);
        }
        match kind {
            "record" | "error" => self.parse_record(obj),
            "enum" => self.parse_enum(obj),
            "fixed" => self.parse_fixed(obj),
            "array" => Ok(AvroSchema::Array(Box::new(self.parse(required(obj, "items", "array")?)?))),
            "map" => Ok(AvroSchema::Map(Box::new(self.parse(required(obj, "values", "map")?)?))),
            other => {
                let fullname = self.qualify(other);
                if self.named_types.contains_key(&fullname) {
                    Ok(AvroSchema::Named(fullname))
                } else {
                    Err(SchemaError::UnsupportedType(format!("Unknown type: {other}")))
                }
            }
        }
    }

    fn parse_union(&mut self, members: &[Value]) -> Result<AvroSchema, SchemaError> {
        if members.is_empty() {
            return Err(SchemaError::InvalidSchema("Union schema cannot be empty".to_string()));
        }
        let members = members
            .iter()
            .map(|member| self.parse(member))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for (position, member) in members.iter().enumerate() {
            if matches!(member, AvroSchema::Union(_)) {
                self.report(format!("Union branch {position} is itself a union"))?;
            }
            let key = union_key(member);
            if !seen.insert(key.clone()) {
                self.report(format!("Union repeats '{key}' at branch {position}"))?;
            }
        }
        Ok(AvroSchema::Union(members))
    }

    /// Reads name, namespace, doc and aliases, and registers nothing.
    ///
    /// A dotted name carries its own namespace; otherwise an explicit
    /// `namespace` wins over the enclosing one.
    fn named_header(&self, obj: &JsonObject, kind: &str) -> Result<NamedHeader, SchemaError> {
        let declared = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidSchema(format!("{kind} missing 'name' field")))?;

        let (namespace, name) = match declared.rsplit_once('.') {
            Some((ns, short)) => (Some(ns.to_string()), short.to_string()),
            None => {
                let explicit = obj.get("namespace").and_then(Value::as_str);
                let namespace = match explicit {
                    Some("") => None,
                    Some(ns) => Some(ns.to_string()),
                    None => self.namespace.clone(),
                };
                (namespace, declared.to_string())
            }
        };
        self.check_name(&name, kind)?;

        Ok(NamedHeader {
            name,
            namespace,
            doc: obj.get("doc").and_then(Value::as_str).map(String::from),
            aliases: string_list(obj, "aliases"),
        })
    }

    fn parse_record(&mut self, obj: &JsonObject) -> Result<AvroSchema, SchemaError> {
        let header = self.named_header(obj, "Record")?;
        let fullname = header.fullname();
        let declared_fields = obj
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::InvalidSchema("Record missing 'fields' array".to_string()))?;

        // Fields see the record's namespace, and the record itself by name.
        self.named_types
            .insert(fullname.clone(), AvroSchema::Named(fullname.clone()));
        let outer = std::mem::replace(&mut self.namespace, header.namespace.clone());
        let fields = declared_fields
            .iter()
            .map(|field| self.parse_field(field))
            .collect::<Result<Vec<_>, _>>();
        self.namespace = outer;

        let mut record = RecordSchema::new(header.name, fields?);
        record.namespace = header.namespace;
        record.doc = header.doc;
        record.aliases = header.aliases;

        let schema = AvroSchema::Record(Arc::new(record));
        self.named_types.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_field(&mut self, value: &Value) -> Result<FieldSchema, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'name'".to_string()))?;
        self.check_name(name, "Field")?;

        let order = match obj.get("order").and_then(Value::as_str) {
            None | Some("ascending") => FieldOrder::Ascending,
            Some("descending") => FieldOrder::Descending,
            Some("ignore") => FieldOrder::Ignore,
            Some(other) => {
                return Err(SchemaError::InvalidSchema(format!(
                    "Field '{name}' has invalid order: {other}"
                )))
            }
        };

        let mut field = FieldSchema::new(name, self.parse(required(obj, "type", "Field")?)?).with_order(order);
        field.default = obj.get("default").cloned();
        field.doc = obj.get("doc").and_then(Value::as_str).map(String::from);
        field.aliases = string_list(obj, "aliases");
        Ok(field)
    }

    fn parse_enum(&mut self, obj: &JsonObject) -> Result<AvroSchema, SchemaError> {
        let header = self.named_header(obj, "Enum")?;
        let fullname = header.fullname();

        let symbols = obj
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::InvalidSchema("Enum missing 'symbols' array".to_string()))?
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect::<Vec<_>>();
        if symbols.is_empty() {
            return Err(SchemaError::InvalidSchema(format!("Enum {fullname} declares no symbols")));
        }
        for symbol in &symbols {
            self.check_name(symbol, "Enum symbol")?;
        }

        let symbol_aliases = symbol_aliases(obj, &symbols)?;
        let schema = AvroSchema::Enum(Arc::new(EnumSchema {
            name: header.name,
            namespace: header.namespace,
            symbols,
            symbol_aliases,
            doc: header.doc,
            aliases: header.aliases,
            default: obj.get("default").and_then(Value::as_str).map(String::from),
        }));
        self.named_types.insert(fullname, schema.clone());
        Ok(schema)
    }

    fn parse_fixed(&mut self, obj: &JsonObject) -> Result<AvroSchema, SchemaError> {
        let header = self.named_header(obj, "Fixed")?;
        let fullname = header.fullname();
        let size = obj
            .get("size")
            .and_then(Value::as_u64)
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| SchemaError::InvalidSchema(format!("Fixed {fullname} needs a non-negative 'size'")))?;

        let schema = AvroSchema::Fixed(Arc::new(FixedSchema {
            name: header.name,
            namespace: header.namespace,
            size,
            doc: header.doc,
            aliases: header.aliases,
        }));
        self.named_types.insert(fullname, schema.clone());
        Ok(schema)
    }

    /// An object carrying `logicalType`. Unknown names are kept as
    /// [`LogicalTypeName::Custom`] along with their attributes.
    fn parse_logical(&mut self, obj: &JsonObject) -> Result<AvroSchema, SchemaError> {
        let name = obj
            .get("logicalType")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidSchema("logicalType must be a string".to_string()))?;
        let base = match obj.get("type").and_then(Value::as_str) {
            Some("fixed") => self.parse_fixed(obj)?,
            Some(kind) => primitive(kind).ok_or_else(|| {
                SchemaError::InvalidSchema(format!("Invalid base type for logical type: {kind}"))
            })?,
            None => return Err(SchemaError::InvalidSchema("Logical type missing 'type' field".to_string())),
        };

        let logical_type = match name {
            "decimal" => decimal_parameters(obj, &base)?,
            "uuid" => LogicalTypeName::Uuid,
            "date" => LogicalTypeName::Date,
            "time-millis" => LogicalTypeName::TimeMillis,
            "time-micros" => LogicalTypeName::TimeMicros,
            "timestamp-millis" => LogicalTypeName::TimestampMillis,
            "timestamp-micros" => LogicalTypeName::TimestampMicros,
            "duration" => LogicalTypeName::Duration,
            "local-timestamp-millis" => LogicalTypeName::LocalTimestampMillis,
            "local-timestamp-micros" => LogicalTypeName::LocalTimestampMicros,
            other => LogicalTypeName::Custom(other.to_string()),
        };
        let decimal_keys: &[&str] = match logical_type {
            LogicalTypeName::Decimal { .. } => &["precision", "scale"],
            _ => &[],
        };

        let mut logical = LogicalType::new(base, logical_type);
        logical.properties = obj
            .iter()
            .filter(|(key, _)| {
                !STRUCTURAL_KEYS.contains(&key.as_str()) && !decimal_keys.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(AvroSchema::Logical(logical))
    }

    fn check_name(&self, name: &str, kind: &str) -> Result<(), SchemaError> {
        let mut chars = name.chars();
        let problem = match chars.next() {
            None => format!("{kind} name cannot be empty"),
            Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
                format!("{kind} name '{name}' must start with a letter or underscore")
            }
            Some(_) => match chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
                Some(bad) => format!("{kind} name '{name}' contains invalid character '{bad}'"),
                None => return Ok(()),
            },
        };
        self.report(problem)
    }
}

fn primitive(name: &str) -> Option<AvroSchema> {
    Some(match name {
        "null" => AvroSchema::Null,
        "boolean" => AvroSchema::Boolean,
        "int" => AvroSchema::Int,
        "long" => AvroSchema::Long,
        "float" => AvroSchema::Float,
        "double" => AvroSchema::Double,
        "bytes" => AvroSchema::Bytes,
        "string" => AvroSchema::String,
        _ => return None,
    })
}

fn required<'a>(obj: &'a JsonObject, key: &str, kind: &str) -> Result<&'a Value, SchemaError> {
    obj.get(key)
        .ok_or_else(|| SchemaError::InvalidSchema(format!("{kind} missing '{key}'")))
}

fn string_list(obj: &JsonObject, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

/// Two union branches collide when these keys match.
fn union_key(schema: &AvroSchema) -> String {
    match schema {
        AvroSchema::Record(_) | AvroSchema::Enum(_) | AvroSchema::Fixed(_) | AvroSchema::Named(_) => {
            format!("named:{}", schema.type_name())
        }
        AvroSchema::Logical(logical) => union_key(&logical.base),
        other => other.type_name(),
    }
}

/// `symbolAliases`: each declared symbol mapped to its alternative
/// spellings. Returned keyed by alias.
fn symbol_aliases(obj: &JsonObject, symbols: &[String]) -> Result<HashMap<String, String>, SchemaError> {
    let Some(value) = obj.get("symbolAliases") else {
        return Ok(HashMap::new());
    };
    let groups = value
        .as_object()
        .ok_or_else(|| SchemaError::InvalidSchema("symbolAliases must be an object".to_string()))?;

    let mut by_alias = HashMap::new();
    for (symbol, spellings) in groups {
        if !symbols.contains(symbol) {
            return Err(SchemaError::InvalidSchema(format!(
                "symbolAliases references unknown symbol '{symbol}'"
            )));
        }
        let spellings = spellings.as_array().ok_or_else(|| {
            SchemaError::InvalidSchema(format!("Aliases of '{symbol}' must be an array"))
        })?;
        for alias in spellings.iter().filter_map(Value::as_str) {
            if symbols.iter().any(|declared| declared == alias) {
                return Err(SchemaError::InvalidSchema(format!(
                    "Alias '{alias}' collides with a declared symbol"
                )));
            }
            by_alias.insert(alias.to_string(), symbol.clone());
        }
    }
    Ok(by_alias)
}

/// Precision and scale of a decimal, with the rounding attributes checked.
///
/// Precision defaults to 36 and scale to half the precision; the backing
/// type must be `bytes` or `string`.
fn decimal_parameters(obj: &JsonObject, base: &AvroSchema) -> Result<LogicalTypeName, SchemaError> {
    if !matches!(base, AvroSchema::Bytes | AvroSchema::String) {
        return Err(SchemaError::InvalidSchema(format!(
            "decimal must be backed by string or bytes, not {}",
            base.type_name()
        )));
    }

    let integer = |key: &str| -> Result<Option<i64>, SchemaError> {
        obj.get(key)
            .map(|v| {
                v.as_i64()
                    .ok_or_else(|| SchemaError::InvalidSchema(format!("Invalid decimal {key}: {v}")))
            })
            .transpose()
    };
    let precision = integer("precision")?.unwrap_or(i64::from(DEFAULT_DECIMAL_PRECISION));
    let precision = u32::try_from(precision)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| SchemaError::InvalidSchema(format!("Invalid decimal precision: {precision} (must be positive)")))?;
    let scale = integer("scale")?.unwrap_or(i64::from(precision / 2));
    if scale < 0 || scale > i64::from(precision) {
        return Err(SchemaError::InvalidSchema(format!(
            "Invalid decimal scale: {scale} (must be between 0 and precision {precision})"
        )));
    }

    for key in ["serRounding", "deserRounding"] {
        let Some(mode) = obj.get(key) else { continue };
        let mode = mode
            .as_str()
            .ok_or_else(|| SchemaError::InvalidSchema(format!("{key} must be a string")))?;
        if !mode.eq_ignore_ascii_case("none") && RoundingMode::from_str(mode).is_err() {
            return Err(SchemaError::InvalidSchema(format!("Unknown rounding mode for {key}: {mode}")));
        }
    }

    Ok(LogicalTypeName::Decimal {
        precision,
        scale: scale as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal_params(schema: &AvroSchema) -> (u32, u32) {
        match schema.logical().map(|l| &l.logical_type) {
            Some(LogicalTypeName::Decimal { precision, scale }) => (*precision, *scale),
            _ => panic!("not a decimal: {:?}", schema),
        }
    }

    #[test]
    fn test_decimal_defaults() {
        let schema = parse_schema(r#"{"type": "bytes", "logicalType": "decimal"}"#).unwrap();
        assert_eq!(decimal_params(&schema), (36, 18));

        let schema =
            parse_schema(r#"{"type": "string", "logicalType": "decimal", "precision": 9}"#).unwrap();
        assert_eq!(decimal_params(&schema), (9, 4));
    }

    #[test]
    fn test_decimal_keeps_rounding_attributes() {
        let schema = parse_schema(
            r#"{"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 2,
                "serRounding": "HALF_UP"}"#,
        )
        .unwrap();
        let logical = schema.logical().unwrap();
        assert_eq!(logical.property_str("serRounding"), Some("HALF_UP"));
        assert!(!logical.properties.contains_key("precision"));
    }

    #[test]
    fn test_decimal_rejects_bad_parameters() {
        for json in [
            r#"{"type": "int", "logicalType": "decimal", "precision": 4}"#,
            r#"{"type": "bytes", "logicalType": "decimal", "precision": 0}"#,
            r#"{"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 5}"#,
            r#"{"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": -1}"#,
            r#"{"type": "bytes", "logicalType": "decimal", "serRounding": "SIDEWAYS"}"#,
        ] {
            assert!(parse_schema(json).is_err(), "accepted {}", json);
        }
    }

    #[test]
    fn test_unknown_logical_type_is_kept() {
        let schema =
            parse_schema(r#"{"type": "string", "logicalType": "color", "palette": "rgb"}"#).unwrap();
        let logical = schema.logical().unwrap();
        assert_eq!(logical.name(), "color");
        assert_eq!(logical.property_str("palette"), Some("rgb"));
        assert_eq!(*logical.base, AvroSchema::String);
    }

    #[test]
    fn test_enum_symbol_aliases() {
        let schema = parse_schema(
            r#"{"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS"],
                "symbolAliases": {"HEARTS": ["H"]}}"#,
        )
        .unwrap();
        let AvroSchema::Enum(suit) = schema else {
            panic!("expected enum");
        };
        assert_eq!(suit.ordinal("H"), Some(1));
        assert_eq!(suit.resolve_symbol("H"), Some("HEARTS"));
    }

    #[test]
    fn test_field_positions_and_order() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": "int"},
                {"name": "b", "type": "int", "order": "descending"},
                {"name": "c", "type": "int", "order": "ignore"}
            ]}"#,
        )
        .unwrap();
        let AvroSchema::Record(record) = schema else {
            panic!("expected record");
        };
        let positions: Vec<usize> = record.fields.iter().map(|f| f.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(record.fields[1].order, FieldOrder::Descending);
        assert_eq!(record.fields[2].order, FieldOrder::Ignore);
    }

    #[test]
    fn test_recursive_record_reference() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "Node", "namespace": "list", "fields": [
                {"name": "next", "type": ["null", "Node"]}
            ]}"#,
        )
        .unwrap();
        let AvroSchema::Record(record) = schema else {
            panic!("expected record");
        };
        assert_eq!(
            record.fields[0].schema,
            AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Named("list.Node".into())])
        );
    }

    #[test]
    fn test_nested_types_inherit_namespace() {
        let mut parser = SchemaParser::new();
        let json: Value = serde_json::from_str(
            r#"{"type": "record", "name": "a.Outer", "fields": [
                {"name": "inner", "type": {"type": "fixed", "name": "Hash", "size": 4}},
                {"name": "other", "type": {"type": "enum", "name": "b.Kind", "symbols": ["X"]}}
            ]}"#,
        )
        .unwrap();
        parser.parse(&json).unwrap();
        assert!(parser.get_named_type("a.Outer").is_some());
        assert!(parser.get_named_type("a.Hash").is_some());
        assert!(parser.get_named_type("b.Kind").is_some());
    }

    #[test]
    fn test_strict_mode_rejects_duplicate_union_members() {
        assert!(parse_schema_with_options(r#"["int", "int"]"#, true).is_err());
        assert!(parse_schema_with_options(r#"["int", "int"]"#, false).is_ok());
        assert!(SchemaParser::new_strict()
            .parse(&serde_json::json!({"type": "fixed", "name": "9lives", "size": 1}))
            .is_err());
    }
}
