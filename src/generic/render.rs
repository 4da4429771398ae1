//! JSON-like rendering of values.
//!
//! Output is meant for logs and debugging: records and maps render as
//! objects, text is quoted and escaped, bytes render as `{"bytes": "..."}`.
//! Map keys are sorted so the output is deterministic.

use std::collections::HashMap;

use crate::generic::{GenericData, Record, Value};
use crate::logical::{format_date, format_timestamp_micros, format_timestamp_millis};

const CIRCULAR_REFERENCE: &str =
    " \">>> CIRCULAR REFERENCE CANNOT BE PUT IN JSON STRING, ABORTING RECURSION <<<\" ";

impl GenericData {
    /// Render `value` as JSON-like text.
    pub fn to_string(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut seen = Vec::new();
        render(value, &mut out, &mut seen);
        out
    }

    /// Render a record as JSON-like text.
    pub fn record_to_string(&self, record: &Record) -> String {
        let mut out = String::new();
        let mut seen = Vec::new();
        render_record(record, &mut out, &mut seen);
        out
    }
}

// Containers currently being rendered, by address.
type Seen = Vec<usize>;

fn enter<T>(container: &T, out: &mut String, seen: &mut Seen) -> bool {
    let address = container as *const T as usize;
    if seen.contains(&address) {
        out.push_str(CIRCULAR_REFERENCE);
        return false;
    }
    seen.push(address);
    true
}

fn render(value: &Value, out: &mut String, seen: &mut Seen) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(v) => out.push_str(&v.to_string()),
        Value::Long(v) => out.push_str(&v.to_string()),
        Value::Float(v) => push_float(out, f64::from(*v), v.to_string(), format!("{:e}", v)),
        Value::Double(v) => push_float(out, *v, v.to_string(), format!("{:e}", v)),
        Value::Bytes(bytes) => {
            out.push_str("{\"bytes\": \"");
            let latin1: String = bytes.iter().map(|b| char::from(*b)).collect();
            escape_into(&latin1, out);
            out.push_str("\"}");
        }
        Value::String(text) => quote(text, out),
        Value::Utf8(text) => quote(text.as_str(), out),
        Value::Enum(symbol) => quote(symbol.symbol(), out),
        Value::Fixed(fixed) => out.push_str(&fixed.to_string()),
        Value::Record(record) => render_record(record, out, seen),
        Value::Array(array) => {
            if !enter(array, out, seen) {
                return;
            }
            out.push('[');
            for (i, element) in array.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render(element, out, seen);
            }
            out.push(']');
            seen.pop();
        }
        Value::Map(map) => render_map(map, out, seen),
        Value::Decimal(decimal) => out.push_str(&decimal.to_string()),
        Value::Date(days) => quote_or_number(format_date(*days), i64::from(*days), out),
        Value::TimestampMillis(millis) => quote_or_number(format_timestamp_millis(*millis), *millis, out),
        Value::TimestampMicros(micros) => quote_or_number(format_timestamp_micros(*micros), *micros, out),
        Value::Uuid(uuid) => quote(&uuid.hyphenated().to_string(), out),
    }
}

fn render_record(record: &Record, out: &mut String, seen: &mut Seen) {
    if !enter(record, out, seen) {
        return;
    }
    out.push('{');
    for (i, (field, value)) in record.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        quote(&field.name, out);
        out.push_str(": ");
        render(value, out, seen);
    }
    out.push('}');
    seen.pop();
}

fn render_map(map: &HashMap<String, Value>, out: &mut String, seen: &mut Seen) {
    if !enter(map, out, seen) {
        return;
    }
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        quote(key, out);
        out.push_str(": ");
        render(value, out, seen);
    }
    out.push('}');
    seen.pop();
}

// Non-finite floats are quoted so the output stays valid JSON.
fn push_float(out: &mut String, value: f64, plain: String, scientific: String) {
    if value.is_nan() {
        quote("NaN", out);
    } else if value.is_infinite() {
        quote(if value > 0.0 { "Infinity" } else { "-Infinity" }, out);
    } else {
        out.push_str(&java_float_text(plain, scientific, value));
    }
}

fn quote_or_number(text: Option<String>, raw: i64, out: &mut String) {
    match text {
        Some(text) => quote(&text, out),
        None => out.push_str(&raw.to_string()),
    }
}

/// Float text in the conventional JVM form: plain notation with at least
/// one fraction digit between 1e-3 and 1e7, scientific with an upper-case
/// `E` outside it.
fn java_float_text(plain: String, scientific: String, value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&magnitude) {
        if plain.contains('.') {
            return plain;
        }
        return format!("{}.0", plain);
    }
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}

fn quote(text: &str, out: &mut String) {
    out.push('"');
    escape_into(text, out);
    out.push('"');
}

/// Escape quotes, backslashes, the short control escapes, and the C0, C1 and
/// U+2000..U+20FF ranges as `\uXXXX`.
fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{00}'..='\u{1F}' | '\u{7F}'..='\u{9F}' | '\u{2000}'..='\u{20FF}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::{Array, EnumSymbol, Fixed};
    use crate::logical::BigDecimal;
    use crate::schema::{AvroSchema, EnumSchema, FieldSchema, FixedSchema, RecordSchema};
    use std::sync::Arc;

    fn render_value(value: &Value) -> String {
        GenericData::new().to_string(value)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render_value(&Value::Null), "null");
        assert_eq!(render_value(&Value::Int(-3)), "-3");
        assert_eq!(render_value(&Value::Double(1.0)), "1.0");
        assert_eq!(render_value(&Value::Double(1e20)), "1.0E20");
        assert_eq!(render_value(&Value::Double(1.5e-5)), "1.5E-5");
        assert_eq!(render_value(&Value::Float(0.25)), "0.25");
        assert_eq!(render_value(&Value::Double(f64::NAN)), "\"NaN\"");
        assert_eq!(render_value(&Value::Float(f32::NEG_INFINITY)), "\"-Infinity\"");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(render_value(&Value::from("a\"b\\c\n")), r#""a\"b\\c\n""#);
        assert_eq!(render_value(&Value::from("\u{01}\u{2028}")), r#""\u0001\u2028""#);
        assert_eq!(render_value(&Value::from("é/")), "\"é/\"");
    }

    #[test]
    fn test_bytes_and_fixed() {
        assert_eq!(render_value(&Value::Bytes(vec![b'a', 0])), r#"{"bytes": "a\u0000"}"#);
        let fixed = Fixed::from_bytes(Arc::new(FixedSchema::new("F", 2)), &[1, 200]).unwrap();
        assert_eq!(render_value(&Value::Fixed(fixed)), "[1, 200]");
    }

    #[test]
    fn test_containers() {
        let schema = Arc::new(RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("name", AvroSchema::String),
                FieldSchema::new("tags", AvroSchema::Array(Box::new(AvroSchema::Int))),
                FieldSchema::new("attrs", AvroSchema::Map(Box::new(AvroSchema::Int))),
            ],
        ));
        let record = Record::from_values(
            schema,
            vec![
                Value::from("n"),
                Value::Array(Array::from(vec![Value::Int(1), Value::Int(2)])),
                Value::Map(HashMap::from([
                    ("b".to_string(), Value::Int(2)),
                    ("a".to_string(), Value::Int(1)),
                ])),
            ],
        )
        .unwrap();
        assert_eq!(
            render_value(&Value::Record(record)),
            r#"{"name": "n", "tags": [1, 2], "attrs": {"a": 1, "b": 2}}"#
        );
    }

    #[test]
    fn test_logical_values() {
        let suit = Arc::new(EnumSchema::new("Suit", vec!["SPADES".into()]));
        assert_eq!(render_value(&Value::Enum(EnumSymbol::new(suit, "SPADES").unwrap())), "\"SPADES\"");
        assert_eq!(render_value(&Value::Decimal(BigDecimal::new(126, 2))), "1.26");
        assert_eq!(render_value(&Value::Date(0)), "\"1970-01-01\"");
        assert_eq!(render_value(&Value::TimestampMillis(0)), "\"1970-01-01T00:00:00Z\"");
    }

    #[test]
    fn test_circular_guard() {
        let mut out = String::new();
        let array = Array::from(vec![Value::Int(1)]);
        let mut seen = Vec::new();
        assert!(enter(&array, &mut out, &mut seen));
        assert!(!enter(&array, &mut out, &mut seen));
        assert_eq!(out, CIRCULAR_REFERENCE);
    }
}
