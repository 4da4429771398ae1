//! Integration tests for decimal values, from schema text to encoded bytes.

use std::str::FromStr;

use proptest::prelude::*;

use avro_generic::{
    parse_schema, BigDecimal, BinaryDecoder, BinaryEncoder, GenericConfig, GenericData, GenericDatumReader,
    GenericDatumWriter, GenericError, JsonDecoder, JsonEncoder, RoundingMode, Value,
};

fn write_binary(data: &GenericData, schema_json: &str, value: &Value) -> Result<Vec<u8>, GenericError> {
    let schema = parse_schema(schema_json)?;
    let mut encoder = BinaryEncoder::new();
    GenericDatumWriter::new(data, schema).write(value, &mut encoder)?;
    Ok(encoder.into_inner())
}

fn read_binary(data: &GenericData, schema_json: &str, bytes: &[u8]) -> Result<Value, GenericError> {
    let schema = parse_schema(schema_json)?;
    GenericDatumReader::new(data, schema).read(None, &mut BinaryDecoder::new(bytes))
}

fn decimal(text: &str) -> Value {
    Value::Decimal(BigDecimal::from_str(text).unwrap())
}

const BYTES_4_2: &str = r#"{"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 2}"#;

#[test]
fn test_half_up_rounding_layout() {
    let data = GenericData::new();
    let schema = r#"{"type": "bytes", "logicalType": "decimal", "precision": 5, "scale": 2,
                     "serRounding": "HALF_UP"}"#;
    let bytes = write_binary(&data, schema, &decimal("1.255")).unwrap();
    // Length 2, then zig-zag scale 2 and unscaled 126.
    assert_eq!(bytes, vec![0x04, 0x04, 0x7E]);
    assert_eq!(read_binary(&data, schema, &bytes).unwrap(), decimal("1.26"));
}

#[test]
fn test_excess_scale_without_rounding_is_rejected() {
    let data = GenericData::new();
    let err = write_binary(&data, BYTES_4_2, &decimal("1.255")).unwrap_err();
    match err {
        GenericError::PrecisionViolation(message) => assert!(message.contains("serRounding"), "{}", message),
        other => panic!("expected a precision violation, got {:?}", other),
    }
}

#[test]
fn test_precision_violation() {
    let data = GenericData::new();
    assert!(matches!(
        write_binary(&data, BYTES_4_2, &decimal("123.45")),
        Err(GenericError::PrecisionViolation(_))
    ));
    assert!(write_binary(&data, BYTES_4_2, &decimal("99.99")).is_ok());
}

#[test]
fn test_config_default_rounding_applies_without_attribute() {
    let config = GenericConfig::default().with_default_ser_rounding(Some(RoundingMode::HalfEven));
    let data = GenericData::with_config(config);
    let bytes = write_binary(&data, BYTES_4_2, &decimal("1.125")).unwrap();
    assert_eq!(read_binary(&data, BYTES_4_2, &bytes).unwrap(), decimal("1.12"));
}

#[test]
fn test_attribute_none_disables_config_default() {
    let config = GenericConfig::default().with_default_ser_rounding(Some(RoundingMode::HalfUp));
    let data = GenericData::with_config(config);
    let schema = r#"{"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 2,
                     "serRounding": "none"}"#;
    assert!(write_binary(&data, schema, &decimal("1.125")).is_err());
}

#[test]
fn test_string_backed_decimal() {
    let data = GenericData::new();
    let schema = r#"{"type": "string", "logicalType": "decimal", "precision": 6, "scale": 3}"#;
    let bytes = write_binary(&data, schema, &decimal("-12.5")).unwrap();
    // Length 5, then the plain text.
    assert_eq!(&bytes[1..], b"-12.5");
    assert_eq!(read_binary(&data, schema, &bytes).unwrap(), decimal("-12.5"));
}

#[test]
fn test_json_encoding_is_a_plain_number() {
    let data = GenericData::new();
    let schema = parse_schema(BYTES_4_2).unwrap();
    let mut encoder = JsonEncoder::new();
    GenericDatumWriter::new(&data, schema.clone())
        .write(&decimal("12.34"), &mut encoder)
        .unwrap();
    let json = encoder.into_value().unwrap();
    assert_eq!(json.to_string(), "12.34");

    let decoded = GenericDatumReader::new(&data, schema)
        .read(None, &mut JsonDecoder::new(json))
        .unwrap();
    assert_eq!(decoded, decimal("12.34"));
}

#[test]
fn test_truncated_scale_is_malformed() {
    let data = GenericData::new();
    // A bytes value of length 1 holding a varint continuation byte only.
    let err = read_binary(&data, BYTES_4_2, &[0x02, 0x80]).unwrap_err();
    assert!(matches!(err, GenericError::MalformedEncoding(_)), "{:?}", err);
}

#[test]
fn test_decimal_without_conversion_stays_raw() {
    let mut data = GenericData::new();
    data.conversions_mut().clear();
    let value = read_binary(&data, BYTES_4_2, &[0x04, 0x04, 0x7E]).unwrap();
    assert_eq!(value, Value::Bytes(vec![0x04, 0x7E]));
}

#[test]
fn test_wire_scale_extremes() {
    let data = GenericData::new();
    // Scale i32::MIN is within the declared scale, so it is kept as sent.
    let huge = read_binary(&data, BYTES_4_2, &[0x0C, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x01]).unwrap();
    assert_eq!(huge, Value::Decimal(BigDecimal::new(1, i32::MIN)));

    let schema = parse_schema(BYTES_4_2).unwrap();
    assert_eq!(data.compare(&huge, &decimal("0.01"), &schema).unwrap(), std::cmp::Ordering::Greater);
    assert_eq!(data.compare(&decimal("-0.01"), &huge, &schema).unwrap(), std::cmp::Ordering::Less);
    assert!(data.hash_code(&huge, &schema).is_ok());

    // Scale i32::MAX exceeds it: rejected without rounding, rounded to zero with it.
    let tiny = [0x0C, 0xFE, 0xFF, 0xFF, 0xFF, 0x0F, 0x01];
    assert!(matches!(
        read_binary(&data, BYTES_4_2, &tiny),
        Err(GenericError::PrecisionViolation(_))
    ));
    let rounding = r#"{"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 2,
                       "deserRounding": "HALF_UP"}"#;
    assert_eq!(
        read_binary(&data, rounding, &tiny).unwrap(),
        Value::Decimal(BigDecimal::new(0, 2))
    );
}

#[test]
fn test_extreme_scale_write_rounds_to_declared_scale() {
    let data = GenericData::new();
    let schema = r#"{"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 2,
                     "serRounding": "UP"}"#;
    let value = Value::Decimal(BigDecimal::new(7, i32::MAX));
    let bytes = write_binary(&data, schema, &value).unwrap();
    assert_eq!(read_binary(&data, schema, &bytes).unwrap(), decimal("0.01"));
}

proptest! {
    #[test]
    fn prop_binary_roundtrip(unscaled in -9_999i64..=9_999, scale in 0i32..=2) {
        let data = GenericData::new();
        let value = Value::Decimal(BigDecimal::new(unscaled, scale));
        let bytes = write_binary(&data, BYTES_4_2, &value).unwrap();
        let decoded = read_binary(&data, BYTES_4_2, &bytes).unwrap();
        match (&value, &decoded) {
            (Value::Decimal(a), Value::Decimal(b)) => prop_assert_eq!(a.cmp_numeric(b), std::cmp::Ordering::Equal),
            _ => prop_assert!(false, "decoded {:?}", decoded),
        }
    }
}
