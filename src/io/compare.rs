//! Ordering of binary encoded values.
//!
//! [`binary_compare`] orders two canonical binary encodings of the same
//! schema without materializing values. It agrees with
//! [`GenericData::compare`](crate::generic::GenericData::compare) on
//! decoded values, which is how the engine's ordering is checked.

use std::cmp::Ordering;

use crate::error::{DecodeError, GenericError};
use crate::io::varint::{decode_zigzag, decode_zigzag_int, skip_varint};
use crate::schema::{AvroSchema, FieldOrder, SchemaResolutionContext};

/// Compare two binary encoded values of `schema`.
///
/// Fields ordered `ignore` are skipped and `descending` fields invert the
/// result. Maps have no order and fail with `UnsupportedOperation`.
pub fn binary_compare(a: &[u8], b: &[u8], schema: &AvroSchema) -> Result<Ordering, GenericError> {
    let context = SchemaResolutionContext::build_from_schema(schema);
    let mut left = a;
    let mut right = b;
    compare_encoded(&mut left, &mut right, schema, &context)
}

fn take<'a>(data: &mut &'a [u8], len: usize) -> Result<&'a [u8], DecodeError> {
    if data.len() < len {
        return Err(DecodeError::UnexpectedEof);
    }
    let (head, rest) = data.split_at(len);
    *data = rest;
    Ok(head)
}

fn read_length(data: &mut &[u8]) -> Result<usize, DecodeError> {
    let len = decode_zigzag(data)?;
    usize::try_from(len).map_err(|_| DecodeError::InvalidData(format!("Negative length: {}", len)))
}

fn read_block_count(data: &mut &[u8]) -> Result<usize, DecodeError> {
    let count = decode_zigzag(data)?;
    if count < 0 {
        read_length(data)?;
    }
    Ok(count.unsigned_abs() as usize)
}

fn compare_encoded(
    a: &mut &[u8],
    b: &mut &[u8],
    schema: &AvroSchema,
    context: &SchemaResolutionContext,
) -> Result<Ordering, GenericError> {
    let ordering = match schema {
        AvroSchema::Null => Ordering::Equal,
        AvroSchema::Boolean => take(a, 1)?[0].cmp(&take(b, 1)?[0]),
        AvroSchema::Int | AvroSchema::Enum(_) => decode_zigzag_int(a)?.cmp(&decode_zigzag_int(b)?),
        AvroSchema::Long => decode_zigzag(a)?.cmp(&decode_zigzag(b)?),
        AvroSchema::Float => {
            let x = f32::from_le_bytes(take(a, 4)?.try_into().map_err(|_| DecodeError::UnexpectedEof)?);
            let y = f32::from_le_bytes(take(b, 4)?.try_into().map_err(|_| DecodeError::UnexpectedEof)?);
            x.total_cmp(&y)
        }
        AvroSchema::Double => {
            let x = f64::from_le_bytes(take(a, 8)?.try_into().map_err(|_| DecodeError::UnexpectedEof)?);
            let y = f64::from_le_bytes(take(b, 8)?.try_into().map_err(|_| DecodeError::UnexpectedEof)?);
            x.total_cmp(&y)
        }
        AvroSchema::String | AvroSchema::Bytes => {
            let len_a = read_length(a)?;
            let len_b = read_length(b)?;
            take(a, len_a)?.cmp(take(b, len_b)?)
        }
        AvroSchema::Fixed(fixed) => take(a, fixed.size)?.cmp(take(b, fixed.size)?),
        AvroSchema::Record(record) => {
            for field in &record.fields {
                if field.order == FieldOrder::Ignore {
                    skip_encoded(a, &field.schema, context)?;
                    skip_encoded(b, &field.schema, context)?;
                    continue;
                }
                let ordering = compare_encoded(a, b, &field.schema, context)?;
                if ordering != Ordering::Equal {
                    return Ok(if field.order == FieldOrder::Descending {
                        ordering.reverse()
                    } else {
                        ordering
                    });
                }
            }
            Ordering::Equal
        }
        AvroSchema::Array(items) => {
            let mut remaining_a = read_block_count(a)?;
            let mut remaining_b = read_block_count(b)?;
            loop {
                if remaining_a == 0 || remaining_b == 0 {
                    break remaining_a.cmp(&remaining_b);
                }
                let ordering = compare_encoded(a, b, items, context)?;
                if ordering != Ordering::Equal {
                    break ordering;
                }
                remaining_a -= 1;
                remaining_b -= 1;
                if remaining_a == 0 {
                    remaining_a = read_block_count(a)?;
                }
                if remaining_b == 0 {
                    remaining_b = read_block_count(b)?;
                }
            }
        }
        AvroSchema::Map(_) => {
            return Err(GenericError::UnsupportedOperation("Can't compare maps!".to_string()))
        }
        AvroSchema::Union(variants) => {
            let index_a = decode_zigzag(a)?;
            let index_b = decode_zigzag(b)?;
            if index_a != index_b {
                return Ok(index_a.cmp(&index_b));
            }
            let member = usize::try_from(index_a)
                .ok()
                .and_then(|i| variants.get(i))
                .ok_or_else(|| {
                    DecodeError::InvalidData(format!("Union index {} out of range", index_a))
                })?;
            compare_encoded(a, b, member, context)?
        }
        AvroSchema::Named(_) => compare_encoded(a, b, context.resolve(schema)?, context)?,
        AvroSchema::Logical(logical) => compare_encoded(a, b, &logical.base, context)?,
    };
    Ok(ordering)
}

/// Advance `data` past one encoded value of `schema`.
pub fn skip_encoded(
    data: &mut &[u8],
    schema: &AvroSchema,
    context: &SchemaResolutionContext,
) -> Result<(), GenericError> {
    match schema {
        AvroSchema::Null => {}
        AvroSchema::Boolean => {
            take(data, 1)?;
        }
        AvroSchema::Int | AvroSchema::Long | AvroSchema::Enum(_) => skip_varint(data)?,
        AvroSchema::Float => {
            take(data, 4)?;
        }
        AvroSchema::Double => {
            take(data, 8)?;
        }
        AvroSchema::String | AvroSchema::Bytes => {
            let len = read_length(data)?;
            take(data, len)?;
        }
        AvroSchema::Fixed(fixed) => {
            take(data, fixed.size)?;
        }
        AvroSchema::Record(record) => {
            for field in &record.fields {
                skip_encoded(data, &field.schema, context)?;
            }
        }
        AvroSchema::Array(items) => skip_blocks(data, context, |data, context| {
            skip_encoded(data, items, context)
        })?,
        AvroSchema::Map(values) => skip_blocks(data, context, |data, context| {
            let len = read_length(data)?;
            take(data, len)?;
            skip_encoded(data, values, context)
        })?,
        AvroSchema::Union(variants) => {
            let index = decode_zigzag(data)?;
            let member = usize::try_from(index)
                .ok()
                .and_then(|i| variants.get(i))
                .ok_or_else(|| DecodeError::InvalidData(format!("Union index {} out of range", index)))?;
            skip_encoded(data, member, context)?;
        }
        AvroSchema::Named(_) => skip_encoded(data, context.resolve(schema)?, context)?,
        AvroSchema::Logical(logical) => skip_encoded(data, &logical.base, context)?,
    }
    Ok(())
}

fn skip_blocks<F>(
    data: &mut &[u8],
    context: &SchemaResolutionContext,
    mut skip_item: F,
) -> Result<(), GenericError>
where
    F: FnMut(&mut &[u8], &SchemaResolutionContext) -> Result<(), GenericError>,
{
    loop {
        let count = decode_zigzag(data)?;
        if count == 0 {
            return Ok(());
        }
        if count < 0 {
            // Sized block: jump over the payload
            let size = read_length(data)?;
            take(data, size)?;
            continue;
        }
        for _ in 0..count {
            skip_item(data, context)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{BinaryEncoder, Encoder};
    use crate::schema::{FieldSchema, RecordSchema};
    use std::sync::Arc;

    fn ints(values: &[i32]) -> Vec<u8> {
        let mut encoder = BinaryEncoder::new();
        for v in values {
            encoder.write_int(*v).unwrap();
        }
        encoder.into_inner()
    }

    #[test]
    fn test_record_field_orders() {
        let schema = AvroSchema::Record(Arc::new(RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("a", AvroSchema::Int),
                FieldSchema::new("b", AvroSchema::Int).with_order(FieldOrder::Ignore),
                FieldSchema::new("c", AvroSchema::Int).with_order(FieldOrder::Descending),
            ],
        )));
        let left = ints(&[1, 99, 5]);
        let right = ints(&[1, -1, 7]);
        assert_eq!(binary_compare(&left, &right, &schema).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_array_prefix_sorts_first() {
        let schema = AvroSchema::Array(Box::new(AvroSchema::Int));
        let mut short = BinaryEncoder::new();
        short.write_array_start(1).unwrap();
        short.write_int(3).unwrap();
        short.write_array_end().unwrap();
        let mut long = BinaryEncoder::new();
        long.write_array_start(2).unwrap();
        long.write_int(3).unwrap();
        long.write_int(0).unwrap();
        long.write_array_end().unwrap();
        assert_eq!(
            binary_compare(short.as_bytes(), long.as_bytes(), &schema).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_strings_compare_bytewise() {
        let mut a = BinaryEncoder::new();
        a.write_string("ab").unwrap();
        let mut b = BinaryEncoder::new();
        b.write_string("b").unwrap();
        assert_eq!(
            binary_compare(a.as_bytes(), b.as_bytes(), &AvroSchema::String).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_maps_are_unordered() {
        let schema = AvroSchema::Map(Box::new(AvroSchema::Int));
        assert!(matches!(
            binary_compare(&[0], &[0], &schema),
            Err(GenericError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_skip_sized_map_block() {
        // -1 entries, 3 payload bytes, key "k", value 1, terminator, then a trailing int
        let data = [0x01, 0x06, 0x02, b'k', 0x02, 0x00, 0x08];
        let mut cursor = &data[..];
        let context = SchemaResolutionContext::new();
        skip_encoded(&mut cursor, &AvroSchema::Map(Box::new(AvroSchema::Int)), &context).unwrap();
        assert_eq!(cursor, &[0x08]);
    }
}
