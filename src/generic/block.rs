//! Blocks of binary encoded values, compressed with a [`Codec`].
//!
//! Layout: `[long count][long size][size bytes of compressed payload]`,
//! where the payload is the concatenated binary encodings of `count`
//! values. This is the block framing of an object container file.

use tracing::debug;

use crate::codec::Codec;
use crate::error::{DecodeError, GenericError};
use crate::generic::{GenericData, GenericDatumReader, GenericDatumWriter, Value};
use crate::io::varint::{decode_zigzag, write_zigzag};
use crate::io::{BinaryDecoder, BinaryEncoder};
use crate::schema::AvroSchema;

/// Encode `values` as one block and append it to `out`.
pub fn write_block(
    data: &GenericData,
    schema: &AvroSchema,
    values: &[Value],
    codec: Codec,
    out: &mut Vec<u8>,
) -> Result<(), GenericError> {
    let writer = GenericDatumWriter::new(data, schema.clone());
    let mut encoder = BinaryEncoder::new();
    for value in values {
        writer.write(value, &mut encoder)?;
    }
    let raw = encoder.into_inner();
    let compressed = codec.compress(&raw)?;
    debug!(
        codec = %codec,
        count = values.len(),
        raw = raw.len(),
        compressed = compressed.len(),
        "Wrote block"
    );

    write_zigzag(out, len_as_long(values.len())?);
    write_zigzag(out, len_as_long(compressed.len())?);
    out.extend_from_slice(&compressed);
    Ok(())
}

/// Decode the block at the front of `input`, advancing past it.
pub fn read_block(
    data: &GenericData,
    schema: &AvroSchema,
    codec: Codec,
    input: &mut &[u8],
) -> Result<Vec<Value>, GenericError> {
    let count = long_as_len(decode_zigzag(input)?, "block count")?;
    let size = long_as_len(decode_zigzag(input)?, "block size")?;
    if input.len() < size {
        return Err(DecodeError::UnexpectedEof.into());
    }
    let (payload, rest) = input.split_at(size);
    *input = rest;

    let raw = codec.decompress(payload)?;
    let reader = GenericDatumReader::new(data, schema.clone());
    let mut decoder = BinaryDecoder::new(&raw);
    let values = (0..count)
        .map(|_| reader.read(None, &mut decoder))
        .collect::<Result<Vec<_>, _>>()?;
    if !decoder.is_empty() {
        return Err(DecodeError::InvalidData(format!(
            "{} trailing bytes after {} values in block",
            decoder.remaining().len(),
            count
        ))
        .into());
    }
    debug!(codec = %codec, count, size, "Read block");
    Ok(values)
}

fn len_as_long(len: usize) -> Result<i64, GenericError> {
    i64::try_from(len).map_err(|_| GenericError::UnsupportedOperation(format!("Block too large: {}", len)))
}

fn long_as_len(value: i64, what: &str) -> Result<usize, GenericError> {
    usize::try_from(value)
        .map_err(|_| DecodeError::InvalidData(format!("Negative {}: {}", what, value)).into())
}
