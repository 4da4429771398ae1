//! Avro binary encoding.
//!
//! - `int` and `long` are zig-zag varints
//! - `float` and `double` are little-endian IEEE 754
//! - `bytes` and `string` are a `long` length followed by the raw bytes
//! - arrays and maps are blocks of items, each prefixed with a `long` count
//!   and terminated by a zero count
//! - union values are prefixed with the member index as a `long`

use crate::error::{DecodeError, EncodeError};
use crate::io::varint::{decode_zigzag, decode_zigzag_int, write_zigzag, write_zigzag_int};
use crate::io::{Decoder, Encoder};
use crate::schema::{AvroSchema, EnumSchema};

/// Writes the canonical binary encoding into a growable buffer.
#[derive(Debug, Default, Clone)]
pub struct BinaryEncoder {
    buf: Vec<u8>,
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Take the encoded bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Forget everything written while keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Encoder for BinaryEncoder {
    fn write_null(&mut self) -> Result<(), EncodeError> {
        Ok(())
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), EncodeError> {
        self.buf.push(value as u8);
        Ok(())
    }

    fn write_int(&mut self, value: i32) -> Result<(), EncodeError> {
        write_zigzag_int(&mut self.buf, value);
        Ok(())
    }

    fn write_long(&mut self, value: i64) -> Result<(), EncodeError> {
        write_zigzag(&mut self.buf, value);
        Ok(())
    }

    fn write_float(&mut self, value: f32) -> Result<(), EncodeError> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<(), EncodeError> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_bytes(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        write_zigzag(&mut self.buf, value.len() as i64);
        self.buf.extend_from_slice(value);
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<(), EncodeError> {
        self.write_bytes(value.as_bytes())
    }

    fn write_fixed(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        self.buf.extend_from_slice(value);
        Ok(())
    }

    fn write_enum(&mut self, index: usize, _symbol: &str) -> Result<(), EncodeError> {
        let index = i32::try_from(index)
            .map_err(|_| EncodeError::TypeMismatch(format!("Enum index {} exceeds int range", index)))?;
        self.write_int(index)
    }

    fn write_array_start(&mut self, len: usize) -> Result<(), EncodeError> {
        if len > 0 {
            write_zigzag(&mut self.buf, len as i64);
        }
        Ok(())
    }

    fn write_array_end(&mut self) -> Result<(), EncodeError> {
        self.buf.push(0);
        Ok(())
    }

    fn write_map_start(&mut self, len: usize) -> Result<(), EncodeError> {
        self.write_array_start(len)
    }

    fn write_map_key(&mut self, key: &str) -> Result<(), EncodeError> {
        self.write_string(key)
    }

    fn write_map_end(&mut self) -> Result<(), EncodeError> {
        self.write_array_end()
    }

    fn write_index(&mut self, index: usize, _member: &AvroSchema) -> Result<(), EncodeError> {
        write_zigzag(&mut self.buf, index as i64);
        Ok(())
    }
}

/// Reads the binary encoding from a byte slice.
#[derive(Debug, Clone)]
pub struct BinaryDecoder<'a> {
    data: &'a [u8],
}

impl<'a> BinaryDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    /// Whether all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.data.len() < len {
            return Err(DecodeError::UnexpectedEof);
        }
        let (head, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(head)
    }

    fn read_length(&mut self) -> Result<usize, DecodeError> {
        let len = decode_zigzag(&mut self.data)?;
        if len < 0 {
            return Err(DecodeError::InvalidData(format!("Negative bytes length: {}", len)));
        }
        Ok(len as usize)
    }

    /// Read a block count, skipping the byte size that follows a negative
    /// count.
    fn read_block_count(&mut self) -> Result<usize, DecodeError> {
        let count = decode_zigzag(&mut self.data)?;
        if count >= 0 {
            return Ok(count as usize);
        }
        let byte_size = decode_zigzag(&mut self.data)?;
        if byte_size < 0 {
            return Err(DecodeError::InvalidData(format!(
                "Negative block byte size: {}",
                byte_size
            )));
        }
        Ok(count.unsigned_abs() as usize)
    }
}

impl Decoder for BinaryDecoder<'_> {
    fn read_null(&mut self) -> Result<(), DecodeError> {
        Ok(())
    }

    fn read_boolean(&mut self) -> Result<bool, DecodeError> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidData(format!(
                "Invalid boolean value: {}, expected 0 or 1",
                byte
            ))),
        }
    }

    fn read_int(&mut self) -> Result<i32, DecodeError> {
        decode_zigzag_int(&mut self.data)
    }

    fn read_long(&mut self) -> Result<i64, DecodeError> {
        decode_zigzag(&mut self.data)
    }

    fn read_float(&mut self) -> Result<f32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_double(&mut self) -> Result<f64, DecodeError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_length()?;
        Ok(self.take(len)?.to_vec())
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(DecodeError::from)
    }

    fn read_fixed(&mut self, size: usize) -> Result<Vec<u8>, DecodeError> {
        Ok(self.take(size)?.to_vec())
    }

    fn read_enum(&mut self, schema: &EnumSchema) -> Result<usize, DecodeError> {
        let index = self.read_int()?;
        if index < 0 || index as usize >= schema.symbols.len() {
            return Err(DecodeError::InvalidData(format!(
                "Enum index {} out of range for enum '{}' with {} symbols",
                index,
                schema.name,
                schema.symbols.len()
            )));
        }
        Ok(index as usize)
    }

    fn read_index(&mut self, variants: &[AvroSchema]) -> Result<usize, DecodeError> {
        let index = self.read_long()?;
        if index < 0 || index as usize >= variants.len() {
            return Err(DecodeError::InvalidData(format!(
                "Union index {} out of range (0..{})",
                index,
                variants.len()
            )));
        }
        Ok(index as usize)
    }

    fn read_array_start(&mut self) -> Result<usize, DecodeError> {
        self.read_block_count()
    }

    fn array_next(&mut self) -> Result<usize, DecodeError> {
        self.read_block_count()
    }

    fn read_map_start(&mut self) -> Result<usize, DecodeError> {
        self.read_block_count()
    }

    fn read_map_key(&mut self) -> Result<String, DecodeError> {
        self.read_string()
    }

    fn map_next(&mut self) -> Result<usize, DecodeError> {
        self.read_block_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_layout() {
        let mut encoder = BinaryEncoder::new();
        encoder.write_boolean(true).unwrap();
        encoder.write_int(-1).unwrap();
        encoder.write_long(64).unwrap();
        encoder.write_string("hi").unwrap();
        assert_eq!(encoder.as_bytes(), &[0x01, 0x01, 0x80, 0x01, 0x04, b'h', b'i']);

        let bytes = encoder.into_inner();
        let mut decoder = BinaryDecoder::new(&bytes);
        assert!(decoder.read_boolean().unwrap());
        assert_eq!(decoder.read_int().unwrap(), -1);
        assert_eq!(decoder.read_long().unwrap(), 64);
        assert_eq!(decoder.read_string().unwrap(), "hi");
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_empty_array_is_single_zero() {
        let mut encoder = BinaryEncoder::new();
        encoder.write_array_start(0).unwrap();
        encoder.write_array_end().unwrap();
        assert_eq!(encoder.as_bytes(), &[0x00]);
    }

    #[test]
    fn test_negative_block_count_skips_size() {
        // -2 items, 2 bytes of payload, items 1 and 2, terminator
        let data = [0x03, 0x04, 0x02, 0x04, 0x00];
        let mut decoder = BinaryDecoder::new(&data);
        assert_eq!(decoder.read_array_start().unwrap(), 2);
        assert_eq!(decoder.read_int().unwrap(), 1);
        assert_eq!(decoder.read_int().unwrap(), 2);
        assert_eq!(decoder.array_next().unwrap(), 0);
    }

    #[test]
    fn test_invalid_boolean_and_truncation() {
        let mut decoder = BinaryDecoder::new(&[0x02]);
        assert!(matches!(decoder.read_boolean(), Err(DecodeError::InvalidData(_))));

        let mut decoder = BinaryDecoder::new(&[0x00, 0x00]);
        assert!(matches!(decoder.read_double(), Err(DecodeError::UnexpectedEof)));

        let mut decoder = BinaryDecoder::new(&[0x06, b'a']);
        assert!(matches!(decoder.read_bytes(), Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn test_enum_index_out_of_range() {
        let schema = EnumSchema::new("E", vec!["A".to_string()]);
        let mut decoder = BinaryDecoder::new(&[0x02]);
        assert!(decoder.read_enum(&schema).is_err());
    }
}
