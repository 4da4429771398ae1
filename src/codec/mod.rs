//! Compression codecs for blocks of encoded datums.
//!
//! A [`Codec`] compresses and decompresses whole blocks. Leveled codecs
//! carry their level, but two codecs of the same kind compare and hash
//! equal regardless of level or checksum setting: the level only matters
//! when writing, and a reader can decompress any level.

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::error::CodecError;

#[cfg(feature = "snappy")]
use snap::raw::{Decoder as SnappyDecoder, Encoder as SnappyEncoder};

#[cfg(feature = "deflate")]
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};

#[cfg(feature = "bzip2")]
use bzip2::{read::BzDecoder, write::BzEncoder};

#[cfg(feature = "xz")]
use xz2::{read::XzDecoder, write::XzEncoder};

#[cfg(any(feature = "deflate", feature = "zstd", feature = "bzip2", feature = "xz"))]
use std::io::{Read, Write};

/// Deflate level used when none is given.
pub const DEFAULT_DEFLATE_LEVEL: u32 = 6;
/// Zstandard level used when none is given.
pub const DEFAULT_ZSTANDARD_LEVEL: i32 = 3;
/// Xz preset used when none is given.
pub const DEFAULT_XZ_LEVEL: u32 = 6;

const ZSTANDARD_LEVELS: std::ops::RangeInclusive<i32> = -7..=22;

/// Block compression codec.
#[derive(Debug, Clone, Copy, Default)]
pub enum Codec {
    /// No compression
    #[default]
    Null,
    /// Snappy, followed by a 4-byte big-endian CRC32 of the uncompressed data
    Snappy,
    /// Raw DEFLATE (RFC 1951), no zlib or gzip wrapper
    Deflate { level: u32 },
    /// Zstandard frame, optionally with a content checksum
    Zstandard { level: i32, checksum: bool },
    Bzip2,
    Xz { level: u32 },
}

impl Codec {
    /// Deflate with the given level, 0 (store) through 9 (best).
    pub fn deflate(level: u32) -> Result<Self, CodecError> {
        if level > 9 {
            return Err(CodecError::UnsupportedCodec(format!(
                "Invalid deflate level {}: expected 0..=9",
                level
            )));
        }
        Ok(Codec::Deflate { level })
    }

    pub fn zstandard(level: i32, checksum: bool) -> Result<Self, CodecError> {
        if !ZSTANDARD_LEVELS.contains(&level) {
            return Err(CodecError::UnsupportedCodec(format!(
                "Invalid zstandard level {}: expected {}..={}",
                level,
                ZSTANDARD_LEVELS.start(),
                ZSTANDARD_LEVELS.end()
            )));
        }
        Ok(Codec::Zstandard { level, checksum })
    }

    pub fn xz(level: u32) -> Result<Self, CodecError> {
        if level > 9 {
            return Err(CodecError::UnsupportedCodec(format!(
                "Invalid xz level {}: expected 0..=9",
                level
            )));
        }
        Ok(Codec::Xz { level })
    }

    /// Look up a codec by the name recorded in container metadata.
    ///
    /// Leveled codecs get their default level.
    ///
    /// # Examples
    /// ```
    /// use avro_generic::codec::Codec;
    ///
    /// let codec = Codec::from_name("deflate").unwrap();
    /// assert_eq!(codec.to_string(), "deflate[6]");
    ///
    /// let err = Codec::from_name("lz4").unwrap_err();
    /// assert!(err.to_string().contains("lz4"));
    /// ```
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        let codec = match name {
            "null" => Codec::Null,
            "snappy" => Codec::Snappy,
            "deflate" => Codec::Deflate {
                level: DEFAULT_DEFLATE_LEVEL,
            },
            "zstandard" | "zstd" => Codec::Zstandard {
                level: DEFAULT_ZSTANDARD_LEVEL,
                checksum: false,
            },
            "bzip2" => Codec::Bzip2,
            "xz" => Codec::Xz {
                level: DEFAULT_XZ_LEVEL,
            },
            unknown => {
                return Err(CodecError::UnsupportedCodec(format!(
                    "Unknown codec '{}'. Supported codecs: null, snappy, deflate, zstandard, bzip2, xz",
                    unknown
                )))
            }
        };
        debug!(codec = %codec, "Selected codec");
        Ok(codec)
    }

    /// Name as recorded in container metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Null => "null",
            Codec::Snappy => "snappy",
            Codec::Deflate { .. } => "deflate",
            Codec::Zstandard { .. } => "zstandard",
            Codec::Bzip2 => "bzip2",
            Codec::Xz { .. } => "xz",
        }
    }

    /// Compress one block.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        match *self {
            Codec::Null => Ok(data.to_vec()),
            #[cfg(feature = "snappy")]
            Codec::Snappy => compress_snappy(data),
            #[cfg(feature = "deflate")]
            Codec::Deflate { level } => compress_deflate(data, level),
            #[cfg(feature = "zstd")]
            Codec::Zstandard { level, checksum } => compress_zstandard(data, level, checksum),
            #[cfg(feature = "bzip2")]
            Codec::Bzip2 => compress_bzip2(data),
            #[cfg(feature = "xz")]
            Codec::Xz { level } => compress_xz(data, level),
            #[allow(unreachable_patterns)]
            _ => Err(self.not_enabled()),
        }
    }

    /// Decompress one block.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        match self {
            Codec::Null => Ok(data.to_vec()),
            #[cfg(feature = "snappy")]
            Codec::Snappy => decompress_snappy(data),
            #[cfg(feature = "deflate")]
            Codec::Deflate { .. } => read_all("Deflate", DeflateDecoder::new(data), data),
            #[cfg(feature = "zstd")]
            Codec::Zstandard { .. } => decompress_zstandard(data),
            #[cfg(feature = "bzip2")]
            Codec::Bzip2 => read_all("Bzip2", BzDecoder::new(data), data),
            #[cfg(feature = "xz")]
            Codec::Xz { .. } => read_all("Xz", XzDecoder::new(data), data),
            #[allow(unreachable_patterns)]
            _ => Err(self.not_enabled()),
        }
    }

    fn not_enabled(&self) -> CodecError {
        let feature = match self {
            Codec::Zstandard { .. } => "zstd",
            other => other.name(),
        };
        CodecError::UnsupportedCodec(format!(
            "{} codec not enabled. Enable the '{}' feature.",
            self.name(),
            feature
        ))
    }

    fn level(&self) -> Option<i64> {
        match *self {
            Codec::Deflate { level } | Codec::Xz { level } => Some(i64::from(level)),
            Codec::Zstandard { level, .. } => Some(i64::from(level)),
            _ => None,
        }
    }
}

impl PartialEq for Codec {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Eq for Codec {}

impl Hash for Codec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level() {
            Some(level) => write!(f, "{}[{}]", self.name(), level),
            None => f.write_str(self.name()),
        }
    }
}

// Snappy blocks carry a CRC32 (ISO polynomial, not Castagnoli) of the
// uncompressed bytes after the compressed payload.
#[cfg(feature = "snappy")]
const CRC_SIZE: usize = 4;

#[cfg(feature = "snappy")]
fn compress_snappy(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut compressed = SnappyEncoder::new()
        .compress_vec(data)
        .map_err(|e| CodecError::CompressionError(format!("Snappy compression failed: {}", e)))?;
    compressed.extend_from_slice(&crc32fast::hash(data).to_be_bytes());
    Ok(compressed)
}

#[cfg(feature = "snappy")]
fn decompress_snappy(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.len() < CRC_SIZE {
        return Err(CodecError::DecompressionError(
            "Snappy data too short: missing CRC checksum".to_string(),
        ));
    }
    let (compressed, crc) = data.split_at(data.len() - CRC_SIZE);
    let expected = u32::from_be_bytes([crc[0], crc[1], crc[2], crc[3]]);

    let decompressed = if compressed.is_empty() {
        Vec::new()
    } else {
        SnappyDecoder::new()
            .decompress_vec(compressed)
            .map_err(|e| CodecError::DecompressionError(format!("Snappy decompression failed: {}", e)))?
    };

    let actual = crc32fast::hash(&decompressed);
    if actual != expected {
        return Err(CodecError::DecompressionError(format!(
            "Snappy CRC32 checksum mismatch: expected 0x{:08X}, got 0x{:08X}",
            expected, actual
        )));
    }
    Ok(decompressed)
}

#[cfg(feature = "deflate")]
fn compress_deflate(data: &[u8], level: u32) -> Result<Vec<u8>, CodecError> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| CodecError::CompressionError(format!("Deflate compression failed: {}", e)))
}

#[cfg(feature = "zstd")]
fn compress_zstandard(data: &[u8], level: i32, checksum: bool) -> Result<Vec<u8>, CodecError> {
    let fail = |e: std::io::Error| CodecError::CompressionError(format!("Zstandard compression failed: {}", e));
    let mut encoder = zstd::Encoder::new(Vec::with_capacity(data.len() / 2), level).map_err(fail)?;
    encoder.include_checksum(checksum).map_err(fail)?;
    encoder.write_all(data).map_err(fail)?;
    encoder.finish().map_err(fail)
}

#[cfg(feature = "zstd")]
fn decompress_zstandard(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let decoder = zstd::Decoder::new(data).map_err(|e| {
        CodecError::DecompressionError(format!("Zstandard decoder initialization failed: {}", e))
    })?;
    read_all("Zstandard", decoder, data)
}

#[cfg(feature = "bzip2")]
fn compress_bzip2(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = BzEncoder::new(Vec::with_capacity(data.len() / 2), bzip2::Compression::best());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| CodecError::CompressionError(format!("Bzip2 compression failed: {}", e)))
}

#[cfg(feature = "xz")]
fn compress_xz(data: &[u8], level: u32) -> Result<Vec<u8>, CodecError> {
    let mut encoder = XzEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| CodecError::CompressionError(format!("Xz compression failed: {}", e)))
}

#[cfg(any(feature = "deflate", feature = "zstd", feature = "bzip2", feature = "xz"))]
fn read_all<R: Read>(codec: &str, mut decoder: R, data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut decompressed = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CodecError::DecompressionError(format!("{} decompression failed: {}", codec, e)))?;
    Ok(decompressed)
}
