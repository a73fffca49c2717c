//! compression/registry.rs
//! Codec registry and factory functions.

use crate::compression::codecs::{gzip, lz4, zlib, zstd};
use crate::compression::types::{CompressionCodec, CompressionError, Compressor, Decompressor};
use crate::constants::{DEFAULT_LEVEL_GZIP, DEFAULT_LEVEL_ZLIB, DEFAULT_LEVEL_ZSTD};

pub struct CodecInfo {
    pub name: &'static str,
    pub default_level: i32,
    pub levels: Option<(i32, i32)>,
}

pub fn resolve(codec: CompressionCodec) -> CodecInfo {
    match codec {
        CompressionCodec::Gzip =>
            CodecInfo { name: "gzip", default_level: DEFAULT_LEVEL_GZIP as i32, levels: Some((0, 9)) },
        CompressionCodec::Zlib =>
            CodecInfo { name: "zlib", default_level: DEFAULT_LEVEL_ZLIB as i32, levels: Some((0, 9)) },
        CompressionCodec::Zstd =>
            CodecInfo { name: "zstd", default_level: DEFAULT_LEVEL_ZSTD, levels: Some((1, 22)) },
        CompressionCodec::Lz4 =>
            CodecInfo { name: "lz4", default_level: 0, levels: None },
    }
}

/// Check `level` against the codec's accepted range and fill in the default.
pub fn resolve_level(codec: CompressionCodec, level: Option<i32>) -> Result<i32, CompressionError> {
    let info = resolve(codec);
    let level = level.unwrap_or(info.default_level);
    match info.levels {
        Some((lo, hi)) if level < lo || level > hi => Err(CompressionError::InvalidLevel {
            codec: info.name.into(),
            level,
        }),
        _ => Ok(level),
    }
}

pub fn create_compressor(codec: CompressionCodec, level: Option<i32>)
    -> Result<Box<dyn Compressor + Send>, CompressionError>
{
    let level = resolve_level(codec, level)?;
    match codec {
        CompressionCodec::Gzip => gzip::GzipCompressor::new(level as u32),
        CompressionCodec::Zlib => zlib::ZlibCompressor::new(level as u32),
        CompressionCodec::Zstd => zstd::ZstdCompressor::new(level),
        CompressionCodec::Lz4 => lz4::Lz4Compressor::new(),
    }
}

pub fn create_decompressor(codec: CompressionCodec)
    -> Result<Box<dyn Decompressor + Send>, CompressionError>
{
    match codec {
        CompressionCodec::Gzip => gzip::GzipDecompressor::new(),
        CompressionCodec::Zlib => zlib::ZlibDecompressor::new(),
        CompressionCodec::Zstd => zstd::ZstdDecompressor::new(),
        CompressionCodec::Lz4 => lz4::Lz4Decompressor::new(),
    }
}
