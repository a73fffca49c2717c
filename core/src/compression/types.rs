//! compression/types.rs
//! Codec identifiers, errors and the backend traits.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Block codec. `Gzip` writes one gzip member per block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    #[default]
    Gzip,
    Zlib,
    Zstd,
    Lz4,
}

impl CompressionCodec {
    pub const ALL: [CompressionCodec; 4] = [
        CompressionCodec::Gzip,
        CompressionCodec::Zlib,
        CompressionCodec::Zstd,
        CompressionCodec::Lz4,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CompressionCodec::Gzip => "gzip",
            CompressionCodec::Zlib => "zlib",
            CompressionCodec::Zstd => "zstd",
            CompressionCodec::Lz4 => "lz4",
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionCodec {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(CompressionCodec::Gzip),
            "zlib" | "deflate" => Ok(CompressionCodec::Zlib),
            "zstd" | "zst" => Ok(CompressionCodec::Zstd),
            "lz4" => Ok(CompressionCodec::Lz4),
            other => Err(CompressionError::UnsupportedCodec { name: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    #[error("unsupported compression codec: {name}")]
    UnsupportedCodec { name: String },

    #[error("invalid level {level} for {codec}")]
    InvalidLevel { codec: String, level: i32 },

    #[error("codec {codec} init failed: {msg}")]
    CodecInitFailed { codec: String, msg: String },

    #[error("codec {codec} process failed: {msg}")]
    CodecProcessFailed { codec: String, msg: String },

    #[error("chunk too large: {have} > {max}")]
    ChunkTooLarge { have: usize, max: usize },

    #[error("codec {codec} checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { codec: String, expected: u32, actual: u32 },
}

impl CompressionError {
    pub(crate) fn process(codec: &str, e: impl fmt::Display) -> Self {
        CompressionError::CodecProcessFailed { codec: codec.into(), msg: e.to_string() }
    }
}

// Require Send so trait objects can cross thread boundaries.
pub trait Compressor: Send {
    /// Compress a single block into `out`.
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}

pub trait Decompressor: Send {
    /// Decompress a single block into `out`.
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}
