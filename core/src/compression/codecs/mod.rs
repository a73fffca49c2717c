//! compression/codecs/mod.rs
//! Concrete block codecs.
//!
//! Gzip blocks are plain gzip members. The other codecs wrap their output in a
//! self-checking layout:
//!
//! ```text
//! [ orig_len (4, LE) ][ codec bytes ... ][ crc32 of original (4, LE) ]
//! ```

pub mod gzip;
pub mod lz4;
pub mod zlib;
pub mod zstd;

pub use self::gzip::*;
pub use self::lz4::*;
pub use self::zlib::*;
pub use self::zstd::*;

use byteorder::{ByteOrder, LittleEndian};

use crate::compression::CompressionError;
use crate::constants::MAX_BLOCK_SIZE;
use crate::utils::{compute_checksum, verify_checksum};

const LEN_PREFIX: usize = 4;
const CRC_SUFFIX: usize = 4;

/// Append `body` wrapped in the length + checksum layout.
pub(crate) fn write_checked(original: &[u8], body: &[u8], out: &mut Vec<u8>) {
    out.reserve(LEN_PREFIX + body.len() + CRC_SUFFIX);
    out.extend_from_slice(&(original.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(&compute_checksum(original).to_le_bytes());
}

pub(crate) struct CheckedPayload<'a> {
    pub orig_len: usize,
    pub body: &'a [u8],
    pub crc: u32,
}

pub(crate) fn split_checked<'a>(codec: &str, input: &'a [u8]) -> Result<CheckedPayload<'a>, CompressionError> {
    if input.len() < LEN_PREFIX + CRC_SUFFIX {
        return Err(CompressionError::process(codec, "input too short for length+checksum"));
    }
    let orig_len = LittleEndian::read_u32(&input[..LEN_PREFIX]) as usize;
    if orig_len > MAX_BLOCK_SIZE {
        return Err(CompressionError::ChunkTooLarge { have: orig_len, max: MAX_BLOCK_SIZE });
    }
    let crc = LittleEndian::read_u32(&input[input.len() - CRC_SUFFIX..]);
    Ok(CheckedPayload {
        orig_len,
        body: &input[LEN_PREFIX..input.len() - CRC_SUFFIX],
        crc,
    })
}

pub(crate) fn verify_decoded(codec: &str, payload: &CheckedPayload<'_>, decoded: &[u8]) -> Result<(), CompressionError> {
    if decoded.len() != payload.orig_len {
        return Err(CompressionError::process(
            codec,
            format!("decoded size {} != prefix {}", decoded.len(), payload.orig_len),
        ));
    }
    verify_checksum(payload.crc, compute_checksum(decoded), codec)
}
