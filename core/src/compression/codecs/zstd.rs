//! Zstd block API (`zstd::bulk`), wrapped in the length + checksum layout.
//!
//! The length prefix doubles as the exact output capacity for `bulk::decompress`.

use super::{split_checked, verify_decoded, write_checked};
use crate::compression::types::{CompressionError, Compressor, Decompressor};

pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self { level }))
    }
}

impl Compressor for ZstdCompressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = zstd::bulk::compress(input, self.level)
            .map_err(|e| CompressionError::process("zstd", e))?;
        write_checked(input, &compressed, out);
        Ok(())
    }
}

pub struct ZstdDecompressor;

impl ZstdDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for ZstdDecompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let payload = split_checked("zstd", input)?;

        let decompressed = zstd::bulk::decompress(payload.body, payload.orig_len)
            .map_err(|e| CompressionError::process("zstd", e))?;

        verify_decoded("zstd", &payload, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
