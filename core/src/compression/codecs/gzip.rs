//! Gzip via flate2: one complete gzip member per block.

use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::compression::types::{CompressionError, Compressor, Decompressor};
use crate::constants::MAX_BLOCK_SIZE;

pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    pub fn new(level: u32) -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self { level: Compression::new(level) }))
    }
}

impl Compressor for GzipCompressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let mut enc = GzEncoder::new(out, self.level);
        enc.write_all(input).map_err(|e| CompressionError::process("gzip", e))?;
        enc.finish().map_err(|e| CompressionError::process("gzip", e))?;
        Ok(())
    }
}

pub struct GzipDecompressor;

impl GzipDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for GzipDecompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let start = out.len();
        // One byte past the limit is enough to detect an oversized block.
        let mut dec = GzDecoder::new(input).take(MAX_BLOCK_SIZE as u64 + 1);
        dec.read_to_end(out).map_err(|e| CompressionError::process("gzip", e))?;

        let produced = out.len() - start;
        if produced > MAX_BLOCK_SIZE {
            out.truncate(start);
            return Err(CompressionError::ChunkTooLarge { have: produced, max: MAX_BLOCK_SIZE });
        }
        Ok(())
    }
}
