//! LZ4 block API via lz4_flex. No levels; each block is compressed independently.

use super::{split_checked, verify_decoded, write_checked};
use crate::compression::types::{CompressionError, Compressor, Decompressor};

pub struct Lz4Compressor;

impl Lz4Compressor {
    pub fn new() -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Compressor for Lz4Compressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = lz4_flex::block::compress(input);
        write_checked(input, &compressed, out);
        Ok(())
    }
}

pub struct Lz4Decompressor;

impl Lz4Decompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for Lz4Decompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let payload = split_checked("lz4", input)?;

        let decompressed = lz4_flex::block::decompress(payload.body, payload.orig_len)
            .map_err(|e| CompressionError::process("lz4", e))?;

        verify_decoded("lz4", &payload, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
