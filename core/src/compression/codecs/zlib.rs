//! Zlib (deflate) via flate2, wrapped in the length + checksum layout.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use super::{split_checked, verify_decoded, write_checked};
use crate::compression::types::{CompressionError, Compressor, Decompressor};

pub struct ZlibCompressor {
    level: Compression,
}

impl ZlibCompressor {
    pub fn new(level: u32) -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self { level: Compression::new(level) }))
    }
}

impl Compressor for ZlibCompressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // Encode this block as its own zlib stream
        let mut enc = ZlibEncoder::new(Vec::new(), self.level);
        enc.write_all(input).map_err(|e| CompressionError::process("zlib", e))?;
        let compressed = enc.finish().map_err(|e| CompressionError::process("zlib", e))?;

        write_checked(input, &compressed, out);
        Ok(())
    }
}

pub struct ZlibDecompressor;

impl ZlibDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for ZlibDecompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let payload = split_checked("zlib", input)?;

        let mut decompressed = Vec::with_capacity(payload.orig_len);
        ZlibDecoder::new(payload.body)
            .take(payload.orig_len as u64 + 1)
            .read_to_end(&mut decompressed)
            .map_err(|e| CompressionError::process("zlib", e))?;

        verify_decoded("zlib", &payload, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
