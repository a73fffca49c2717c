//! Codec-backed block transforms, one instance per transform worker.

use crate::compression::{
    create_compressor, create_decompressor, CompressionCodec, Compressor, Decompressor,
};
use crate::config::Mode;
use crate::stream::block::Block;
use crate::stream::worker::BlockTransform;
use crate::telemetry::Stage;
use crate::types::Fault;

pub struct CompressTransform {
    compressor: Box<dyn Compressor + Send>,
}

impl CompressTransform {
    pub fn new(codec: CompressionCodec, level: Option<i32>) -> Result<Self, Fault> {
        let compressor =
            create_compressor(codec, level).map_err(|e| Fault::Configuration(e.to_string()))?;
        Ok(Self { compressor })
    }
}

impl BlockTransform for CompressTransform {
    fn transform(&mut self, block: Block) -> Result<Block, Fault> {
        let mut out = Vec::with_capacity(block.len() / 2 + 64);
        self.compressor
            .compress_chunk(&block.payload, &mut out)
            .map_err(|source| Fault::Transform { index: block.index, source })?;
        Ok(block.with_payload(out))
    }

    fn stage(&self) -> Stage {
        Stage::Compress
    }
}

pub struct DecompressTransform {
    decompressor: Box<dyn Decompressor + Send>,
}

impl DecompressTransform {
    pub fn new(codec: CompressionCodec) -> Result<Self, Fault> {
        let decompressor =
            create_decompressor(codec).map_err(|e| Fault::Configuration(e.to_string()))?;
        Ok(Self { decompressor })
    }
}

impl BlockTransform for DecompressTransform {
    fn transform(&mut self, block: Block) -> Result<Block, Fault> {
        let mut out = Vec::with_capacity(block.len().saturating_mul(2));
        self.decompressor
            .decompress_chunk(&block.payload, &mut out)
            .map_err(|source| Fault::Transform { index: block.index, source })?;
        Ok(block.with_payload(out))
    }

    fn stage(&self) -> Stage {
        Stage::Decompress
    }
}

/// Build `count` independent transforms for `mode`.
pub fn make_transforms(
    mode: Mode,
    codec: CompressionCodec,
    level: Option<i32>,
    count: usize,
) -> Result<Vec<Box<dyn BlockTransform>>, Fault> {
    (0..count)
        .map(|_| {
            let transform: Box<dyn BlockTransform> = match mode {
                Mode::Compress => Box::new(CompressTransform::new(codec, level)?),
                Mode::Decompress => Box::new(DecompressTransform::new(codec)?),
            };
            Ok(transform)
        })
        .collect()
}
