//! config.rs
//! Run configuration: block size, parallelism, codec selection.
//!
//! Every field has a serde default so a partial JSON file is accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compression::{resolve_level, CompressionCodec};
use crate::constants::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MAX_WORKERS};
use crate::types::Fault;

pub use crate::stream::parallelism::ParallelismProfile;

/// Direction of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Compress,
    Decompress,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mode::Compress => "compress",
            Mode::Decompress => "decompress",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Uncompressed bytes per block. Ignored when decompressing.
    pub block_size: usize,
    pub profile: ParallelismProfile,
    pub codec: CompressionCodec,
    /// Codec level; `None` picks the codec default.
    pub level: Option<i32>,
    /// Replace an existing target file instead of failing.
    pub overwrite: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            profile: ParallelismProfile::dynamic(),
            codec: CompressionCodec::default(),
            level: None,
            overwrite: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.profile.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.profile.queue_capacity = capacity;
        self
    }

    pub fn with_codec(mut self, codec: CompressionCodec, level: Option<i32>) -> Self {
        self.codec = codec;
        self.level = level;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Fault> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Fault::Configuration(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<(), Fault> {
        if self.block_size == 0 {
            return Err(Fault::Configuration("block size must be positive".into()));
        }
        if self.block_size > MAX_BLOCK_SIZE {
            return Err(Fault::Configuration(format!(
                "block size {} exceeds maximum {}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if self.profile.workers == 0 {
            return Err(Fault::Configuration("worker count must be positive".into()));
        }
        if self.profile.workers > MAX_WORKERS {
            return Err(Fault::Configuration(format!(
                "worker count {} exceeds maximum {}",
                self.profile.workers, MAX_WORKERS
            )));
        }
        if self.profile.queue_capacity == 0 {
            return Err(Fault::Configuration("queue capacity must be positive".into()));
        }
        resolve_level(self.codec, self.level).map_err(|e| Fault::Configuration(e.to_string()))?;
        Ok(())
    }
}
