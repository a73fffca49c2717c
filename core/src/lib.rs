//! blockzip-core
//!
//! Parallel block compression engine: a file is split into fixed-size blocks,
//! each block is compressed or decompressed by one of N worker threads, and the
//! results are written out in original order.
//! No CLI, no logger setup: the process boundary lives in `blockzip-cli`.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

pub mod compression;
pub mod telemetry;

// Pipeline layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::CompressionCodec;
    pub use crate::config::{Mode, PipelineConfig};
    pub use crate::stream::{
        compress, decompress, Block, BlockTransform, CancelHandle, InputSource, OutputSink,
        Pipeline, RunReport, SourceReader, TargetWriter,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{Fault, FaultKind, PipelineError};
}
