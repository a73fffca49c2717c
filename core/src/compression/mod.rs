//! compression/mod.rs
//! Per-block compression and decompression backends.
//!
//! Notes:
//! - Every block is compressed independently, so any worker can handle any block.
//! - The registry resolves a `CompressionCodec` to a boxed implementation.
//! - The container carries no codec id: both directions must agree on the codec.

pub mod types;
pub mod registry;
pub mod codecs;

pub use types::*;
pub use registry::*;
