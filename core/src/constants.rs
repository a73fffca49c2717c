//! Defaults and hard limits shared by the pipeline, the container and the CLI.

/// Defaults when a config field is not supplied
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024; // 1 MiB
pub const DEFAULT_QUEUE_CAPACITY: usize = 100; // blocks per hop

/// Max block size sanity bound (512 MiB).
/// Also caps the decompressed size of a single block.
pub const MAX_BLOCK_SIZE: usize = 512 * 1024 * 1024;

/// Upper bound on transform workers accepted by config validation.
pub const MAX_WORKERS: usize = 1024;

/// Largest payload a container record may declare (1 GiB).
/// Compressed output of an incompressible block is slightly larger than the block
/// itself, so this sits well above `MAX_BLOCK_SIZE`.
pub const MAX_RECORD_LEN: u32 = 1024 * 1024 * 1024;

/// Default compression levels (balanced).
pub const DEFAULT_LEVEL_GZIP: u32 = 6;
pub const DEFAULT_LEVEL_ZLIB: u32 = 6;
pub const DEFAULT_LEVEL_ZSTD: i32 = 6;
