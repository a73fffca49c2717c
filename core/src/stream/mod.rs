//! stream — parallel block pipeline.
//!
//! Layers, bottom up: `block` and `queue` primitives, the shared `lifecycle`,
//! the generic `worker` loop, concrete collaborators in `io` and `transform`,
//! `pipeline` wiring, and the `core` entry points.

pub mod block;
pub mod container;
pub mod core;
pub mod io;
pub mod lifecycle;
pub mod parallelism;
pub mod pipeline;
pub mod queue;
pub mod transform;
pub mod worker;

pub use block::Block;
pub use self::core::{compress, decompress, prepare, PreparedRun, RunReport};
pub use io::{InputSource, OutputSink};
pub use lifecycle::{CancelHandle, CancellationToken, Lifecycle};
pub use parallelism::ParallelismProfile;
pub use pipeline::{Pipeline, PipelineState};
pub use queue::{BoundedQueue, QueueError};
pub use worker::{BlockTransform, SourceReader, TargetWriter, Worker, WorkerOutcome, WorkerState};
