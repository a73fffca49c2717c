use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::compression::CompressionError;
use crate::stream::container::ContainerError;
use crate::stream::queue::QueueError;

/// Coarse classification of a stage fault, used for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Source read / target write failure, or malformed container data.
    Io,
    /// Codec failure on a given block.
    Transform,
    /// Invalid settings.
    Configuration,
    /// Misuse of a pipeline primitive or a panicking worker.
    Internal,
    /// Cancellation observed with no underlying fault.
    Cancelled,
}

/// A fault captured by one stage and recorded in the run's lifecycle.
///
/// Faults are `Clone` so the lifecycle can hand out snapshot copies; I/O errors are
/// shared behind an `Arc` for that reason.
#[derive(Debug, Clone, Error)]
pub enum Fault {
    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),

    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    #[error("transform failed on block {index}: {source}")]
    Transform {
        index: u32,
        #[source]
        source: CompressionError,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("queue misuse: {0}")]
    Queue(QueueError),

    #[error("duplicate block {index} (next expected {next_expected})")]
    DuplicateBlock { index: u32, next_expected: u64 },

    #[error("reassembly gap: expected block {next_expected}, {pending} block(s) still pending (lowest {lowest})")]
    ReassemblyGap {
        next_expected: u64,
        pending: usize,
        lowest: u32,
    },

    #[error("block index overflow: source has more than {max} blocks")]
    IndexOverflow { max: u64 },

    #[error("worker {worker} panicked: {message}")]
    WorkerPanicked { worker: String, message: String },

    #[error("cancelled")]
    Cancelled,
}

impl Fault {
    pub fn kind(&self) -> FaultKind {
        match self {
            Fault::Io(_)
            | Fault::Container(_)
            | Fault::DuplicateBlock { .. }
            | Fault::ReassemblyGap { .. }
            | Fault::IndexOverflow { .. } => FaultKind::Io,
            Fault::Transform { .. } => FaultKind::Transform,
            Fault::Configuration(_) => FaultKind::Configuration,
            Fault::Queue(_) | Fault::WorkerPanicked { .. } => FaultKind::Internal,
            Fault::Cancelled => FaultKind::Cancelled,
        }
    }
}

impl From<io::Error> for Fault {
    fn from(e: io::Error) -> Self {
        Fault::Io(Arc::new(e))
    }
}

/// Terminal failure of a whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Rejected before any worker started.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Opening the source or target failed before any worker started.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// One or more stages faulted; every recorded fault, in capture order.
    #[error("{}", describe_faults(.0))]
    Faulted(Vec<Fault>),

    /// Cancellation was requested and no stage faulted.
    #[error("cancelled by user")]
    Cancelled,
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }

    /// Recorded faults, empty for setup failures and cancellation.
    pub fn faults(&self) -> &[Fault] {
        match self {
            PipelineError::Faulted(faults) => faults,
            _ => &[],
        }
    }
}

impl From<Fault> for PipelineError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Configuration(msg) => PipelineError::Configuration(msg),
            Fault::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Faulted(vec![other]),
        }
    }
}

fn describe_faults(faults: &[Fault]) -> String {
    let mut out = format!(
        "failed with {} error{}",
        faults.len(),
        if faults.len() == 1 { "" } else { "s" }
    );
    for (i, fault) in faults.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, fault));
    }
    out
}
