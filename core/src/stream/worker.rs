//! stream/worker.rs
//! Stage capabilities and the single worker loop that drives all of them.
//!
//! Every stage is the same loop: pull a block from an inlet, optionally transform
//! it, push it to an outlet. Only the inlet/outlet/transform objects differ:
//!
//! | stage     | inlet                  | transform | outlet                 |
//! |-----------|------------------------|-----------|------------------------|
//! | reader    | `Inlet::Source`        | none      | `Outlet::Queue` (in)   |
//! | transform | `Inlet::Queue` (in)    | codec     | `Outlet::Queue` (out)  |
//! | writer    | `Inlet::Queue` (out)   | none      | `Outlet::Target`       |

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, error, info};
use parking_lot::Mutex;

use crate::stream::block::Block;
use crate::stream::lifecycle::Lifecycle;
use crate::stream::queue::{BoundedQueue, QueueError};
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::Fault;

/// Produces blocks in source order. `Ok(None)` is end-of-stream.
pub trait SourceReader: Send {
    fn try_read_block(&mut self) -> Result<Option<Block>, Fault>;
}

/// Maps one block to a new block with the same index.
pub trait BlockTransform: Send {
    fn transform(&mut self, block: Block) -> Result<Block, Fault>;

    /// Stage this transform's busy time is accounted under.
    fn stage(&self) -> Stage;
}

/// Consumes blocks in arrival order.
pub trait TargetWriter: Send {
    fn write_block(&mut self, block: Block) -> Result<(), Fault>;

    /// Called once after the inlet reports end-of-stream.
    fn finish(&mut self) -> Result<(), Fault> {
        Ok(())
    }
}

pub enum Inlet {
    Source(Box<dyn SourceReader>),
    Queue(Arc<BoundedQueue<Block>>),
}

pub enum Outlet {
    Queue(Arc<BoundedQueue<Block>>),
    Target(Box<dyn TargetWriter>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Running,
    Completed,
    Faulted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    Completed,
    Faulted,
    Cancelled,
}

impl From<WorkerOutcome> for WorkerState {
    fn from(outcome: WorkerOutcome) -> Self {
        match outcome {
            WorkerOutcome::Completed => WorkerState::Completed,
            WorkerOutcome::Faulted => WorkerState::Faulted,
            WorkerOutcome::Cancelled => WorkerState::Cancelled,
        }
    }
}

/// Returned by `Worker::join`; telemetry is merged by the pipeline.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub name: String,
    pub outcome: WorkerOutcome,
    pub counters: TelemetryCounters,
    pub stage_times: StageTimes,
}

/// Why one pass of the loop stopped early.
#[derive(Debug)]
enum StepError {
    Cancelled,
    Fault(Fault),
}

impl From<Fault> for StepError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Cancelled => StepError::Cancelled,
            other => StepError::Fault(other),
        }
    }
}

impl From<QueueError> for StepError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Cancelled => StepError::Cancelled,
            other => StepError::Fault(Fault::Queue(other)),
        }
    }
}

struct Job {
    inlet: Inlet,
    transform: Option<Box<dyn BlockTransform>>,
    outlet: Outlet,
}

pub struct Worker {
    name: String,
    job: Option<Job>,
    lifecycle: Arc<Lifecycle>,
    state: Arc<Mutex<WorkerState>>,
    handle: Option<JoinHandle<WorkerReport>>,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        inlet: Inlet,
        transform: Option<Box<dyn BlockTransform>>,
        outlet: Outlet,
        lifecycle: Arc<Lifecycle>,
    ) -> Self {
        Self {
            name: name.into(),
            job: Some(Job { inlet, transform, outlet }),
            lifecycle,
            state: Arc::new(Mutex::new(WorkerState::Created)),
            handle: None,
        }
    }

    pub fn reader(source: Box<dyn SourceReader>, output: Arc<BoundedQueue<Block>>, lifecycle: Arc<Lifecycle>) -> Self {
        Self::new("READER", Inlet::Source(source), None, Outlet::Queue(output), lifecycle)
    }

    pub fn transformer(
        id: usize,
        transform: Box<dyn BlockTransform>,
        input: Arc<BoundedQueue<Block>>,
        output: Arc<BoundedQueue<Block>>,
        lifecycle: Arc<Lifecycle>,
    ) -> Self {
        Self::new(
            format!("WORKER-{id}"),
            Inlet::Queue(input),
            Some(transform),
            Outlet::Queue(output),
            lifecycle,
        )
    }

    pub fn writer(input: Arc<BoundedQueue<Block>>, target: Box<dyn TargetWriter>, lifecycle: Arc<Lifecycle>) -> Self {
        Self::new("WRITER", Inlet::Queue(input), None, Outlet::Target(target), lifecycle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// Spawn the worker thread. A worker can be started once.
    pub fn start(&mut self) -> Result<(), Fault> {
        let job = self
            .job
            .take()
            .ok_or_else(|| Fault::Configuration(format!("worker {} already started", self.name)))?;

        let name = self.name.clone();
        let lifecycle = self.lifecycle.clone();
        let state = self.state.clone();
        *state.lock() = WorkerState::Running;

        let spawned = thread::Builder::new()
            .name(name.to_lowercase())
            .spawn(move || run_job(name, job, &lifecycle, &state));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                *self.state.lock() = WorkerState::Faulted;
                Err(Fault::from(e))
            }
        }
    }

    /// Block until the worker thread exits. `None` if it was never started.
    pub fn join(&mut self) -> Option<WorkerReport> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(report) => Some(report),
            Err(payload) => {
                // Panics are caught in `run_job`; this only covers a panicking logger.
                let fault = Fault::WorkerPanicked {
                    worker: self.name.clone(),
                    message: panic_message(payload.as_ref()),
                };
                self.lifecycle.on_error(fault);
                *self.state.lock() = WorkerState::Faulted;
                Some(WorkerReport {
                    name: self.name.clone(),
                    outcome: WorkerOutcome::Faulted,
                    counters: TelemetryCounters::default(),
                    stage_times: StageTimes::default(),
                })
            }
        }
    }
}

fn run_job(name: String, mut job: Job, lifecycle: &Lifecycle, state: &Mutex<WorkerState>) -> WorkerReport {
    let mut counters = TelemetryCounters::default();
    let mut times = StageTimes::default();
    debug!("[{name}] starting");

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        drive(&name, &mut job, lifecycle, &mut counters, &mut times)
    }));

    let outcome = match result {
        Ok(Ok(())) => WorkerOutcome::Completed,
        Ok(Err(StepError::Cancelled)) => WorkerOutcome::Cancelled,
        Ok(Err(StepError::Fault(fault))) => {
            error!("[{name}] {fault}");
            lifecycle.on_error(fault);
            WorkerOutcome::Faulted
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("[{name}] panicked: {message}");
            lifecycle.on_error(Fault::WorkerPanicked { worker: name.clone(), message });
            WorkerOutcome::Faulted
        }
    };

    *state.lock() = outcome.into();
    info!("[{name}] finished: {outcome:?}");
    WorkerReport { name, outcome, counters, stage_times: times }
}

fn drive(
    name: &str,
    job: &mut Job,
    lifecycle: &Lifecycle,
    counters: &mut TelemetryCounters,
    times: &mut StageTimes,
) -> Result<(), StepError> {
    loop {
        if lifecycle.is_cancelled() {
            return Err(StepError::Cancelled);
        }

        let block = match &mut job.inlet {
            Inlet::Source(source) => {
                let t0 = Instant::now();
                let next = source.try_read_block()?;
                times.add(Stage::Read, t0.elapsed());
                if let Some(block) = &next {
                    counters.add_read(block.len());
                }
                next
            }
            Inlet::Queue(queue) => queue.try_dequeue()?,
        };

        let Some(block) = block else {
            debug!("[{name}] end of stream");
            break;
        };

        let block = match &mut job.transform {
            Some(transform) => {
                let in_len = block.len();
                let t0 = Instant::now();
                let out = transform.transform(block)?;
                times.add(transform.stage(), t0.elapsed());
                counters.add_transform(in_len, out.len());
                debug!("[{name}] block {} {} -> {} bytes", out.index, in_len, out.len());
                out
            }
            None => block,
        };

        match &mut job.outlet {
            Outlet::Queue(queue) => queue.enqueue(block)?,
            Outlet::Target(target) => {
                let len = block.len();
                let t0 = Instant::now();
                target.write_block(block)?;
                times.add(Stage::Write, t0.elapsed());
                counters.add_write(len);
            }
        }
    }

    match &mut job.outlet {
        Outlet::Queue(queue) => queue.mark_producer_done()?,
        Outlet::Target(target) => {
            let t0 = Instant::now();
            target.finish()?;
            times.add(Stage::Write, t0.elapsed());
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
