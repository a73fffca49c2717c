//! stream/pipeline.rs
//! Pure pipeline wiring (no codec logic).
//!
//! ```text
//! source ─▶ [READER] ─▶ input queue ─▶ [WORKER-0..N] ─▶ output queue ─▶ [WRITER] ─▶ target
//! ```
//!
//! The input queue has one producer (the reader); the output queue has N (one per
//! transform worker), so the writer only sees end-of-stream after every worker
//! has drained the input queue.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};

use crate::config::Mode;
use crate::stream::block::Block;
use crate::stream::lifecycle::{CancelHandle, Lifecycle, RunOutcome};
use crate::stream::queue::BoundedQueue;
use crate::stream::worker::{BlockTransform, SourceReader, TargetWriter, Worker, WorkerReport};
use crate::telemetry::{TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{Fault, PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Assembled,
    Started,
    Draining,
    Succeeded,
    Faulted,
    Cancelled,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Faulted | PipelineState::Cancelled)
    }
}

pub struct Pipeline {
    mode: Mode,
    lifecycle: Arc<Lifecycle>,
    reader: Worker,
    transforms: Vec<Worker>,
    writer: Worker,
    state: PipelineState,
    timer: TelemetryTimer,
    remove_on_failure: Option<PathBuf>,
}

impl Pipeline {
    /// Wire one reader, `transforms.len()` transform workers and one writer.
    pub fn assemble(
        mode: Mode,
        source: Box<dyn SourceReader>,
        transforms: Vec<Box<dyn BlockTransform>>,
        target: Box<dyn TargetWriter>,
        queue_capacity: usize,
    ) -> Result<Self, Fault> {
        Self::assemble_with(Arc::new(Lifecycle::new()), mode, source, transforms, target, queue_capacity)
    }

    /// As `assemble`, sharing an existing lifecycle.
    pub fn assemble_with(
        lifecycle: Arc<Lifecycle>,
        mode: Mode,
        source: Box<dyn SourceReader>,
        transforms: Vec<Box<dyn BlockTransform>>,
        target: Box<dyn TargetWriter>,
        queue_capacity: usize,
    ) -> Result<Self, Fault> {
        if transforms.is_empty() {
            return Err(Fault::Configuration("at least one transform worker is required".into()));
        }

        let workers = transforms.len();
        let input = BoundedQueue::<Block>::new(queue_capacity, 1, lifecycle.token())?;
        let output = BoundedQueue::<Block>::new(queue_capacity, workers, lifecycle.token())?;

        let reader = Worker::reader(source, input.clone(), lifecycle.clone());
        let transforms = transforms
            .into_iter()
            .enumerate()
            .map(|(i, t)| Worker::transformer(i, t, input.clone(), output.clone(), lifecycle.clone()))
            .collect();
        let writer = Worker::writer(output, target, lifecycle.clone());

        info!("[PIPELINE] assembled {mode}: {workers} workers, queue capacity {queue_capacity}");

        Ok(Self {
            mode,
            lifecycle,
            reader,
            transforms,
            writer,
            state: PipelineState::Assembled,
            timer: TelemetryTimer::new(),
            remove_on_failure: None,
        })
    }

    /// Delete `path` if the run ends Faulted or Cancelled.
    pub fn remove_on_failure(&mut self, path: PathBuf) {
        self.remove_on_failure = Some(path);
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.lifecycle.clone())
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn worker_count(&self) -> usize {
        self.transforms.len()
    }

    /// Spawn every worker. A spawn failure is recorded and cancels the run;
    /// `wait` still joins whatever did start.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.state != PipelineState::Assembled {
            return Err(PipelineError::Configuration(format!(
                "pipeline cannot start from state {:?}",
                self.state
            )));
        }
        self.timer = TelemetryTimer::new();
        self.state = PipelineState::Started;

        // Consumers first, so the reader never fills a queue nobody drains.
        let workers = std::iter::once(&mut self.writer)
            .chain(self.transforms.iter_mut())
            .chain(std::iter::once(&mut self.reader));
        for worker in workers {
            if let Err(fault) = worker.start() {
                error!("[PIPELINE] failed to start {}: {fault}", worker.name());
                self.lifecycle.on_error(fault);
                break;
            }
        }
        Ok(())
    }

    /// Join every worker (reader, transforms, writer) and classify the run.
    pub fn wait(&mut self) -> Result<TelemetrySnapshot, PipelineError> {
        match self.state {
            PipelineState::Assembled => self.start()?,
            PipelineState::Started => {}
            other => {
                return Err(PipelineError::Configuration(format!(
                    "pipeline cannot wait from state {other:?}"
                )))
            }
        }
        self.state = PipelineState::Draining;

        let mut reports: Vec<WorkerReport> = Vec::with_capacity(self.transforms.len() + 2);
        reports.extend(self.reader.join());
        for worker in &mut self.transforms {
            reports.extend(worker.join());
        }
        reports.extend(self.writer.join());
        self.timer.finish();

        let mut counters = TelemetryCounters::default();
        for report in &reports {
            counters.merge(&report.counters);
            self.timer.stage_times.merge(&report.stage_times);
        }

        match self.lifecycle.classify() {
            RunOutcome::Succeeded => {
                self.state = PipelineState::Succeeded;
                let snapshot = TelemetrySnapshot::from(self.mode, self.transforms.len(), &counters, &self.timer);
                info!(
                    "[PIPELINE] {} finished: {} blocks, {} -> {} bytes in {:?}",
                    self.mode,
                    counters.blocks_written,
                    counters.bytes_transformed_in,
                    counters.bytes_transformed_out,
                    snapshot.elapsed
                );
                Ok(snapshot)
            }
            RunOutcome::Faulted(faults) => {
                self.state = PipelineState::Faulted;
                error!("[PIPELINE] {} failed with {} fault(s)", self.mode, faults.len());
                self.discard_target();
                Err(PipelineError::Faulted(faults))
            }
            RunOutcome::Cancelled => {
                self.state = PipelineState::Cancelled;
                warn!("[PIPELINE] {} cancelled", self.mode);
                self.discard_target();
                Err(PipelineError::Cancelled)
            }
        }
    }

    pub fn run(&mut self) -> Result<TelemetrySnapshot, PipelineError> {
        self.start()?;
        self.wait()
    }

    fn discard_target(&mut self) {
        if let Some(path) = self.remove_on_failure.take() {
            match fs::remove_file(&path) {
                Ok(()) => info!("[PIPELINE] removed partial output {}", path.display()),
                Err(e) => warn!("[PIPELINE] could not remove partial output {}: {e}", path.display()),
            }
        }
    }
}

impl Drop for Pipeline {
    // Never leave worker threads blocked on queues nobody will drain.
    fn drop(&mut self) {
        if !self.state.is_terminal() && self.state != PipelineState::Assembled {
            self.lifecycle.cancel();
            self.reader.join();
            for worker in &mut self.transforms {
                worker.join();
            }
            self.writer.join();
        }
    }
}
