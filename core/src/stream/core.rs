//! Stable public API: compress/decompress between any input source and output sink.

use crate::config::{Mode, PipelineConfig};
use crate::stream::io::{
    check_distinct, open_input, open_output, BlockFileReader, ContainerReader, ContainerWriter,
    InputSource, OrderedBlockWriter, OutputSink,
};
use crate::stream::lifecycle::CancelHandle;
use crate::stream::pipeline::Pipeline;
use crate::stream::transform::make_transforms;
use crate::stream::worker::{SourceReader, TargetWriter};
use crate::telemetry::TelemetrySnapshot;
use crate::types::PipelineError;

use parking_lot::Mutex;
use std::sync::Arc;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub telemetry: TelemetrySnapshot,
    /// Output bytes, only for `OutputSink::Memory`.
    pub output: Option<Vec<u8>>,
}

/// A fully wired run that has not started yet.
///
/// Use this when a cancel handle is needed before the run blocks the caller.
pub struct PreparedRun {
    pipeline: Pipeline,
    buffer: Option<Arc<Mutex<Vec<u8>>>>,
}

impl PreparedRun {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.pipeline.cancel_handle()
    }

    pub fn run(mut self) -> Result<RunReport, PipelineError> {
        let telemetry = self.pipeline.run()?;
        let output = self.buffer.take().map(|buf| std::mem::take(&mut *buf.lock()));
        Ok(RunReport { telemetry, output })
    }
}

/// Validate `config`, open both ends and wire the pipeline for `mode`.
///
/// The target is opened last, so a setup failure never leaves an empty file behind.
pub fn prepare(
    mode: Mode,
    input: InputSource,
    output: OutputSink,
    config: &PipelineConfig,
) -> Result<PreparedRun, PipelineError> {
    config.validate()?;
    check_distinct(&input, &output)?;

    let reader = open_input(input)?;
    let source: Box<dyn SourceReader> = match mode {
        Mode::Compress => Box::new(BlockFileReader::new(reader, config.block_size)),
        Mode::Decompress => Box::new(ContainerReader::new(reader)),
    };
    let transforms = make_transforms(mode, config.codec, config.level, config.profile.workers)?;

    let opened = open_output(output, config.overwrite)?;
    let target: Box<dyn TargetWriter> = match mode {
        Mode::Compress => Box::new(ContainerWriter::new(opened.writer)),
        Mode::Decompress => Box::new(OrderedBlockWriter::new(opened.writer)),
    };

    let assembled = Pipeline::assemble(mode, source, transforms, target, config.profile.queue_capacity);
    let mut pipeline = match assembled {
        Ok(p) => p,
        Err(fault) => {
            if let Some(path) = &opened.created_file {
                let _ = std::fs::remove_file(path);
            }
            return Err(fault.into());
        }
    };
    if let Some(path) = opened.created_file {
        pipeline.remove_on_failure(path);
    }

    Ok(PreparedRun { pipeline, buffer: opened.buffer })
}

/// Split `input` into blocks, compress them in parallel and write a container.
pub fn compress(input: InputSource, output: OutputSink, config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    prepare(Mode::Compress, input, output, config)?.run()
}

/// Read a container, decompress its blocks in parallel and write them back in order.
pub fn decompress(input: InputSource, output: OutputSink, config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    prepare(Mode::Decompress, input, output, config)?.run()
}
