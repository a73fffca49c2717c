//! telemetry/snapshot.rs
//! Immutable telemetry for a finished run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

/// Captures counters, ratio, throughput, stage timings and elapsed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub mode: Mode,
    pub workers: usize,
    pub counters: TelemetryCounters,
    /// Compressed bytes over uncompressed bytes, whichever direction ran.
    pub compression_ratio: f64,
    /// Uncompressed bytes per second of wall-clock time.
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(mode: Mode, workers: usize, counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let (uncompressed, compressed) = match mode {
            Mode::Compress => (counters.bytes_transformed_in, counters.bytes_transformed_out),
            Mode::Decompress => (counters.bytes_transformed_out, counters.bytes_transformed_in),
        };

        let compression_ratio = if uncompressed > 0 {
            compressed as f64 / uncompressed as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            uncompressed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            mode,
            workers,
            counters: counters.clone(),
            compression_ratio,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Every block read was transformed and written.
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        c.blocks_read == c.blocks_transformed
            && c.blocks_transformed == c.blocks_written
            && c.bytes_transformed_out == c.bytes_written
    }

    /// Bytes handed to the target writer (payloads only, no record headers).
    pub fn output_bytes(&self) -> u64 {
        self.counters.bytes_written
    }
}
