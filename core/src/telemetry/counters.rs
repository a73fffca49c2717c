//! telemetry/counters.rs
//! Mutable counters used during a pipeline run.
//!
//! Converted into an immutable `TelemetrySnapshot` at pipeline end.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Deterministic counters collected by the stage workers
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub blocks_read: u64,
    pub bytes_read: u64,
    pub blocks_transformed: u64,
    pub bytes_transformed_in: u64,
    pub bytes_transformed_out: u64,
    pub blocks_written: u64,
    pub bytes_written: u64,
}

impl TelemetryCounters {
    /// Record one block produced by the source reader.
    pub fn add_read(&mut self, payload_len: usize) {
        self.blocks_read += 1;
        self.bytes_read += payload_len as u64;
    }

    /// Record one block passed through a transform.
    ///
    /// - `in_len`: payload length before the transform
    /// - `out_len`: payload length after the transform
    pub fn add_transform(&mut self, in_len: usize, out_len: usize) {
        self.blocks_transformed += 1;
        self.bytes_transformed_in += in_len as u64;
        self.bytes_transformed_out += out_len as u64;
    }

    /// Record one block handed to the target writer.
    pub fn add_write(&mut self, payload_len: usize) {
        self.blocks_written += 1;
        self.bytes_written += payload_len as u64;
    }

    // Workers keep private counters; no locks or atomics in the block loop.
    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.blocks_read += other.blocks_read;
        self.bytes_read += other.bytes_read;
        self.blocks_transformed += other.blocks_transformed;
        self.bytes_transformed_in += other.bytes_transformed_in;
        self.bytes_transformed_out += other.bytes_transformed_out;
        self.blocks_written += other.blocks_written;
        self.bytes_written += other.bytes_written;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
