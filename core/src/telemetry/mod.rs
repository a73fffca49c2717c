//! telemetry/mod.rs
//! Counters, stage timers and the immutable snapshot returned by a run.
//!
//! Each worker owns its own counters and merges them into the run total on join.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
