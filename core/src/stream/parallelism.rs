use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_QUEUE_CAPACITY;

/// Parallelism configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelismProfile {
    /// Transform worker threads.
    pub workers: usize,
    /// Max in-flight blocks per queue hop.
    pub queue_capacity: usize,
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self {
            workers: 1,
            queue_capacity: 1,
        }
    }

    /// One transform worker per logical CPU.
    pub fn dynamic() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self { workers, queue_capacity }
    }
}

impl Default for ParallelismProfile {
    fn default() -> Self {
        Self::dynamic()
    }
}
