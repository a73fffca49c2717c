//! stream/queue.rs
//! Bounded blocking queue joining two adjacent stages.
//!
//! - `enqueue` blocks while the queue is full (backpressure).
//! - `try_dequeue` blocks while the queue is empty and still open.
//! - The queue closes once `producer_count` producers have called
//!   `mark_producer_done`; consumers then drain what is left and see `Ok(None)`.
//! - `abort` (or cancellation of the registered token) wakes every waiter with
//!   `QueueError::Cancelled`, whatever the producer state.
//!
//! All state lives under one mutex; the two condition variables are only ever
//! waited on with that mutex held.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

use crate::stream::lifecycle::{CancelListener, CancellationToken};
use crate::types::Fault;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("enqueue on a closed queue")]
    Closed,

    #[error("queue operation cancelled")]
    Cancelled,

    #[error("producer done signalled more than {producer_count} times")]
    ProducerOverflow { producer_count: usize },
}

struct QueueState<T> {
    items: VecDeque<T>,
    producers_done: usize,
    closed: bool,
    aborted: bool,
}

pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    producer_count: usize,
}

impl<T: Send + 'static> BoundedQueue<T> {
    /// Create a queue and register it with `token` so cancellation aborts it.
    pub fn new(
        capacity: usize,
        producer_count: usize,
        token: &CancellationToken,
    ) -> Result<Arc<Self>, Fault> {
        let queue = Arc::new(Self::unlinked(capacity, producer_count)?);
        let listener: Weak<dyn CancelListener> = Arc::downgrade(&queue) as Weak<dyn CancelListener>;
        token.register(listener);
        Ok(queue)
    }
}

impl<T> BoundedQueue<T> {
    /// Create a queue that only aborts through an explicit `abort()`.
    pub fn unlinked(capacity: usize, producer_count: usize) -> Result<Self, Fault> {
        if capacity == 0 {
            return Err(Fault::Configuration("queue capacity must be positive".into()));
        }
        if producer_count == 0 {
            return Err(Fault::Configuration("queue needs at least one producer".into()));
        }
        Ok(Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(1024)),
                producers_done: 0,
                closed: false,
                aborted: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            producer_count,
        })
    }

    /// Block until there is room, then append `item`.
    pub fn enqueue(&self, item: T) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        loop {
            if state.aborted {
                return Err(QueueError::Cancelled);
            }
            if state.closed {
                return Err(QueueError::Closed);
            }
            if state.items.len() < self.capacity {
                state.items.push_back(item);
                drop(state);
                self.not_empty.notify_one();
                return Ok(());
            }
            self.not_full.wait(&mut state);
        }
    }

    /// Block until an item is available or the queue is closed and drained.
    ///
    /// `Ok(None)` is end-of-stream.
    pub fn try_dequeue(&self) -> Result<Option<T>, QueueError> {
        let mut state = self.state.lock();
        loop {
            if state.aborted {
                return Err(QueueError::Cancelled);
            }
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Ok(Some(item));
            }
            if state.closed {
                return Ok(None);
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Called exactly once per producer. The last call closes the queue.
    pub fn mark_producer_done(&self) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        if state.producers_done >= self.producer_count {
            return Err(QueueError::ProducerOverflow { producer_count: self.producer_count });
        }
        state.producers_done += 1;
        if state.producers_done == self.producer_count {
            state.closed = true;
            drop(state);
            self.not_empty.notify_all();
            self.not_full.notify_all();
        }
        Ok(())
    }

    /// Force every current and future blocking call to fail with `Cancelled`.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        if state.aborted {
            return;
        }
        state.aborted = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn producer_count(&self) -> usize {
        self.producer_count
    }
}

impl<T: Send> CancelListener for BoundedQueue<T> {
    fn on_cancel(&self) {
        self.abort();
    }
}
