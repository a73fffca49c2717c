//! stream/lifecycle.rs
//! Shared cancellation and fault collection for one pipeline run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use log::{info, warn};
use parking_lot::Mutex;

use crate::types::Fault;

/// Woken once when the token it is registered with is cancelled.
pub trait CancelListener: Send + Sync {
    fn on_cancel(&self);
}

/// One-way cancellation flag that also wakes registered listeners.
///
/// Listeners are held weakly; a dropped queue simply stops being notified.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    listeners: Mutex<Vec<Weak<dyn CancelListener>>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Set the flag and notify listeners. Later calls are no-ops.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // Notify outside the lock: listeners take their own locks.
        let listeners: Vec<_> = self.listeners.lock().clone();
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.on_cancel();
        }
    }

    /// Register `listener`; it fires immediately if the token is already cancelled.
    pub fn register(&self, listener: Weak<dyn CancelListener>) {
        {
            let mut listeners = self.listeners.lock();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.push(listener.clone());
        }
        if self.is_cancelled() {
            if let Some(listener) = listener.upgrade() {
                listener.on_cancel();
            }
        }
    }
}

/// Terminal classification of a run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Succeeded,
    Faulted(Vec<Fault>),
    Cancelled,
}

/// Cancellation token plus the ordered list of faults captured by any stage.
#[derive(Default)]
pub struct Lifecycle {
    token: CancellationToken,
    faults: Mutex<Vec<Fault>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `fault`, then cancel the run.
    pub fn on_error(&self, fault: Fault) {
        warn!("[PIPELINE] fault recorded: {fault}");
        self.faults.lock().push(fault);
        self.token.cancel();
    }

    /// Cancel without recording a fault (external interrupt).
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            info!("[PIPELINE] cancellation requested");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Snapshot copy of the faults recorded so far, in capture order.
    pub fn faults(&self) -> Vec<Fault> {
        self.faults.lock().clone()
    }

    pub fn fault_count(&self) -> usize {
        self.faults.lock().len()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Faults win over cancellation; cancellation wins over success.
    pub fn classify(&self) -> RunOutcome {
        let faults = self.faults();
        if !faults.is_empty() {
            RunOutcome::Faulted(faults)
        } else if self.is_cancelled() {
            RunOutcome::Cancelled
        } else {
            RunOutcome::Succeeded
        }
    }
}

/// Cloneable handle that cancels a run from any thread (e.g. a signal handler).
#[derive(Clone)]
pub struct CancelHandle {
    lifecycle: Arc<Lifecycle>,
}

impl CancelHandle {
    pub(crate) fn new(lifecycle: Arc<Lifecycle>) -> Self {
        Self { lifecycle }
    }

    pub fn cancel(&self) {
        self.lifecycle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.lifecycle.is_cancelled()
    }
}
