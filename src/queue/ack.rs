//! Acknowledgment guard.
//!
//! Slash commands must be acknowledged within the platform's response
//! window (a few seconds). Queue wait time is unbounded, so the "processing"
//! signal is sent before the task is appended, never after it is dequeued.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::queue::invocation::Invocation;
use crate::Result;

/// Once-flag embedded in every invocation.
///
/// The flag is set only after an acknowledgment was delivered. The gate
/// serializes senders, so a caller that arrives while a send is in flight
/// waits for its outcome instead of assuming success.
#[derive(Debug, Default)]
pub struct AckState {
    acknowledged: AtomicBool,
    gate: Mutex<()>,
}

impl AckState {
    /// Create an unacknowledged state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an acknowledgment has been delivered.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::Acquire)
    }

    /// Mark the invocation as acknowledged by caller-side logic.
    pub fn mark_acknowledged(&self) {
        self.acknowledged.store(true, Ordering::Release);
    }
}

/// Send the "processing" acknowledgment unless one was already delivered.
///
/// Once delivered, further calls on the same invocation are no-ops. Calls
/// made while a send is in flight wait for it; if it failed, the next
/// waiter makes its own attempt.
///
/// # Errors
///
/// Propagates the invocation's acknowledgment error unchanged; the caller
/// must not enqueue the task in that case.
pub async fn acknowledge(invocation: &dyn Invocation) -> Result<()> {
    let state = invocation.ack_state();
    if state.is_acknowledged() {
        debug!(invocation = invocation.id(), "already acknowledged");
        return Ok(());
    }

    let _sending = state.gate.lock().await;
    if state.is_acknowledged() {
        debug!(invocation = invocation.id(), "acknowledged while waiting");
        return Ok(());
    }

    match invocation.send_ack().await {
        Ok(()) => {
            state.mark_acknowledged();
            debug!(invocation = invocation.id(), "acknowledged");
            Ok(())
        }
        Err(err) => {
            warn!(invocation = invocation.id(), %err, "acknowledgment failed");
            Err(err)
        }
    }
}
