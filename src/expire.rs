//! One-shot delayed actions.
//!
//! Process-wide facility used by the memory tier to expire entries.
//! Scheduled actions run on the runtime independently of the caller
//! that registered them and must tolerate running concurrently with
//! ordinary tier operations.

use std::time::Duration;

use tokio::runtime::Handle;

/// Runs an action once after a delay, on a shared tokio runtime.
///
/// There is no cancellation: once scheduled, an action fires. Callers
/// make their actions idempotent instead of cancelling stale ones.
#[derive(Clone)]
pub struct ExpiryScheduler {
    handle: Handle,
}

impl ExpiryScheduler {
    /// Create a scheduler that spawns onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Run `action` once, `delay` from now.
    pub fn after<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
    }
}
