//! Remote push queue.
//!
//! Bounded queue plus a worker task that drains it and runs each
//! deferred [`RemotePush`]. Saturation policy is drop-newest: when the
//! queue is full the push is dropped and counted, and the caller is
//! never blocked. A dropped push only delays eventual population of
//! the shared tier; the next miss repopulates it.

use metrics::counter;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::remote::RemotePush;
use crate::telemetry::METRIC_PUSH_DROPPED;

/// Producer half of the push queue.
///
/// Dropping every clone closes the channel and lets the worker finish
/// draining what was already queued.
pub struct PushQueue {
    tx: mpsc::Sender<RemotePush>,
}

impl PushQueue {
    /// Spawn the worker on `handle` and return the queue plus the
    /// worker's join handle for orderly shutdown.
    pub fn spawn(handle: &Handle, depth: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<RemotePush>(depth.max(1));
        let worker = handle.spawn(async move {
            while let Some(push) = rx.recv().await {
                // Outcome accounting happens inside the push itself.
                let _ = push.run().await;
            }
        });
        (Self { tx }, worker)
    }

    /// Hand a push to the worker. Returns false when the push was
    /// dropped because the queue is full or closed.
    pub fn enqueue(&self, push: RemotePush) -> bool {
        match self.tx.try_send(push) {
            Ok(()) => true,
            Err(TrySendError::Full(push)) => {
                warn!(fingerprint = %push.fingerprint(), "push queue full, dropping remote push");
                counter!(METRIC_PUSH_DROPPED).increment(1);
                false
            }
            Err(TrySendError::Closed(push)) => {
                warn!(fingerprint = %push.fingerprint(), "push queue closed, dropping remote push");
                counter!(METRIC_PUSH_DROPPED).increment(1);
                false
            }
        }
    }
}
