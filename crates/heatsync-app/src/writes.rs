//! Ordered best-effort writes.
//!
//! Readiness and pointer writes are idempotent, but two writes to the same
//! key issued back to back must still land in issue order: a `not-ready`
//! overtaking the `ready` that followed it would leave the starter showing
//! a loaded lane as not ready. Every write goes through one queue drained
//! by a single task, one request at a time.

use std::sync::Arc;

use heatsync_core::Store;
use heatsync_proto::{LaneNumber, LaneReadiness, RacePointer};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Idempotent store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Write {
    Readiness { pointer: RacePointer, lane: LaneNumber, status: LaneReadiness },
    Pointer(RacePointer),
}

/// Sender side of the write queue. Failures are logged and dropped.
#[derive(Debug, Clone)]
pub(crate) struct WriteQueue {
    tx: mpsc::UnboundedSender<Write>,
}

impl WriteQueue {
    /// Spawn the draining task on the current runtime.
    pub(crate) fn spawn<S: Store>(store: Arc<S>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(write) = rx.recv().await {
                apply(store.as_ref(), write).await;
            }
        });
        Self { tx }
    }

    pub(crate) fn push(&self, write: Write) {
        if self.tx.send(write).is_err() {
            warn!("write queue closed, dropping write");
        }
    }
}

async fn apply<S: Store>(store: &S, write: Write) {
    match write {
        Write::Readiness { pointer, lane, status } => {
            match store.update_lane_status(&pointer, lane, status).await {
                Ok(()) => debug!(%lane, race = %pointer, status = status.as_wire(), "readiness written"),
                Err(e) => warn!(%lane, race = %pointer, error = %e, "readiness write failed"),
            }
        },
        Write::Pointer(pointer) => match store.set_current_pointer(&pointer).await {
            Ok(()) => debug!(race = %pointer, "pointer written"),
            Err(e) => warn!(race = %pointer, error = %e, "pointer write failed"),
        },
    }
}
