//! Debounced mirror writer
//!
//! Interactive sessions submit a snapshot on every edit. A background task
//! coalesces bursts: it waits for the debounce interval, then persists the
//! most recently submitted snapshot. Writes happen one at a time on that
//! task, so an older snapshot can never land after a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::mirror::{PersistResult, PersistenceBridge};
use crate::store::DocumentStoreState;

/// Pending snapshot tagged with a submission counter
type Pending = (u64, Option<Arc<DocumentStoreState>>);

/// Handle to the background writer task
pub struct MirrorWriter {
    state_tx: watch::Sender<Pending>,
    flush_tx: mpsc::Sender<oneshot::Sender<()>>,
    result_rx: watch::Receiver<Option<PersistResult>>,
    task: JoinHandle<()>,
}

impl MirrorWriter {
    /// Spawn the writer on the current tokio runtime
    pub fn spawn(bridge: PersistenceBridge, debounce: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel((0, None));
        let (flush_tx, flush_rx) = mpsc::channel(8);
        let (result_tx, result_rx) = watch::channel(None);

        let task = tokio::spawn(
            WriterTask {
                bridge,
                debounce,
                state_rx,
                flush_rx,
                result_tx,
                written: 0,
            }
            .run(),
        );

        Self {
            state_tx,
            flush_tx,
            result_rx,
            task,
        }
    }

    /// Queue a snapshot, replacing any snapshot not yet written
    pub fn submit(&self, state: DocumentStoreState) {
        let state = Arc::new(state);
        self.state_tx.send_modify(|(generation, slot)| {
            *generation += 1;
            *slot = Some(state);
        });
    }

    /// Write the latest submitted snapshot now and wait for it
    pub async fn flush(&self) -> Option<PersistResult> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.flush_tx.send(reply_tx).await.is_ok() {
            let _ = reply_rx.await;
        }
        self.last_result()
    }

    /// Outcome of the most recent write, if any happened yet
    pub fn last_result(&self) -> Option<PersistResult> {
        self.result_rx.borrow().clone()
    }

    /// Watch write outcomes (for status indicators)
    pub fn subscribe(&self) -> watch::Receiver<Option<PersistResult>> {
        self.result_rx.clone()
    }

    /// Deliver the last submitted snapshot and stop the task
    pub async fn shutdown(self) -> Option<PersistResult> {
        self.flush().await;
        let Self {
            state_tx,
            flush_tx,
            result_rx,
            task,
        } = self;
        drop(state_tx);
        drop(flush_tx);
        let _ = task.await;
        let result = result_rx.borrow().clone();
        result
    }
}

struct WriterTask {
    bridge: PersistenceBridge,
    debounce: Duration,
    state_rx: watch::Receiver<Pending>,
    flush_rx: mpsc::Receiver<oneshot::Sender<()>>,
    result_tx: watch::Sender<Option<PersistResult>>,
    written: u64,
}

impl WriterTask {
    async fn run(mut self) {
        loop {
            tokio::select! {
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let mut replies = Vec::new();
                    tokio::select! {
                        _ = tokio::time::sleep(self.debounce) => {}
                        Some(reply) = self.flush_rx.recv() => replies.push(reply),
                    }
                    self.write_latest().await;
                    for reply in replies {
                        let _ = reply.send(());
                    }
                }
                Some(reply) = self.flush_rx.recv() => {
                    self.write_latest().await;
                    let _ = reply.send(());
                }
                else => break,
            }
        }
        debug!("Mirror writer stopped");
    }

    async fn write_latest(&mut self) {
        let (generation, snapshot) = self.state_rx.borrow_and_update().clone();
        let Some(snapshot) = snapshot else {
            return;
        };
        if generation <= self.written {
            return;
        }

        let bridge = self.bridge.clone();
        let result = tokio::task::spawn_blocking(move || bridge.persist(&snapshot))
            .await
            .unwrap_or_else(|e| {
                PersistResult::failure(format!("Mirror write task failed: {}", e))
            });

        // A failed snapshot stays pending so the next flush retries it
        if result.is_success() {
            self.written = generation;
        }
        let _ = self.result_tx.send(Some(result));
    }
}
