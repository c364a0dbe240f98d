//! Background write-through of cart snapshots.
//!
//! The facade enqueues a full snapshot after every transition without waiting.
//! A single task drains the queue in issue order, so the last snapshot issued
//! is the last one written.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};

use crate::cart::CartState;
use crate::error::CartError;
use crate::persist::CartPersistence;

pub(crate) enum WriteCommand {
    Save(CartState),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Sending half of the write queue.
pub(crate) struct WriteQueue {
    tx: mpsc::UnboundedSender<WriteCommand>,
    issued: AtomicU64,
}

impl WriteQueue {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<WriteCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                issued: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// Number of snapshots enqueued so far.
    pub(crate) fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Queue a snapshot. Never blocks; returns false once the writer is gone.
    pub(crate) fn enqueue(&self, state: CartState) -> bool {
        self.issued.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(WriteCommand::Save(state)).is_err() {
            tracing::warn!("cart writer stopped; snapshot not persisted");
            return false;
        }
        true
    }

    /// Wait until every snapshot queued before this call has been handled.
    pub(crate) async fn flush(&self) -> Result<(), CartError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(ack))
            .map_err(|_| CartError::Closed)?;
        done.await.map_err(|_| CartError::Closed)
    }

    /// Drain the queue and stop the writer.
    pub(crate) async fn shutdown(&self) -> Result<(), CartError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(WriteCommand::Shutdown(ack))
            .map_err(|_| CartError::Closed)?;
        done.await.map_err(|_| CartError::Closed)
    }
}

/// Writer loop. Returns when shut down or when every sender is dropped.
///
/// With `coalesce` set, snapshots already waiting behind the current one
/// replace it, so a burst of transitions costs one write.
pub(crate) async fn run_writer(
    persistence: CartPersistence,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    coalesce: bool,
) {
    let mut pending: Option<WriteCommand> = None;

    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match rx.recv().await {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            WriteCommand::Save(mut state) => {
                if coalesce {
                    let mut skipped = 0usize;
                    while let Ok(next) = rx.try_recv() {
                        match next {
                            WriteCommand::Save(newer) => {
                                state = newer;
                                skipped += 1;
                            }
                            other => {
                                pending = Some(other);
                                break;
                            }
                        }
                    }
                    if skipped > 0 {
                        tracing::trace!(skipped, "coalesced cart snapshots");
                    }
                }
                write(&persistence, &state).await;
            }
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            WriteCommand::Shutdown(ack) => {
                rx.close();
                while let Ok(command) = rx.try_recv() {
                    match command {
                        WriteCommand::Save(state) => write(&persistence, &state).await,
                        WriteCommand::Flush(waiter) | WriteCommand::Shutdown(waiter) => {
                            let _ = waiter.send(());
                        }
                    }
                }
                let _ = ack.send(());
                tracing::debug!("cart writer stopped");
                return;
            }
        }
    }

    tracing::debug!("cart writer finished; all handles dropped");
}

async fn write(persistence: &CartPersistence, state: &CartState) {
    match persistence.save(state).await {
        Ok(()) => tracing::trace!(key = persistence.key(), lines = state.items.len(), "cart persisted"),
        Err(e) => tracing::warn!(key = persistence.key(), error = %e, "failed to persist cart"),
    }
}
