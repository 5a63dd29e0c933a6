//! Shared FIFO of thread URLs between the crawler and the workers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct Shared {
    sender: flume::Sender<String>,
    receiver: flume::Receiver<String>,
    /// Items pushed but not yet marked done
    pending: AtomicUsize,
    drained: Notify,
}

/// Unbounded multi-producer, multi-consumer URL queue
///
/// Cloning the handle shares the same queue. `pop` suspends while the queue
/// is empty. Every popped item must be acknowledged with `task_done` so that
/// `join` can tell when all pushed work has been processed.
#[derive(Clone)]
pub struct UrlQueue {
    shared: Arc<Shared>,
}

impl UrlQueue {
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            shared: Arc::new(Shared {
                sender,
                receiver,
                pending: AtomicUsize::new(0),
                drained: Notify::new(),
            }),
        }
    }

    /// Appends a URL to the tail of the queue
    pub fn push(&self, url: impl Into<String>) {
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        // The queue owns a receiver, so the channel never disconnects
        if self.shared.sender.send(url.into()).is_err() {
            self.task_done();
        }
    }

    /// Takes the URL at the head of the queue, waiting while it is empty
    ///
    /// Returns `None` only if the channel disconnected, which cannot happen
    /// while the queue holds its own sender.
    pub async fn pop(&self) -> Option<String> {
        self.shared.receiver.recv_async().await.ok()
    }

    /// Takes the head of the queue without waiting
    pub fn try_pop(&self) -> Option<String> {
        self.shared.receiver.try_recv().ok()
    }

    /// Marks one popped item as processed
    pub fn task_done(&self) {
        let previous = self
            .shared
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);

        if previous <= 1 {
            self.shared.drained.notify_waiters();
        }
    }

    /// Number of URLs waiting to be popped
    pub fn len(&self) -> usize {
        self.shared.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.receiver.is_empty()
    }

    /// Items pushed and not yet marked done
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Waits until every pushed item has been marked done
    pub async fn join(&self) {
        loop {
            let drained = self.shared.drained.notified();
            tokio::pin!(drained);
            drained.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            drained.await;
        }
    }
}

impl Default for UrlQueue {
    fn default() -> Self {
        Self::new()
    }
}
