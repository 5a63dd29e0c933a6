//! Fixed-size pool of queue consumers
//!
//! Each worker loops forever: pop a URL, run the handler on it, mark the item
//! done. A panic inside the handler is caught and logged so the worker keeps
//! draining the queue.

use crate::crawler::queue::UrlQueue;
use crate::crawler::thread::ThreadHandler;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handles to the spawned worker tasks
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers sharing one queue and one handler
    ///
    /// A size of zero is raised to one.
    pub fn spawn<H: ThreadHandler>(size: usize, queue: UrlQueue, handler: Arc<H>) -> Self {
        let size = size.max(1);
        tracing::info!("Starting {} workers", size);

        let handles = (0..size)
            .map(|id| tokio::spawn(worker_loop(id, queue.clone(), handler.clone())))
            .collect();

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Cancels every worker and waits for the tasks to wind down
    ///
    /// Join errors (including cancellation) are ignored.
    pub async fn shutdown(self) {
        for handle in &self.handles {
            handle.abort();
        }
        for handle in self.handles {
            let _ = handle.await;
        }
        tracing::debug!("Workers stopped");
    }
}

async fn worker_loop<H: ThreadHandler>(id: usize, queue: UrlQueue, handler: Arc<H>) {
    while let Some(url) = queue.pop().await {
        let outcome = AssertUnwindSafe(handler.handle(&url)).catch_unwind().await;
        if let Err(panic) = outcome {
            tracing::error!(
                "Worker {} panicked on {}: {}",
                id,
                url,
                panic_message(panic.as_ref())
            );
        }
        queue.task_done();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
