//! Bounded concurrent dispatch with input-ordered results.
//!
//! Every task is spawned up front but must hold a semaphore permit while it
//! runs, so at most `limit` tasks make progress at once no matter how large
//! the batch. Handles are awaited in input order, which is the output order.
//! Dropping the future returned by `run` aborts every task still pending.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// A task ended without producing output (panicked or was aborted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailed(pub String);

impl From<JoinError> for TaskFailed {
    fn from(e: JoinError) -> Self {
        if e.is_panic() {
            TaskFailed(panic_message(e.into_panic().as_ref()))
        } else {
            TaskFailed("task was cancelled".to_string())
        }
    }
}

/// Aborts every task it still holds when dropped.
struct AbortOnDrop<T>(Vec<JoinHandle<T>>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyGate {
    /// `limit` is clamped to at least 1.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `task(item)` for every item, at most `limit` at a time, and returns
    /// one output per item in input order. A failing task does not affect its
    /// siblings.
    pub async fn run<I, T, F, Fut>(&self, items: I, task: F) -> Vec<Result<T, TaskFailed>>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handles: Vec<JoinHandle<T>> = items
            .into_iter()
            .map(|item| {
                let permits = Arc::clone(&self.permits);
                let fut = task(item);
                tokio::spawn(async move {
                    // The semaphore lives as long as the gate and is never closed.
                    let _permit = permits.acquire_owned().await.ok();
                    fut.await
                })
            })
            .collect();
        let mut pending = AbortOnDrop(handles);

        let mut out = Vec::with_capacity(pending.0.len());
        for handle in pending.0.iter_mut() {
            let joined = handle.await.map_err(TaskFailed::from);
            if let Err(e) = &joined {
                tracing::debug!("gate task failed: {}", e.0);
            }
            out.push(joined);
        }
        out
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
