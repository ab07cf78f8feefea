use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::executor::NodePollExecutor;

/// Invokes each registered executor once per interval.
pub trait Scheduler: Send + Sync {
    fn register(&self, executor: Arc<NodePollExecutor>, interval: Duration);
}

/// One tokio task per node. A node's next poll starts only after the
/// previous one finished, so cycles for the same node never overlap.
pub struct TokioScheduler {
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn task_count(&self) -> usize {
        self.lock().len()
    }

    /// Cancel every node loop and wait for them to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let tasks = std::mem::take(&mut *self.lock());
        for task in tasks {
            let _ = task.await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler for TokioScheduler {
    fn register(&self, executor: Arc<NodePollExecutor>, interval: Duration) {
        tracing::info!(
            node=%executor.node().name,
            url=%executor.url(),
            interval_secs=interval.as_secs(),
            "scheduling node"
        );
        let cancel = self.cancel.clone();
        let task = tokio::spawn(poll_loop(executor, interval, cancel));
        self.lock().push(task);
    }
}

async fn poll_loop(executor: Arc<NodePollExecutor>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            res = executor.poll() => {
                if let Err(e) = res {
                    tracing::warn!(node=%executor.node().name, error=%e, "poll cycle failed");
                }
            }
        }
    }
    tracing::debug!(node=%executor.node().name, "poll loop stopped");
}

/// Records registrations without running anything.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    registered: Mutex<Vec<(Arc<NodePollExecutor>, Duration)>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> Vec<(Arc<NodePollExecutor>, Duration)> {
        self.registered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn register(&self, executor: Arc<NodePollExecutor>, interval: Duration) {
        self.registered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((executor, interval));
    }
}
