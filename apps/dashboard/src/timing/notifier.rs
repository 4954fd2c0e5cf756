use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// One-shot timer that flips a "still working" signal without cancelling anything.
///
/// Dropping the notifier disarms it, so an owner that returns early through `?`
/// cannot leave a stale notice behind.
pub struct SlowOperationNotifier {
    task: Option<JoinHandle<()>>,
    fired: Arc<AtomicBool>,
}

impl SlowOperationNotifier {
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(notify_after: Duration, on_slow: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(notify_after).await;
            flag.store(true, Ordering::SeqCst);
            debug!(notify_ms = notify_after.as_millis() as u64, "slow notice fired");
            on_slow();
        });
        Self {
            task: Some(task),
            fired,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Cancels the pending notice. Returns whether it had already fired.
    pub fn disarm(mut self) -> bool {
        self.cancel();
        self.has_fired()
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SlowOperationNotifier {
    fn drop(&mut self) {
        self.cancel();
    }
}
