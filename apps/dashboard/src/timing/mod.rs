//! Deadline handling shared by every backend call: one hard ceiling that
//! cancels the call, and one earlier notice that only changes messaging.

pub mod guard;
pub mod notifier;

use std::future::Future;
use std::time::Duration;

use crate::errors::{ConfigError, GuardError};

pub use guard::RequestTimeoutGuard;
pub use notifier::SlowOperationNotifier;

/// Hard ceiling for every request. Sized for a backend waking from a cold start.
pub const REQUEST_CEILING: Duration = Duration::from_millis(90_000);
/// When the "this is taking a while" notice fires.
pub const SLOW_NOTICE_AFTER: Duration = Duration::from_millis(5_000);

/// A deadline with an intermediate signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlinePolicy {
    ceiling: Duration,
    slow_after: Duration,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            ceiling: REQUEST_CEILING,
            slow_after: SLOW_NOTICE_AFTER,
        }
    }
}

impl DeadlinePolicy {
    pub fn new(ceiling: Duration, slow_after: Duration) -> Result<Self, ConfigError> {
        if slow_after >= ceiling {
            return Err(ConfigError::SlowNoticeAfterDeadline {
                slow: slow_after,
                ceiling,
            });
        }
        Ok(Self {
            ceiling,
            slow_after,
        })
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    pub fn slow_after(&self) -> Duration {
        self.slow_after
    }

    pub fn guard(&self) -> RequestTimeoutGuard {
        RequestTimeoutGuard::new(self.ceiling)
    }

    /// Runs `operation` under the ceiling with the slow notice armed around it.
    ///
    /// The notice is armed before `operation` is first polled and disarmed
    /// after it settles, whichever way it settles.
    pub async fn run_with_notice<F, T, E, N>(
        &self,
        operation: F,
        on_slow: N,
    ) -> Result<T, GuardError<E>>
    where
        F: Future<Output = Result<T, E>>,
        N: FnOnce() + Send + 'static,
    {
        let notifier = SlowOperationNotifier::arm(self.slow_after, on_slow);
        let outcome = self.guard().run(operation).await;
        notifier.disarm();
        outcome
    }
}
