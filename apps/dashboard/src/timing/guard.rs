use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::GuardError;

/// Bounds a single call with a hard deadline.
///
/// On expiry the wrapped future is dropped, which aborts the in-flight request
/// on the client side. The server may still finish the work; its answer is
/// simply never read.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeoutGuard {
    deadline: Duration,
}

impl RequestTimeoutGuard {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn run<F, T, E>(&self, operation: F) -> Result<T, GuardError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        // The timer lives inside `timeout` and is dropped with it on every path.
        match tokio::time::timeout(self.deadline, operation).await {
            Ok(Ok(value)) => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "call settled");
                Ok(value)
            }
            Ok(Err(cause)) => Err(GuardError::Failed(cause)),
            Err(_) => {
                warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    "call abandoned at deadline"
                );
                Err(GuardError::TimedOut)
            }
        }
    }
}
