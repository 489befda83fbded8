//! Shutdown coordination for the service.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Coordinator for graceful shutdown.
///
/// Wraps a cancellation token that long-running tasks can subscribe to.
/// Subscribers see the trigger of their parent, never the other way round.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator driven by an existing token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown has been triggered.
    pub fn triggered(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }
}

/// Outcome of waiting for a task to wind down.
#[derive(Debug)]
pub enum Drain<T> {
    Finished(T),
    /// The task was still running at the deadline and has been aborted.
    Aborted,
}

/// Wait up to `grace` for `task`, aborting it when the deadline passes.
pub async fn drain<T>(task: &mut JoinHandle<T>, grace: Duration) -> Drain<Result<T, tokio::task::JoinError>> {
    match tokio::time::timeout(grace, &mut *task).await {
        Ok(result) => Drain::Finished(result),
        Err(_) => {
            task.abort();
            Drain::Aborted
        }
    }
}
