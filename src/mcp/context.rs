//! Per-request cancellable context.
//!
//! Each request handled by the server gets its own context carrying a fixed
//! deadline. Nothing pre-empts a handler: only work that observes the context
//! (through [`RequestContext::run`] or [`RequestContext::cancelled`]) is cut
//! off when the deadline passes or the context is cancelled.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::handler::HandlerError;

/// Default lifetime of a request context.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline and cancellation signal scoped to a single request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    deadline: Instant,
    token: CancellationToken,
}

impl RequestContext {
    /// Creates a context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            token: CancellationToken::new(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// True once the context was cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Cancels the context. Clones share the same signal.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Resolves when the context is cancelled or the deadline passes.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = tokio::time::sleep_until(self.deadline) => {}
        }
    }

    /// Drives `fut` to completion unless the context ends first.
    ///
    /// The future is dropped when the context ends, which is how subprocesses
    /// spawned with `kill_on_drop` get terminated.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, HandlerError>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(HandlerError::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(HandlerError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }
}
