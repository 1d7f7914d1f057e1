//! Per-call cancellation and deadlines.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{GraphQLClientError, Result};

/// A cancellation token for in-flight operations.
///
/// Clones share the same state, so one clone can be handed to the call and
/// another kept by whoever decides to abort it.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug)]
struct CancellationState {
    cancelled: AtomicBool,
    notify: tokio::sync::Notify,
}

impl CancellationToken {
    /// Create a new cancellation token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationState {
                cancelled: AtomicBool::new(false),
                notify: tokio::sync::Notify::new(),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation.
    ///
    /// This sets the cancellation flag and notifies any waiters.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::Release) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Wait asynchronously until cancellation is requested.
    ///
    /// Returns immediately if already cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
            if self.is_cancelled() {
                return;
            }
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-supplied limits for a single operation.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Maximum time the round trip may take.
    pub timeout: Option<Duration>,
    /// Absolute point in time after which the call is abandoned.
    pub deadline: Option<Instant>,
    /// Token that aborts the call when cancelled.
    pub cancellation: Option<CancellationToken>,
}

impl CallOptions {
    /// Create options without any limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the effective deadline for a call starting at `start`.
    ///
    /// `fallback_timeout` applies when no timeout was set on the options;
    /// the earliest of the timeout and the absolute deadline wins. A timeout
    /// too large to represent as an instant imposes no deadline.
    pub fn effective_deadline(
        &self,
        start: Instant,
        fallback_timeout: Option<Duration>,
    ) -> Option<Instant> {
        let from_timeout = self
            .timeout
            .or(fallback_timeout)
            .and_then(|timeout| start.checked_add(timeout));
        match (from_timeout, self.deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Drive `future` until it completes, the deadline passes, or the token is
/// cancelled. The future is dropped as soon as either limit triggers, which
/// aborts the in-flight request.
pub(crate) async fn run_cancellable<F, T>(
    future: F,
    deadline: Option<Instant>,
    cancellation: Option<&CancellationToken>,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancellation.is_some_and(CancellationToken::is_cancelled) {
        return Err(GraphQLClientError::Cancelled);
    }

    let cancelled = async {
        match cancellation {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };

    let bounded = async {
        match deadline {
            Some(deadline) => {
                tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), future)
                    .await
                    .map_err(|_| GraphQLClientError::Timeout)?
            }
            None => future.await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => Err(GraphQLClientError::Cancelled),
        result = bounded => result,
    }
}
