//! One-shot cancellation handle with an optional deadline.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a run was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The deadline elapsed.
    Timeout,
    /// Someone called [`CancellationHandle::cancel`] or cancelled the token.
    Requested,
}

/// Cancellation signal shared between the collector and the runtime for one run.
///
/// Fires at most once; the first reason recorded wins. When created with a
/// timeout, the deadline counts from construction and is observed by anyone
/// awaiting [`cancelled`](Self::cancelled) or polling
/// [`is_cancelled`](Self::is_cancelled).
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    reason: OnceLock<CancelReason>,
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationHandle {
    /// A handle that only fires on explicit cancellation.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                timeout: None,
                deadline: None,
                reason: OnceLock::new(),
            }),
        }
    }

    /// A handle that fires once `timeout` has elapsed from now.
    ///
    /// Returns `None` when the deadline is not representable as an instant.
    pub fn with_timeout(timeout: Duration) -> Option<Self> {
        let deadline = Instant::now().checked_add(timeout)?;
        Some(Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                timeout: Some(timeout),
                deadline: Some(deadline),
                reason: OnceLock::new(),
            }),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    /// Request cancellation. Returns `true` if this call fired the handle.
    pub fn cancel(&self) -> bool {
        self.fire(CancelReason::Requested)
    }

    /// Whether the handle has fired, firing it first if the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        if self.inner.token.is_cancelled() {
            let _ = self.inner.reason.set(CancelReason::Requested);
            return true;
        }
        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.fire(CancelReason::Timeout);
                true
            }
            _ => false,
        }
    }

    /// The reason recorded when the handle fired.
    pub fn reason(&self) -> Option<CancelReason> {
        self.is_cancelled();
        self.inner.reason.get().copied()
    }

    /// The underlying token, for runtimes that select on it directly.
    ///
    /// The token is only cancelled on deadline expiry once someone observes the
    /// handle; prefer [`cancelled`](Self::cancelled) where possible.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Resolves when the handle fires.
    pub async fn cancelled(&self) {
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.inner.token.cancelled() => {
                        let _ = self.inner.reason.set(CancelReason::Requested);
                    }
                    _ = tokio::time::sleep_until(deadline) => {
                        self.fire(CancelReason::Timeout);
                    }
                }
            }
            None => {
                self.inner.token.cancelled().await;
                let _ = self.inner.reason.set(CancelReason::Requested);
            }
        }
    }

    fn fire(&self, reason: CancelReason) -> bool {
        let first = self.inner.reason.set(reason).is_ok();
        self.inner.token.cancel();
        first
    }
}
