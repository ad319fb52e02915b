//! CancelSignal - one-shot, broadcast, idempotent cancellation
//!
//! Wraps a [`CancellationToken`] and remembers *why* it fired. The first
//! reason wins; later calls to [`CancelSignal::cancel_with`] are no-ops.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Why a run was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Explicit cancellation (Ctrl+C, caller request)
    Cancelled,
    /// The run deadline expired
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Cooperative cancellation signal shared by every task of one run
///
/// Cloning is cheap; all clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl CancelSignal {
    /// Create a signal that has not fired
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signal that fires `DeadlineExceeded` after `timeout`
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_deadline(timeout: Duration) -> Self {
        let signal = Self::new();
        signal.deadline_after(timeout);
        signal
    }

    /// Arm a deadline timer on this signal
    ///
    /// The timer task exits early if the signal fires for another reason.
    pub fn deadline_after(&self, timeout: Duration) -> JoinHandle<()> {
        let signal = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = signal.token.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    signal.cancel_with(CancelReason::DeadlineExceeded);
                }
            }
        })
    }

    /// Fire with [`CancelReason::Cancelled`]
    pub fn cancel(&self) {
        self.cancel_with(CancelReason::Cancelled);
    }

    /// Fire with an explicit reason; only the first reason is kept
    pub fn cancel_with(&self, reason: CancelReason) {
        // Reason must be visible before waiters wake up.
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    /// Non-blocking fired check
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason the signal fired with, `None` while still armed
    pub fn reason(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            self.reason.get().copied()
        } else {
            None
        }
    }

    /// Wait until the signal fires and return its reason
    pub async fn cancelled(&self) -> CancelReason {
        self.token.cancelled().await;
        self.reason.get().copied().unwrap_or(CancelReason::Cancelled)
    }
}
