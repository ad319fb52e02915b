//! Per-run sender counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters shared by every send task of one channel run
#[derive(Debug, Default)]
pub struct SenderMetrics {
    /// Sends currently awaiting the transport
    in_flight: AtomicUsize,
    /// Sends started
    attempted: AtomicU64,
    /// Sends accepted by the transport
    succeeded: AtomicU64,
    /// Sends rejected by the transport
    failed: AtomicU64,
}

impl SenderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn attempted(&self) -> u64 {
        self.attempted.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Mark a send as started
    pub fn begin(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark a started send as finished
    pub fn finish(&self, ok: bool) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        if ok {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            in_flight: self.in_flight(),
            attempted: self.attempted(),
            succeeded: self.succeeded(),
            failed: self.failed(),
        }
    }
}

/// Snapshot of sender counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub in_flight: usize,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
}
