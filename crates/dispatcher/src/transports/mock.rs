//! MockTransport - in-memory transport for tests and dry runs

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use contracts::{ContractError, Transport};

/// Transport that records destinations in memory
///
/// Sends to destinations registered with [`MockTransport::failing_for`]
/// return an error. An optional delay makes each send take time, which
/// lets tests observe concurrency.
#[derive(Debug, Default)]
pub struct MockTransport {
    name: String,
    failing: HashSet<String>,
    delay: Option<Duration>,
    sent: Mutex<Vec<String>>,
    calls: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Fail every send addressed to one of `destinations`
    pub fn failing_for<I, S>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(destinations.into_iter().map(Into::into));
        self
    }

    /// Sleep this long inside every send
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Destinations that were delivered successfully, in completion order
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `send` calls, failed ones included
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of sends observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, destination: &str, _message: &str) -> Result<(), ContractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(destination) {
            return Err(ContractError::transport_send(
                &self.name,
                destination,
                "mock failure",
            ));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), ContractError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
