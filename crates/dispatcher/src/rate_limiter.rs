//! RateLimiter - token bucket with a background replenisher
//!
//! The bucket starts full (`rate` tokens) and gains one token every
//! `window / rate` until it is full again. `wait` takes one token, parking
//! the caller until one is available or the cancel signal fires.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use contracts::{CancelReason, CancelSignal, RateLimitConfig};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use crate::error::DispatchError;

/// Token storage shared between waiters and the replenisher
#[derive(Debug)]
struct Bucket {
    tokens: AtomicUsize,
    capacity: usize,
    notify: Notify,
}

impl Bucket {
    fn try_take(&self) -> bool {
        self.tokens
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| t.checked_sub(1))
            .is_ok()
    }

    /// Add one token unless full; returns whether one was added
    fn refill_one(&self) -> bool {
        self.tokens
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                (t < self.capacity).then_some(t + 1)
            })
            .is_ok()
    }
}

/// Token bucket rate limiter
///
/// Must be created inside a tokio runtime: the replenisher runs as a
/// spawned task until [`RateLimiter::stop`] or drop.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Arc<Bucket>,
    interval: Duration,
    shutdown: CancellationToken,
    replenisher: Mutex<Option<JoinHandle<()>>>,
}

impl RateLimiter {
    /// Create a limiter issuing `rate` tokens per `window`
    ///
    /// # Errors
    /// `rate` of zero, a zero `window`, or a window too short to split
    /// into `rate` non-zero intervals.
    pub fn new(rate: u32, window: Duration) -> Result<Self, DispatchError> {
        if rate == 0 {
            return Err(DispatchError::invalid_rate_limit(
                rate,
                window,
                "rate must be at least 1",
            ));
        }
        if window.is_zero() {
            return Err(DispatchError::invalid_rate_limit(
                rate,
                window,
                "window must be positive",
            ));
        }

        let interval = window / rate;
        if interval.is_zero() {
            return Err(DispatchError::invalid_rate_limit(
                rate,
                window,
                "window too short for rate",
            ));
        }

        let capacity = rate as usize;
        let bucket = Arc::new(Bucket {
            tokens: AtomicUsize::new(capacity),
            capacity,
            notify: Notify::new(),
        });
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(replenish(
            Arc::clone(&bucket),
            interval,
            shutdown.clone(),
        ));

        debug!(rate, ?window, ?interval, "RateLimiter started");

        Ok(Self {
            bucket,
            interval,
            shutdown,
            replenisher: Mutex::new(Some(handle)),
        })
    }

    /// Create from a channel's rate-limit settings
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, DispatchError> {
        Self::new(config.rate, config.window())
    }

    /// Maximum tokens the bucket can hold
    pub fn capacity(&self) -> usize {
        self.bucket.capacity
    }

    /// Tokens currently available
    pub fn available(&self) -> usize {
        self.bucket.tokens.load(Ordering::Acquire)
    }

    /// Time between two replenished tokens
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Take one token, waiting for replenishment if the bucket is empty
    ///
    /// Returns the cancel reason without consuming a token when the signal
    /// has fired or fires while waiting.
    pub async fn wait(&self, signal: &CancelSignal) -> Result<(), CancelReason> {
        loop {
            if let Some(reason) = signal.reason() {
                return Err(reason);
            }

            let notified = self.bucket.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.bucket.try_take() {
                return Ok(());
            }

            tokio::select! {
                biased;
                reason = signal.cancelled() => return Err(reason),
                _ = &mut notified => {}
            }
        }
    }

    /// Stop the replenisher and wait for it to exit
    ///
    /// Once this returns the token count never grows again. Calling it a
    /// second time is a no-op.
    #[instrument(name = "rate_limiter_stop", skip(self))]
    pub async fn stop(&self) {
        self.shutdown.cancel();

        let handle = self
            .replenisher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Replenisher task failed");
            }
            debug!("RateLimiter stopped");
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn replenish(bucket: Arc<Bucket>, interval: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                bucket.refill_one();
                // Wake every parked waiter; losers re-register and park again.
                bucket.notify.notify_waiters();
            }
        }
    }
}
