//! ChannelSender - delivers one message to every recipient over one channel
//!
//! Two modes:
//! - rate limited: sequential, one token per send
//! - unthrottled: one task per recipient, optionally capped by `max_in_flight`
//!
//! Individual send failures are logged and counted, never propagated.

use std::sync::Arc;

use contracts::{
    CancelReason, CancelSignal, ChannelConfig, ChannelKind, ChannelReport, Recipient, Transport,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatchError;
use crate::metrics::SenderMetrics;
use crate::rate_limiter::RateLimiter;

/// Per-channel sender
#[derive(Debug)]
pub struct ChannelSender<T> {
    channel: ChannelKind,
    transport: Arc<T>,
    message: Arc<str>,
    limiter: Option<RateLimiter>,
    in_flight: Option<Arc<Semaphore>>,
}

impl<T> ChannelSender<T>
where
    T: Transport + Sync + 'static,
{
    /// Create an unthrottled sender
    pub fn new(channel: ChannelKind, transport: T, message: impl Into<Arc<str>>) -> Self {
        Self {
            channel,
            transport: Arc::new(transport),
            message: message.into(),
            limiter: None,
            in_flight: None,
        }
    }

    /// Create a sender configured by `config`
    ///
    /// Must be called inside a tokio runtime when `config` has a rate limit.
    pub fn from_config(
        channel: ChannelKind,
        transport: T,
        message: impl Into<Arc<str>>,
        config: &ChannelConfig,
    ) -> Result<Self, DispatchError> {
        let mut sender = Self::new(channel, transport, message);
        if let Some(rate_limit) = &config.rate_limit {
            sender = sender.with_rate_limiter(RateLimiter::from_config(rate_limit)?);
        }
        if let Some(limit) = config.in_flight_limit() {
            sender = sender.with_max_in_flight(limit);
        }
        Ok(sender)
    }

    /// Switch to sequential, token-paced sending
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Cap concurrent sends in unthrottled mode
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.in_flight = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    pub fn channel(&self) -> ChannelKind {
        self.channel
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_ref()
    }

    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Attempt delivery to every recipient
    ///
    /// Stops starting new sends once the signal fires; the report then
    /// carries the cancel reason and the counts reached so far.
    #[instrument(
        name = "channel_sender_send_all",
        skip_all,
        fields(channel = %self.channel, recipients = recipients.len())
    )]
    pub async fn send_all(&self, recipients: &[Recipient], signal: &CancelSignal) -> ChannelReport {
        let start = Instant::now();
        let counters = Arc::new(SenderMetrics::new());

        let cancelled = match &self.limiter {
            Some(limiter) => self.send_paced(limiter, recipients, signal, &counters).await,
            None => self.send_concurrent(recipients, signal, &counters).await,
        };

        let snapshot = counters.snapshot();
        let report = ChannelReport {
            channel: self.channel,
            total: recipients.len(),
            attempted: snapshot.attempted,
            succeeded: snapshot.succeeded,
            failed: snapshot.failed,
            cancelled,
            elapsed: start.elapsed(),
        };

        match report.cancelled {
            Some(reason) => warn!(
                channel = %self.channel,
                %reason,
                succeeded = report.succeeded,
                skipped = report.skipped(),
                "Channel run stopped early"
            ),
            None => info!(
                channel = %self.channel,
                succeeded = report.succeeded,
                failed = report.failed,
                total = report.total,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Channel run complete"
            ),
        }

        report
    }

    async fn send_paced(
        &self,
        limiter: &RateLimiter,
        recipients: &[Recipient],
        signal: &CancelSignal,
        counters: &SenderMetrics,
    ) -> Option<CancelReason> {
        for recipient in recipients {
            if let Err(reason) = limiter.wait(signal).await {
                return Some(reason);
            }
            deliver(
                &*self.transport,
                self.channel,
                recipient.destination(self.channel),
                &self.message,
                counters,
            )
            .await;
        }
        None
    }

    async fn send_concurrent(
        &self,
        recipients: &[Recipient],
        signal: &CancelSignal,
        counters: &Arc<SenderMetrics>,
    ) -> Option<CancelReason> {
        let mut tasks = JoinSet::new();
        let mut stopped = None;

        for recipient in recipients {
            if let Some(reason) = signal.reason() {
                stopped = Some(reason);
                break;
            }

            let channel = self.channel;
            let transport = Arc::clone(&self.transport);
            let message = Arc::clone(&self.message);
            let counters = Arc::clone(counters);
            let gate = self.in_flight.clone();
            let signal = signal.clone();
            let destination = recipient.destination(channel).to_string();

            tasks.spawn(async move {
                let _permit = match gate {
                    Some(gate) => tokio::select! {
                        biased;
                        reason = signal.cancelled() => return Some(reason),
                        permit = gate.acquire_owned() => permit.ok(),
                    },
                    None => None,
                };
                if let Some(reason) = signal.reason() {
                    return Some(reason);
                }
                deliver(&*transport, channel, &destination, &message, &counters).await;
                None
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(reason)) => {
                    stopped.get_or_insert(reason);
                }
                Ok(None) => {}
                Err(e) => {
                    // The task died between begin() and finish().
                    counters.finish(false);
                    error!(channel = %self.channel, error = %e, "Send task failed");
                }
            }
        }

        stopped
    }

    /// Stop the rate limiter and close the transport
    #[instrument(name = "channel_sender_close", skip(self), fields(channel = %self.channel))]
    pub async fn close(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.stop().await;
        }
        if let Err(e) = self.transport.close().await {
            error!(channel = %self.channel, error = %e, "Transport close failed");
        }
        debug!(channel = %self.channel, "ChannelSender closed");
    }
}

async fn deliver<T: Transport + Sync>(
    transport: &T,
    channel: ChannelKind,
    destination: &str,
    message: &str,
    counters: &SenderMetrics,
) {
    counters.begin();
    match transport.send(destination, message).await {
        Ok(()) => {
            counters.finish(true);
            debug!(channel = %channel, destination, "Notification sent");
        }
        Err(e) => {
            counters.finish(false);
            warn!(channel = %channel, destination, error = %e, "Send failed, continuing");
        }
    }
}
