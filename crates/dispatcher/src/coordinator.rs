//! DispatchCoordinator - runs the email and sms senders side by side

use contracts::{CancelSignal, ChannelKind, ChannelsConfig, DispatchOutcome, Recipient, Transport};
use tracing::{info, instrument, warn};

use crate::error::DispatchError;
use crate::sender::ChannelSender;
use crate::transports::{AnyTransport, create_transport};

/// Coordinator built from configuration
pub type ConfiguredCoordinator = DispatchCoordinator<AnyTransport, AnyTransport>;

/// Owns one sender per channel and joins their runs
#[derive(Debug)]
pub struct DispatchCoordinator<E, S> {
    email: ChannelSender<E>,
    sms: ChannelSender<S>,
}

impl<E, S> DispatchCoordinator<E, S>
where
    E: Transport + Sync + 'static,
    S: Transport + Sync + 'static,
{
    pub fn new(email: ChannelSender<E>, sms: ChannelSender<S>) -> Self {
        Self { email, sms }
    }

    pub fn email(&self) -> &ChannelSender<E> {
        &self.email
    }

    pub fn sms(&self) -> &ChannelSender<S> {
        &self.sms
    }

    /// Send to every recipient on both channels concurrently
    ///
    /// Neither channel waits on the other. Returns once both runs have
    /// finished or stopped on the signal.
    #[instrument(
        name = "dispatch_coordinator_dispatch",
        skip_all,
        fields(recipients = recipients.len())
    )]
    pub async fn dispatch(
        &self,
        recipients: &[Recipient],
        signal: &CancelSignal,
    ) -> DispatchOutcome {
        info!(recipients = recipients.len(), "Dispatch started");

        let (email, sms) = tokio::join!(
            self.email.send_all(recipients, signal),
            self.sms.send_all(recipients, signal),
        );
        let outcome = DispatchOutcome { email, sms };

        let (email_ok, sms_ok) = outcome.counts();
        match outcome.terminal() {
            Some((channel, reason)) => warn!(
                %channel,
                %reason,
                email_succeeded = email_ok,
                sms_succeeded = sms_ok,
                "Dispatch cancelled"
            ),
            None => info!(
                email_succeeded = email_ok,
                sms_succeeded = sms_ok,
                "Dispatch complete"
            ),
        }

        outcome
    }

    /// Stop both rate limiters and close both transports
    ///
    /// Consumes the coordinator so it can only happen once.
    #[instrument(name = "dispatch_coordinator_close", skip(self))]
    pub async fn close(self) {
        tokio::join!(self.email.close(), self.sms.close());
        info!("Dispatch coordinator closed");
    }
}

/// Build a coordinator from the channel settings
///
/// Must be called inside a tokio runtime (rate limiters spawn their
/// replenisher).
#[instrument(name = "dispatcher_create_coordinator", skip_all)]
pub fn create_coordinator(
    channels: &ChannelsConfig,
    message: &str,
) -> Result<ConfiguredCoordinator, DispatchError> {
    let email = create_sender(ChannelKind::Email, channels, message)?;
    let sms = create_sender(ChannelKind::Sms, channels, message)?;
    Ok(DispatchCoordinator::new(email, sms))
}

fn create_sender(
    channel: ChannelKind,
    channels: &ChannelsConfig,
    message: &str,
) -> Result<ChannelSender<AnyTransport>, DispatchError> {
    let config = channels.get(channel);
    let transport = create_transport(channel, &config.transport)?;
    let sender = ChannelSender::from_config(channel, transport, message, config)?;
    info!(
        %channel,
        transport = %sender.transport().name(),
        rate_limited = sender.is_rate_limited(),
        "Channel sender ready"
    );
    Ok(sender)
}
