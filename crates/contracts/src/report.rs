//! Dispatch reports - Dispatcher output
//!
//! Per-channel counts and the joined outcome of one dispatch call.

use serde::Serialize;
use std::time::Duration;

use crate::{CancelReason, ChannelKind, ContractError};

/// Result of one channel run over the recipient set
///
/// Invariant: `succeeded + failed == attempted <= total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    /// Channel this report belongs to
    pub channel: ChannelKind,

    /// Recipients handed to the channel
    pub total: usize,

    /// Sends that were started
    pub attempted: u64,

    /// Sends the transport accepted
    pub succeeded: u64,

    /// Sends the transport rejected (logged and absorbed)
    pub failed: u64,

    /// Set when the run stopped early because the signal fired
    pub cancelled: Option<CancelReason>,

    /// Wall time of the run
    pub elapsed: Duration,
}

impl ChannelReport {
    /// Empty report for a channel that has not run
    pub fn empty(channel: ChannelKind, total: usize) -> Self {
        Self {
            channel,
            total,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            cancelled: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Recipients never attempted on this channel
    pub fn skipped(&self) -> u64 {
        (self.total as u64).saturating_sub(self.attempted)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }
}

/// Terminal state of one dispatch call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// Both channel runs iterated the full recipient set
    Completed,
    /// At least one channel run stopped on the cancellation signal
    Cancelled,
}

/// Joined outcome of both channel runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub email: ChannelReport,
    pub sms: ChannelReport,
}

impl DispatchOutcome {
    /// Success counts as `(email, sms)`
    pub fn counts(&self) -> (u64, u64) {
        (self.email.succeeded, self.sms.succeeded)
    }

    /// Recipients that are known to be reachable on both channels at most
    pub fn both_succeeded_upper_bound(&self) -> u64 {
        self.email.succeeded.min(self.sms.succeeded)
    }

    pub fn state(&self) -> DispatchState {
        if self.terminal().is_some() {
            DispatchState::Cancelled
        } else {
            DispatchState::Completed
        }
    }

    /// First cancellation observed, email checked before sms
    pub fn terminal(&self) -> Option<(ChannelKind, CancelReason)> {
        [&self.email, &self.sms]
            .into_iter()
            .find_map(|report| report.cancelled.map(|reason| (report.channel, reason)))
    }

    pub fn report(&self, channel: ChannelKind) -> &ChannelReport {
        match channel {
            ChannelKind::Email => &self.email,
            ChannelKind::Sms => &self.sms,
        }
    }

    /// Convert into `(email, sms)` success counts or the terminal error
    ///
    /// The error still carries both partial counts.
    pub fn into_result(self) -> Result<(u64, u64), ContractError> {
        match self.terminal() {
            None => Ok(self.counts()),
            Some((channel, reason)) => Err(ContractError::Cancelled {
                channel,
                reason,
                email_succeeded: self.email.succeeded,
                sms_succeeded: self.sms.succeeded,
            }),
        }
    }
}
