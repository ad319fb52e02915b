//! Dispatcher error types

use std::time::Duration;

use contracts::ChannelKind;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Rate limiter parameters that would never issue a token
    #[error("invalid rate limit (rate={rate}, window={window:?}): {message}")]
    InvalidRateLimit {
        rate: u32,
        window: Duration,
        message: String,
    },

    /// Transport creation error
    #[error("failed to create transport for {channel} channel: {message}")]
    TransportCreation {
        channel: ChannelKind,
        message: String,
    },
}

impl DispatchError {
    pub fn invalid_rate_limit(rate: u32, window: Duration, message: impl Into<String>) -> Self {
        Self::InvalidRateLimit {
            rate,
            window,
            message: message.into(),
        }
    }

    /// Create a transport creation error
    pub fn transport_creation(channel: ChannelKind, message: impl Into<String>) -> Self {
        Self::TransportCreation {
            channel,
            message: message.into(),
        }
    }
}
