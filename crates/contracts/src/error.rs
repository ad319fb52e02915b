//! Layered error definitions
//!
//! Categorized by source: config / recipient / transport / dispatch

use thiserror::Error;

use crate::{CancelReason, ChannelKind};

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Recipient Errors =====
    /// Recipient field rejected at construction
    #[error("invalid recipient {field}: {message}")]
    RecipientInvalid { field: String, message: String },

    // ===== Transport Errors =====
    /// A single delivery failed
    #[error("transport '{transport}' failed to send to {destination}: {message}")]
    TransportSend {
        transport: String,
        destination: String,
        message: String,
    },

    /// Transport could not be constructed
    #[error("transport '{transport}' setup error: {message}")]
    TransportSetup { transport: String, message: String },

    // ===== Dispatch Errors =====
    /// Dispatch stopped on the cancellation signal; partial counts preserved
    #[error(
        "dispatch {reason} on {channel} channel \
         (email succeeded: {email_succeeded}, sms succeeded: {sms_succeeded})"
    )]
    Cancelled {
        channel: ChannelKind,
        reason: CancelReason,
        email_succeeded: u64,
        sms_succeeded: u64,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create recipient validation error
    pub fn recipient_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecipientInvalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport send error
    pub fn transport_send(
        transport: impl Into<String>,
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TransportSend {
            transport: transport.into(),
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Create transport setup error
    pub fn transport_setup(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportSetup {
            transport: transport.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContractError::transport_send("sms", "010-0000-0000", "gateway timeout");
        assert_eq!(
            err.to_string(),
            "transport 'sms' failed to send to 010-0000-0000: gateway timeout"
        );

        let err = ContractError::config_validation("channels.sms.rate_limit.rate", "must be >= 1");
        assert_eq!(
            err.to_string(),
            "config validation error at 'channels.sms.rate_limit.rate': must be >= 1"
        );
    }
}
