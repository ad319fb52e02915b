//! Error types for CLI operations.

use contracts::ContractError;
use dispatcher::DispatchError;
use ingestion::IngestionError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration load or validation error
    #[error("Failed to load configuration: {0}")]
    Config(#[source] ContractError),

    /// Input preparation error
    #[error("Failed to prepare recipients: {0}")]
    Ingestion(#[from] IngestionError),

    /// Dispatcher setup error
    #[error("Failed to set up dispatch: {0}")]
    Dispatch(#[from] DispatchError),

    /// Dispatch stopped on the cancellation signal
    #[error("Dispatch interrupted: {0}")]
    Interrupted(#[source] ContractError),

    /// Metrics exporter error
    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[source] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CancelReason, ChannelKind};

    #[test]
    fn test_interrupted_message_keeps_counts() {
        let err = CliError::Interrupted(ContractError::Cancelled {
            channel: ChannelKind::Sms,
            reason: CancelReason::Cancelled,
            email_succeeded: 10,
            sms_succeeded: 4,
        });
        let msg = err.to_string();
        assert!(msg.contains("sms"), "got: {msg}");
        assert!(msg.contains("sms succeeded: 4"), "got: {msg}");
    }
}
