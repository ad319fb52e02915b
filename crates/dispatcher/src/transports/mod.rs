//! Transport implementations
//!
//! Contains LogTransport, FileTransport, and MockTransport, plus the
//! config-driven [`AnyTransport`] used by the CLI.

mod file;
mod log;
mod mock;

use contracts::{ChannelKind, ContractError, Transport, TransportConfig, TransportType};
use tracing::instrument;

use crate::error::DispatchError;

pub use self::file::FileTransport;
pub use self::log::LogTransport;
pub use self::mock::MockTransport;

/// A transport chosen at runtime from configuration
#[derive(Debug)]
pub enum AnyTransport {
    Log(LogTransport),
    File(FileTransport),
}

impl Transport for AnyTransport {
    fn name(&self) -> &str {
        match self {
            Self::Log(t) => t.name(),
            Self::File(t) => t.name(),
        }
    }

    async fn send(&self, destination: &str, message: &str) -> Result<(), ContractError> {
        match self {
            Self::Log(t) => t.send(destination, message).await,
            Self::File(t) => t.send(destination, message).await,
        }
    }

    async fn close(&self) -> Result<(), ContractError> {
        match self {
            Self::Log(t) => t.close().await,
            Self::File(t) => t.close().await,
        }
    }
}

/// Build the transport configured for `channel`
#[instrument(
    name = "dispatcher_create_transport",
    skip(config),
    fields(channel = %channel, transport_type = ?config.transport_type)
)]
pub fn create_transport(
    channel: ChannelKind,
    config: &TransportConfig,
) -> Result<AnyTransport, DispatchError> {
    let name = format!("{channel}_{}", type_name(config.transport_type));
    match config.transport_type {
        TransportType::Log => LogTransport::from_params(name, &config.params)
            .map(AnyTransport::Log)
            .map_err(|e| DispatchError::transport_creation(channel, e.to_string())),
        TransportType::File => FileTransport::from_params(name, &config.params)
            .map(AnyTransport::File)
            .map_err(|e| DispatchError::transport_creation(channel, e.to_string())),
    }
}

fn type_name(transport_type: TransportType) -> &'static str {
    match transport_type {
        TransportType::Log => "log",
        TransportType::File => "file",
    }
}
