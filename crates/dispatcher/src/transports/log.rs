//! LogTransport - records each delivery via tracing

use std::collections::HashMap;

use contracts::{ContractError, Transport};
use tracing::{info, instrument, warn};

/// Transport that logs deliveries instead of talking to a provider
///
/// With a non-zero `failure_rate` it rejects that share of sends, which is
/// handy for exercising the failure accounting end to end.
#[derive(Debug)]
pub struct LogTransport {
    name: String,
    failure_rate: f64,
}

impl LogTransport {
    /// Create a LogTransport that always succeeds
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_rate: 0.0,
        }
    }

    /// Reject roughly `rate` of all sends; clamped to [0, 1]
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    /// Create from config params
    ///
    /// Params:
    /// - `failure_rate` (optional): share of sends to reject
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let failure_rate = match params.get("failure_rate") {
            Some(raw) => raw.trim().parse::<f64>().map_err(|e| {
                ContractError::transport_setup(&name, format!("invalid failure_rate '{raw}': {e}"))
            })?,
            None => 0.0,
        };
        Ok(Self::new(name).with_failure_rate(failure_rate))
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_transport_send",
        skip(self, message),
        fields(transport = %self.name)
    )]
    async fn send(&self, destination: &str, message: &str) -> Result<(), ContractError> {
        if self.failure_rate > 0.0 && rand::random_bool(self.failure_rate) {
            warn!(transport = %self.name, destination, "Simulated delivery failure");
            return Err(ContractError::transport_send(
                &self.name,
                destination,
                "simulated delivery failure",
            ));
        }

        info!(transport = %self.name, destination, message, "Notification delivered");
        Ok(())
    }

    #[instrument(name = "log_transport_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        info!(transport = %self.name, "LogTransport closed");
        Ok(())
    }
}
