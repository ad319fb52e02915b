//! Transport trait - dispatcher output interface
//!
//! Defines the abstract interface for the clients that perform send I/O.

use crate::ContractError;

/// Notification transport trait
///
/// All transport implementations must implement this trait. `send` takes
/// `&self` so one transport can serve many concurrent sends.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver `message` to `destination`
    ///
    /// # Errors
    /// Returns a send error for this single delivery (should include context)
    async fn send(&self, destination: &str, message: &str) -> Result<(), ContractError>;

    /// Flush buffers and release resources
    async fn close(&self) -> Result<(), ContractError>;
}
