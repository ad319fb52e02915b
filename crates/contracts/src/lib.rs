//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the notifier workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Cancellation Model
//! - A single [`CancelSignal`] is created per run and passed by reference into
//!   every suspending call
//! - The signal carries a tagged [`CancelReason`] so callers can tell a user
//!   cancellation from an expired deadline

mod blueprint;
mod cancel;
mod channel;
mod error;
mod recipient;
mod report;
mod transport;

pub use blueprint::*;
pub use cancel::{CancelReason, CancelSignal};
pub use channel::ChannelKind;
pub use error::*;
pub use recipient::{DedupKey, Recipient};
pub use report::*;
pub use transport::{LocalTransport, Transport};
