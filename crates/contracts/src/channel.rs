//! Notification channel identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A delivery medium with its own transport and optional throughput limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Unthrottled channel, destination is the recipient's email address
    Email,
    /// Rate-limited channel, destination is the recipient's phone number
    Sms,
}

impl ChannelKind {
    /// All channels in dispatch order
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Email, ChannelKind::Sms];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
