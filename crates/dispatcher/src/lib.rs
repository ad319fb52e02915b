//! # Dispatcher
//!
//! 通知分发模块。
//!
//! 负责：
//! - 每个渠道一个 `ChannelSender`，email 与 sms 并行发送
//! - 令牌桶限流（顺序发送）或按收件人并发发送
//! - 响应取消/超时信号，保留已完成的计数

pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod rate_limiter;
pub mod sender;
pub mod transports;

pub use contracts::{ChannelReport, DispatchOutcome, Transport};
pub use coordinator::{ConfiguredCoordinator, DispatchCoordinator, create_coordinator};
pub use error::DispatchError;
pub use metrics::{MetricsSnapshot, SenderMetrics};
pub use rate_limiter::RateLimiter;
pub use sender::ChannelSender;
pub use transports::{AnyTransport, FileTransport, LogTransport, MockTransport, create_transport};
