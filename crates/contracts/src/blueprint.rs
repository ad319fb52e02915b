//! NotifyBlueprint - Config Loader 输出
//!
//! 描述一次通知运行的完整配置：输入文件、去重策略、消息内容、渠道与限流。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

use crate::{ChannelKind, DedupKey};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的通知配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotifyBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 输入文件设置
    #[serde(default)]
    #[validate(nested)]
    pub input: InputConfig,

    /// 通知消息
    #[validate(nested)]
    pub message: MessageConfig,

    /// 分发运行设置
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// 渠道配置
    #[serde(default)]
    #[validate(nested)]
    pub channels: ChannelsConfig,
}

impl NotifyBlueprint {
    /// 获取指定渠道的配置
    pub fn channel(&self, kind: ChannelKind) -> &ChannelConfig {
        self.channels.get(kind)
    }
}

/// 输入设置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InputConfig {
    /// 收件人记录文件路径
    #[serde(default = "default_input_path")]
    #[validate(length(min = 1, message = "input path cannot be empty"))]
    pub path: String,

    /// 去重策略
    #[serde(default)]
    pub dedup: DedupKey,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            dedup: DedupKey::default(),
        }
    }
}

fn default_input_path() -> String {
    "files/input/data.txt".to_string()
}

/// 通知消息
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageConfig {
    /// 消息正文，两个渠道共用
    #[validate(length(min = 1, message = "message text cannot be empty"))]
    pub text: String,
}

/// 分发运行设置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// 运行超时（秒），缺省或 0 表示不设截止时间
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl DispatchSettings {
    /// 有效的截止时长
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// 两个渠道的配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChannelsConfig {
    /// 邮件渠道：默认不限流
    #[serde(default = "ChannelConfig::unthrottled")]
    #[validate(nested)]
    pub email: ChannelConfig,

    /// 短信渠道：默认 100 条/秒
    #[serde(default = "ChannelConfig::rate_limited")]
    #[validate(nested)]
    pub sms: ChannelConfig,
}

impl ChannelsConfig {
    pub fn get(&self, kind: ChannelKind) -> &ChannelConfig {
        match kind {
            ChannelKind::Email => &self.email,
            ChannelKind::Sms => &self.sms,
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            email: ChannelConfig::unthrottled(),
            sms: ChannelConfig::rate_limited(),
        }
    }
}

/// 单个渠道配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChannelConfig {
    /// 发送端
    #[serde(default)]
    pub transport: TransportConfig,

    /// 令牌桶限流（None = 不限流，按收件人并发发送）
    #[serde(default)]
    #[validate(nested)]
    pub rate_limit: Option<RateLimitConfig>,

    /// 不限流模式下的最大并发数（None 或 0 = 不限）
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

impl ChannelConfig {
    /// 不限流的渠道配置
    pub fn unthrottled() -> Self {
        Self {
            transport: TransportConfig::default(),
            rate_limit: None,
            max_in_flight: None,
        }
    }

    /// 默认限流（100 条/秒）的渠道配置
    pub fn rate_limited() -> Self {
        Self {
            transport: TransportConfig::default(),
            rate_limit: Some(RateLimitConfig::default()),
            max_in_flight: None,
        }
    }

    /// 有效的并发上限
    pub fn in_flight_limit(&self) -> Option<usize> {
        self.max_in_flight.filter(|n| *n > 0)
    }
}

/// 令牌桶参数：每个窗口 `rate` 次操作，桶容量等于 `rate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// 每个窗口允许的操作数（同时也是突发容量）
    #[validate(range(min = 1, message = "rate must be >= 1"))]
    pub rate: u32,

    /// 窗口长度（毫秒）
    #[serde(default = "default_window_ms")]
    #[validate(range(min = 1, message = "window_ms must be >= 1"))]
    pub window_ms: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate: 100,
            window_ms: default_window_ms(),
        }
    }
}

fn default_window_ms() -> u64 {
    1000
}

/// 发送端配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportConfig {
    /// 发送端类型
    #[serde(default)]
    pub transport_type: TransportType,

    /// 类型相关参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// 发送端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    /// 仅记录日志
    #[default]
    Log,
    /// 追加写入文件
    File,
}
