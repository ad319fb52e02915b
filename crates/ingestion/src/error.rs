//! Ingestion 错误类型

use contracts::{CancelReason, ContractError};
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 记录行格式错误
    #[error("line {line}: {message}")]
    ParseFailed {
        /// 1-based 行号
        line: usize,
        /// 错误消息
        message: String,
    },

    /// 记录字段不合法
    #[error("line {line}: {source}")]
    InvalidRecipient {
        /// 1-based 行号
        line: usize,
        #[source]
        source: ContractError,
    },

    /// 解析过程中收到取消信号
    #[error("record parsing {0}")]
    Cancelled(CancelReason),

    /// 读取输入失败
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestionError {
    pub fn parse_failed(line: usize, message: impl Into<String>) -> Self {
        Self::ParseFailed {
            line,
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
