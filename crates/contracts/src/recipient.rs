//! Recipient - ingestion output, dispatcher input
//!
//! 收件人记录：两个渠道的目的地址 + 是否满足通知条件。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ChannelKind, ContractError};

/// 通知收件人
///
/// 构造后不可变。dispatcher 只读取 [`Recipient::destination`]，
/// 去重与资格过滤在上游完成。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    email: String,
    phone: String,
    eligible: bool,
}

impl Recipient {
    /// 创建收件人，去除首尾空白
    ///
    /// # Errors
    /// email 或 phone 为空时返回 `RecipientInvalid`
    pub fn new(
        email: impl AsRef<str>,
        phone: impl AsRef<str>,
        eligible: bool,
    ) -> Result<Self, ContractError> {
        let email = email.as_ref().trim();
        let phone = phone.as_ref().trim();

        if email.is_empty() {
            return Err(ContractError::recipient_invalid(
                "email",
                "email cannot be empty",
            ));
        }
        if phone.is_empty() {
            return Err(ContractError::recipient_invalid(
                "phone",
                "phone number cannot be empty",
            ));
        }

        Ok(Self {
            email: email.to_string(),
            phone: phone.to_string(),
            eligible,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// 是否满足通知条件（信用分上升）
    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    /// 指定渠道的目的地址
    pub fn destination(&self, channel: ChannelKind) -> &str {
        match channel {
            ChannelKind::Email => &self.email,
            ChannelKind::Sms => &self.phone,
        }
    }

    /// 按去重策略生成身份键
    pub fn unique_key(&self, key: DedupKey) -> String {
        match key {
            DedupKey::ByEmail => self.email.clone(),
            DedupKey::ByPhone => self.phone.clone(),
            DedupKey::ByBoth => format!("{}|{}", self.email, self.phone),
        }
    }
}

/// 去重策略：选择哪个字段作为收件人身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    #[default]
    ByEmail,
    ByPhone,
    ByBoth,
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DedupKey::ByEmail => "by_email",
            DedupKey::ByPhone => "by_phone",
            DedupKey::ByBoth => "by_both",
        };
        f.write_str(name)
    }
}
