//! 配置解析模块
//!
//! 先解析为通用文档 (TOML 表或 JSON 值)，再反序列化为 `NotifyBlueprint`。
//! 反序列化失败时逐段重试，错误信息指明出错的段，例如 `[channels.sms]`。

use contracts::{
    ChannelConfig, ChannelKind, ContractError, DispatchSettings, InputConfig, MessageConfig,
    NotifyBlueprint,
};
use serde::de::DeserializeOwned;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// 解析后的通用文档
trait Document: Clone {
    type Error: std::error::Error + Send + Sync + 'static;

    /// 按键路径取子段
    fn section(&self, path: &[&str]) -> Option<Self>;

    fn decode<T: DeserializeOwned>(self) -> Result<T, Self::Error>;
}

impl Document for toml::Value {
    type Error = toml::de::Error;

    fn section(&self, path: &[&str]) -> Option<Self> {
        path.iter()
            .try_fold(self, |value, key| value.get(*key))
            .cloned()
    }

    fn decode<T: DeserializeOwned>(self) -> Result<T, Self::Error> {
        self.try_into()
    }
}

impl Document for serde_json::Value {
    type Error = serde_json::Error;

    fn section(&self, path: &[&str]) -> Option<Self> {
        path.iter()
            .try_fold(self, |value, key| value.get(*key))
            .cloned()
    }

    fn decode<T: DeserializeOwned>(self) -> Result<T, Self::Error> {
        serde_json::from_value(self)
    }
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<NotifyBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| syntax_error(format, e))?;
            decode_blueprint(toml::Value::Table(table), format)
        }
        ConfigFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|e| syntax_error(format, e))?;
            decode_blueprint(value, format)
        }
    }
}

fn syntax_error<E>(format: ConfigFormat, e: E) -> ContractError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ContractError::ConfigParse {
        message: format!("{} parse error: {e}", format.label()),
        source: Some(Box::new(e)),
    }
}

fn decode_blueprint<D: Document>(
    doc: D,
    format: ConfigFormat,
) -> Result<NotifyBlueprint, ContractError> {
    let whole = match doc.clone().decode::<NotifyBlueprint>() {
        Ok(blueprint) => return Ok(blueprint),
        Err(e) => e,
    };

    let message = match failing_section(&doc) {
        Some((section, reason)) => {
            format!("{} parse error in [{section}]: {reason}", format.label())
        }
        None => format!("{} parse error: {whole}", format.label()),
    };
    Err(ContractError::ConfigParse {
        message,
        source: Some(Box::new(whole)),
    })
}

/// 找出第一个无法反序列化的段
fn failing_section<D: Document>(doc: &D) -> Option<(String, String)> {
    for kind in ChannelKind::ALL {
        let path = ["channels", kind.as_str()];
        if let Some(reason) = section_error::<D, ChannelConfig>(doc, &path) {
            return Some((format!("channels.{kind}"), reason));
        }
    }

    section_error::<D, InputConfig>(doc, &["input"])
        .map(|reason| ("input".to_string(), reason))
        .or_else(|| {
            section_error::<D, MessageConfig>(doc, &["message"])
                .map(|reason| ("message".to_string(), reason))
        })
        .or_else(|| {
            section_error::<D, DispatchSettings>(doc, &["dispatch"])
                .map(|reason| ("dispatch".to_string(), reason))
        })
}

fn section_error<D: Document, T: DeserializeOwned>(doc: &D, path: &[&str]) -> Option<String> {
    let section = doc.section(path)?;
    section.decode::<T>().err().map(|e| e.to_string())
}
