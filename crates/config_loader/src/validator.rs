//! 配置校验模块
//!
//! 校验规则：
//! - 字段级规则 (derive `Validate`)：消息非空、输入路径非空、rate >= 1、window_ms >= 1
//! - 消息正文不能只有空白
//! - file 发送端必须提供 path 参数
//! - log 发送端的 failure_rate 必须位于 [0, 1]

use contracts::{ChannelKind, ContractError, NotifyBlueprint, TransportConfig, TransportType};
use validator::Validate;

/// 校验 NotifyBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_message(blueprint)?;
    for kind in ChannelKind::ALL {
        validate_transport(kind, &blueprint.channel(kind).transport)?;
    }
    Ok(())
}

/// 字段级规则
fn validate_fields(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

/// 消息正文不能只有空白
fn validate_message(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    if blueprint.message.text.trim().is_empty() {
        return Err(ContractError::config_validation(
            "message.text",
            "message text cannot be blank",
        ));
    }
    Ok(())
}

/// 校验发送端参数
fn validate_transport(kind: ChannelKind, config: &TransportConfig) -> Result<(), ContractError> {
    match config.transport_type {
        TransportType::File => {
            let has_path = config
                .params
                .get("path")
                .is_some_and(|p| !p.trim().is_empty());
            if !has_path {
                return Err(ContractError::config_validation(
                    format!("channels.{kind}.transport.params.path"),
                    "file transport requires a non-empty 'path' param",
                ));
            }
        }
        TransportType::Log => {
            if let Some(raw) = config.params.get("failure_rate") {
                let rate: f64 = raw.parse().map_err(|_| {
                    ContractError::config_validation(
                        format!("channels.{kind}.transport.params.failure_rate"),
                        format!("failure_rate must be a number, got '{raw}'"),
                    )
                })?;
                if !(0.0..=1.0).contains(&rate) {
                    return Err(ContractError::config_validation(
                        format!("channels.{kind}.transport.params.failure_rate"),
                        format!("failure_rate must be within [0, 1], got {rate}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ChannelConfig, ChannelsConfig, ConfigVersion, DispatchSettings, InputConfig,
        MessageConfig, RateLimitConfig,
    };

    fn minimal_blueprint() -> NotifyBlueprint {
        NotifyBlueprint {
            version: ConfigVersion::V1,
            input: InputConfig::default(),
            message: MessageConfig {
                text: "Your credit score went up".into(),
            },
            dispatch: DispatchSettings::default(),
            channels: ChannelsConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_empty_message() {
        let mut bp = minimal_blueprint();
        bp.message.text = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("message text cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_blank_message() {
        let mut bp = minimal_blueprint();
        bp.message.text = "   ".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("blank"), "got: {err}");
    }

    #[test]
    fn test_empty_input_path() {
        let mut bp = minimal_blueprint();
        bp.input.path = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("input path cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_window() {
        let mut bp = minimal_blueprint();
        bp.channels.sms.rate_limit = Some(RateLimitConfig {
            rate: 100,
            window_ms: 0,
        });
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("window_ms must be >= 1"), "got: {err}");
    }

    #[test]
    fn test_file_transport_requires_path() {
        let mut bp = minimal_blueprint();
        bp.channels.email = ChannelConfig::unthrottled();
        bp.channels.email.transport.transport_type = TransportType::File;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("channels.email.transport.params.path"), "got: {err}");
    }

    #[test]
    fn test_failure_rate_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.channels
            .sms
            .transport
            .params
            .insert("failure_rate".into(), "1.5".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("within [0, 1]"), "got: {err}");
    }

    #[test]
    fn test_failure_rate_not_a_number() {
        let mut bp = minimal_blueprint();
        bp.channels
            .email
            .transport
            .params
            .insert("failure_rate".into(), "often".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("must be a number"), "got: {err}");
    }
}
