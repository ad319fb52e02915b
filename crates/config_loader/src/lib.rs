//! # Config Loader
//!
//! 配置加载模块。
//!
//! 负责：
//! - 解析 TOML/JSON 配置，出错时指明出错的段
//! - 校验配置
//! - 从文件加载时，相对路径按配置文件所在目录解析
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("notifier.toml")).unwrap();
//! println!("Input: {}", blueprint.input.path);
//! ```

mod parser;
mod paths;
mod validator;

pub use contracts::NotifyBlueprint;
pub use parser::ConfigFormat;
pub use paths::resolve_relative_paths;

use contracts::ContractError;
use std::path::Path;

/// Notifier 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从文件加载
    ///
    /// 格式由扩展名决定 (.toml / .json)。`input.path` 与 file 发送端的
    /// `path` 参数若为相对路径，按配置文件所在目录解析。
    pub fn load_from_path(path: &Path) -> Result<NotifyBlueprint, ContractError> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ConfigFormat::from_extension)
            .ok_or_else(|| {
                ContractError::config_parse(format!(
                    "unsupported config format: {} (expected .toml or .json)",
                    path.display()
                ))
            })?;
        let content = std::fs::read_to_string(path)?;

        let mut blueprint = Self::load_from_str(&content, format)?;
        if let Some(base) = path.parent() {
            resolve_relative_paths(&mut blueprint, base);
        }
        Ok(blueprint)
    }

    /// 从字符串加载，路径保持原样
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<NotifyBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    pub fn to_toml(blueprint: &NotifyBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(blueprint: &NotifyBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DedupKey, TransportType};
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[message]
text = "Your credit score went up"
"#;

    const FULL_TOML: &str = r#"
[input]
path = "files/input/data.txt"
dedup = "by_both"

[message]
text = "Your credit score went up"

[dispatch]
timeout_secs = 30

[channels.email]
max_in_flight = 64
[channels.email.transport]
transport_type = "file"
params = { path = "files/output/notified_emails.txt" }

[channels.sms]
rate_limit = { rate = 100, window_ms = 1000 }
[channels.sms.transport]
transport_type = "file"
params = { path = "files/output/notified_phone_numbers.txt" }
"#;

    #[test]
    fn test_load_minimal_uses_defaults() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.input.path, "files/input/data.txt");
        assert_eq!(bp.input.dedup, DedupKey::ByEmail);
        assert!(bp.channels.email.rate_limit.is_none());
        assert_eq!(bp.channels.sms.rate_limit.unwrap().rate, 100);
        assert_eq!(bp.channels.sms.transport.transport_type, TransportType::Log);
    }

    #[test]
    fn test_load_full_toml() {
        let result = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.input.dedup, DedupKey::ByBoth);
        assert_eq!(bp.channels.email.in_flight_limit(), Some(64));
        assert_eq!(bp.channels.email.transport.transport_type, TransportType::File);
        assert_eq!(
            bp.dispatch.timeout(),
            Some(std::time::Duration::from_secs(30))
        );
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.message.text, bp2.message.text);
        assert_eq!(bp.channels.sms.rate_limit, bp2.channels.sms.rate_limit);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.input.path, bp2.input.path);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[message]
text = "hi"

[channels.sms]
rate_limit = { rate = 0, window_ms = 1000 }
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("rate"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.message.text, "Your credit score went up");
    }

    #[test]
    fn test_load_from_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("notifier.toml");
        std::fs::write(&config, FULL_TOML).unwrap();

        let bp = ConfigLoader::load_from_path(&config).unwrap();

        assert_eq!(
            std::path::PathBuf::from(&bp.input.path),
            dir.path().join("files/input/data.txt")
        );
        assert_eq!(
            std::path::PathBuf::from(&bp.channels.sms.transport.params["path"]),
            dir.path().join("files/output/notified_phone_numbers.txt")
        );
    }

    #[test]
    fn test_parse_error_names_section() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let content = r#"{"message": {"text": "hi"}, "channels": {"sms": {"max_in_flight": -1}}}"#;
        file.write_all(content.as_bytes()).unwrap();

        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("[channels.sms]"), "got: {err}");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"), "got: {err}");
    }
}
