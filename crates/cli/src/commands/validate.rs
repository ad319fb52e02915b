//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ChannelKind, NotifyBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    input: String,
    dedup: String,
    email_rate_limited: bool,
    sms_rate_limited: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    input: blueprint.input.path.clone(),
                    dedup: blueprint.input.dedup.to_string(),
                    email_rate_limited: blueprint.channels.email.rate_limit.is_some(),
                    sms_rate_limited: blueprint.channels.sms.rate_limit.is_some(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &NotifyBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if !std::path::Path::new(&blueprint.input.path).exists() {
        warnings.push(format!(
            "Input file '{}' does not exist yet",
            blueprint.input.path
        ));
    }

    for kind in ChannelKind::ALL {
        let channel = blueprint.channel(kind);
        if channel.rate_limit.is_some() && channel.in_flight_limit().is_some() {
            warnings.push(format!(
                "channels.{kind}.max_in_flight is ignored for a rate-limited channel"
            ));
        }
        if channel.transport.params.contains_key("failure_rate") {
            warnings.push(format!(
                "channels.{kind} simulates delivery failures (failure_rate set)"
            ));
        }
    }

    if blueprint.dispatch.timeout().is_none() {
        warnings.push("dispatch.timeout_secs not set - run has no deadline".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Input: {} (dedup {})", summary.input, summary.dedup);
            println!("  Email rate limited: {}", summary.email_rate_limited);
            println!("  SMS rate limited: {}", summary.sms_rate_limited);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let (_file, args) = args_for(
            r#"
[message]
text = "hi"

[channels.sms]
rate_limit = { rate = 10 }
max_in_flight = 4
"#,
        );

        let result = validate_config(&args);
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("max_in_flight")));
        assert!(warnings.iter().any(|w| w.contains("no deadline")));
        assert!(run_validate(&args).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let (_file, args) = args_for("[message]\ntext = \"\"\n");
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/notifier.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
