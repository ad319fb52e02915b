//! `info` command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use contracts::{ChannelConfig, ChannelKind, NotifyBlueprint, TransportType};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    input: InputInfo,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    channels: Vec<ChannelInfo>,
}

#[derive(Serialize)]
struct InputInfo {
    path: String,
    dedup: String,
}

#[derive(Serialize)]
struct ChannelInfo {
    channel: ChannelKind,
    transport_type: TransportType,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_per_window: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    window_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_in_flight: Option<usize>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &NotifyBlueprint) -> ConfigInfo {
    let channels = ChannelKind::ALL
        .into_iter()
        .map(|kind| channel_info(kind, blueprint.channel(kind)))
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        input: InputInfo {
            path: blueprint.input.path.clone(),
            dedup: blueprint.input.dedup.to_string(),
        },
        message: blueprint.message.text.clone(),
        timeout_secs: blueprint.dispatch.timeout().map(|t| t.as_secs()),
        channels,
    }
}

fn channel_info(kind: ChannelKind, config: &ChannelConfig) -> ChannelInfo {
    ChannelInfo {
        channel: kind,
        transport_type: config.transport.transport_type,
        params: config.transport.params.clone(),
        mode: mode_label(config),
        rate_per_window: config.rate_limit.map(|r| r.rate),
        window_ms: config.rate_limit.map(|r| r.window_ms),
        max_in_flight: config.in_flight_limit(),
    }
}

fn mode_label(config: &ChannelConfig) -> String {
    match (&config.rate_limit, config.in_flight_limit()) {
        (Some(limit), _) => format!("sequential, {} per {}ms", limit.rate, limit.window_ms),
        (None, Some(n)) => format!("concurrent, at most {n} in flight"),
        (None, None) => "concurrent, unbounded".to_string(),
    }
}

fn print_config_info(blueprint: &NotifyBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Notifier Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📥 Input");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ File: {}", blueprint.input.path);
    println!("   └─ Dedup: {}", blueprint.input.dedup);

    println!("\n✉️  Message");
    println!("   └─ {}", blueprint.message.text);

    println!("\n📤 Channels");
    for (i, kind) in ChannelKind::ALL.into_iter().enumerate() {
        let is_last = i == ChannelKind::ALL.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };
        let config = blueprint.channel(kind);

        println!("   {} {}", prefix, kind);
        println!(
            "   {}  ├─ Transport: {:?}",
            child_prefix, config.transport.transport_type
        );
        for (key, value) in &config.transport.params {
            println!("   {}  │   {} = {}", child_prefix, key, value);
        }
        println!("   {}  └─ Mode: {}", child_prefix, mode_label(config));
    }

    println!("\n⏱  Deadline");
    match blueprint.dispatch.timeout() {
        Some(timeout) => println!("   └─ {}s", timeout.as_secs()),
        None => println!("   └─ none"),
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::RateLimitConfig;

    #[test]
    fn test_mode_label() {
        assert_eq!(mode_label(&ChannelConfig::unthrottled()), "concurrent, unbounded");
        assert_eq!(
            mode_label(&ChannelConfig::rate_limited()),
            "sequential, 100 per 1000ms"
        );

        let mut capped = ChannelConfig::unthrottled();
        capped.max_in_flight = Some(8);
        assert_eq!(mode_label(&capped), "concurrent, at most 8 in flight");
    }

    #[test]
    fn test_build_config_info() {
        let mut blueprint = config_loader::ConfigLoader::load_from_str(
            "[message]\ntext = \"hi\"\n",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        blueprint.channels.sms.rate_limit = Some(RateLimitConfig {
            rate: 5,
            window_ms: 250,
        });

        let info = build_config_info(&blueprint);
        assert_eq!(info.channels.len(), 2);
        assert_eq!(info.channels[1].rate_per_window, Some(5));
        assert_eq!(info.channels[1].window_ms, Some(250));
        assert!(info.timeout_secs.is_none());

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"channel\":\"sms\""), "got: {json}");
    }
}
