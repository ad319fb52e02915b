//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::CancelSignal;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{NotifyConfig, NotifyRun};

/// Execute the `run` command
pub async fn run_notify(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .map_err(CliError::Config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mut config = NotifyConfig::from_blueprint(blueprint);

    // Apply CLI overrides
    if let Some(ref input) = args.input {
        info!(input = %input.display(), "Overriding input file from CLI");
        config.input = input.clone();
    }
    if let Some(secs) = args.timeout {
        info!(timeout_secs = secs, "Overriding dispatch deadline from CLI");
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    config.metrics_port = (args.metrics_port != 0).then_some(args.metrics_port);
    config.dry_run = args.dry_run;

    info!(
        input = %config.input.display(),
        dedup = %config.blueprint.input.dedup,
        timeout = ?config.timeout,
        "Configuration loaded"
    );

    // Cancel the run on Ctrl+C / SIGTERM
    let signal = CancelSignal::new();
    let shutdown = tokio::spawn(cancel_on_shutdown(signal.clone()));

    let result = NotifyRun::new(config).run(&signal).await;
    shutdown.abort();

    let stats = result.context("Notification run failed")?;
    stats.print_summary();

    if let Some(err) = stats.interruption() {
        return Err(err.into());
    }

    info!("Notifier finished");
    Ok(())
}

/// Fire `signal` on Ctrl+C or SIGTERM
async fn cancel_on_shutdown(signal: CancelSignal) {
    wait_for_shutdown().await;
    warn!("Received shutdown signal, stopping dispatch...");
    signal.cancel();
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
