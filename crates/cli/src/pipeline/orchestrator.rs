//! Run orchestrator - coordinates ingestion and dispatch.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use contracts::{CancelSignal, NotifyBlueprint};
use ingestion::IngestionPipeline;
use tracing::{info, instrument, warn};

use super::RunStats;
use crate::error::{CliError, Result};

/// Run configuration
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// The loaded notification blueprint
    pub blueprint: NotifyBlueprint,

    /// Recipient record file
    pub input: PathBuf,

    /// Dispatch deadline (None = no deadline)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Stop after preparing recipients
    pub dry_run: bool,
}

impl NotifyConfig {
    /// Build from a blueprint using its own input path and timeout
    pub fn from_blueprint(blueprint: NotifyBlueprint) -> Self {
        Self {
            input: PathBuf::from(&blueprint.input.path),
            timeout: blueprint.dispatch.timeout(),
            metrics_port: None,
            dry_run: false,
            blueprint,
        }
    }
}

/// One notification run
pub struct NotifyRun {
    config: NotifyConfig,
}

impl NotifyRun {
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }

    /// Prepare recipients and dispatch to both channels
    ///
    /// A run stopped by `signal` or the deadline still returns `Ok` with the
    /// partial outcome; use [`RunStats::interruption`] to surface it.
    #[instrument(name = "notify_run", skip_all, fields(input = %self.config.input.display()))]
    pub async fn run(self, signal: &CancelSignal) -> Result<RunStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port).map_err(CliError::Metrics)?;
            info!(port, "Metrics endpoint available");
        }

        // Prepare recipients
        info!(dedup = %blueprint.input.dedup, "Preparing recipients...");
        let mut ingestion = IngestionPipeline::new(blueprint.input.dedup);
        let prepared = ingestion.prepare_file(&self.config.input, signal)?;
        let ingestion_stats = prepared.stats;
        observability::record_recipients(
            ingestion_stats.total,
            ingestion_stats.eligible,
            ingestion_stats.unique,
        );

        let mut stats = RunStats::new(ingestion_stats);

        if self.config.dry_run {
            info!(unique = ingestion_stats.unique, "Dry run - skipping dispatch");
            stats.duration = start_time.elapsed();
            return Ok(stats);
        }

        if prepared.recipients.is_empty() {
            warn!("No eligible recipients - nothing to send");
        }

        // Setup Dispatcher
        let coordinator =
            dispatcher::create_coordinator(&blueprint.channels, &blueprint.message.text)?;

        let deadline = self.config.timeout.map(|timeout| {
            info!(timeout_secs = timeout.as_secs(), "Dispatch deadline armed");
            signal.deadline_after(timeout)
        });

        let outcome = coordinator.dispatch(&prepared.recipients, signal).await;

        if let Some(timer) = deadline {
            timer.abort();
        }

        // Shutdown
        info!("Closing dispatcher...");
        coordinator.close().await;

        observability::record_dispatch_outcome(&outcome);
        stats.record(outcome);
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            "Run complete"
        );

        Ok(stats)
    }
}
