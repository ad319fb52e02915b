//! Run statistics and summary output.

use std::time::Duration;

use contracts::{DispatchOutcome, DispatchState};
use ingestion::IngestionStats;
use observability::DispatchMetricsAggregator;

use crate::error::CliError;

/// Statistics from a notification run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Counts from the ingestion stages
    pub ingestion: IngestionStats,

    /// Dispatch outcome (None for a dry run)
    pub outcome: Option<DispatchOutcome>,

    /// Total duration of the run
    pub duration: Duration,

    /// Dispatch metrics aggregator
    pub dispatch_metrics: DispatchMetricsAggregator,
}

impl RunStats {
    pub fn new(ingestion: IngestionStats) -> Self {
        Self {
            ingestion,
            ..Self::default()
        }
    }

    /// Store the dispatch outcome
    pub fn record(&mut self, outcome: DispatchOutcome) {
        self.dispatch_metrics.update(&outcome);
        self.outcome = Some(outcome);
    }

    /// Success counts as `(email, sms)`
    pub fn counts(&self) -> (u64, u64) {
        self.outcome
            .as_ref()
            .map(DispatchOutcome::counts)
            .unwrap_or_default()
    }

    /// Average wall time per unique recipient
    pub fn time_per_recipient(&self) -> Duration {
        match u32::try_from(self.ingestion.unique) {
            Ok(n) if n > 0 => self.duration / n,
            _ => Duration::ZERO,
        }
    }

    /// The cancellation error of an interrupted dispatch, if any
    pub fn interruption(&self) -> Option<CliError> {
        self.outcome
            .clone()
            .and_then(|outcome| outcome.into_result().err())
            .map(CliError::Interrupted)
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Recipients");
        println!("   ├─ Total records: {}", self.ingestion.total);
        println!(
            "   ├─ Eligible: {} ({:.2}%)",
            self.ingestion.eligible,
            self.ingestion.eligible_rate()
        );
        println!("   ├─ Duplicates removed: {}", self.ingestion.duplicates_removed());
        println!("   └─ Unique: {}", self.ingestion.unique);

        let Some(outcome) = &self.outcome else {
            println!("\n(dry run - nothing sent)\n");
            return;
        };

        println!("\n📤 Dispatch");
        for report in [&outcome.email, &outcome.sms] {
            println!(
                "   ├─ {}: sent {} / failed {} / skipped {} ({:.2}s)",
                report.channel,
                report.succeeded,
                report.failed,
                report.skipped(),
                report.elapsed.as_secs_f64()
            );
        }
        println!(
            "   ├─ Reached on both channels: at most {}",
            outcome.both_succeeded_upper_bound()
        );
        match outcome.state() {
            DispatchState::Completed => println!("   └─ State: completed"),
            DispatchState::Cancelled => {
                if let Some((channel, reason)) = outcome.terminal() {
                    println!("   └─ State: {reason} ({channel} channel)");
                }
            }
        }

        println!("\n⏱  Timing");
        println!("   ├─ Elapsed: {:.3}s", self.duration.as_secs_f64());
        println!(
            "   └─ Per recipient: {:.3}ms",
            self.time_per_recipient().as_secs_f64() * 1000.0
        );

        println!("\n{}", self.dispatch_metrics.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CancelReason, ChannelKind, ChannelReport};

    fn report(channel: ChannelKind, succeeded: u64, total: usize) -> ChannelReport {
        ChannelReport {
            attempted: succeeded,
            succeeded,
            ..ChannelReport::empty(channel, total)
        }
    }

    fn ingestion() -> IngestionStats {
        IngestionStats {
            total: 10,
            eligible: 6,
            unique: 4,
        }
    }

    #[test]
    fn test_completed_run() {
        let mut stats = RunStats::new(ingestion());
        stats.record(DispatchOutcome {
            email: report(ChannelKind::Email, 4, 4),
            sms: report(ChannelKind::Sms, 4, 4),
        });
        stats.duration = Duration::from_millis(400);

        assert_eq!(stats.counts(), (4, 4));
        assert_eq!(stats.time_per_recipient(), Duration::from_millis(100));
        assert!(stats.interruption().is_none());
        assert_eq!(stats.dispatch_metrics.runs, 1);
        stats.print_summary();
    }

    #[test]
    fn test_interrupted_run() {
        let mut sms = report(ChannelKind::Sms, 1, 4);
        sms.cancelled = Some(CancelReason::DeadlineExceeded);

        let mut stats = RunStats::new(ingestion());
        stats.record(DispatchOutcome {
            email: report(ChannelKind::Email, 4, 4),
            sms,
        });

        let err = stats.interruption().unwrap();
        assert!(err.to_string().contains("deadline exceeded"), "got: {err}");
        stats.print_summary();
    }

    #[test]
    fn test_dry_run_has_no_counts() {
        let stats = RunStats::new(ingestion());
        assert_eq!(stats.counts(), (0, 0));
        assert!(stats.interruption().is_none());
    }
}
