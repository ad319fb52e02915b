//! Ingestion Pipeline main entry
//!
//! parse -> eligibility filter -> dedup, with per-stage counts.

use std::path::Path;

use contracts::{CancelSignal, DedupKey, Recipient};
use metrics::counter;
use tracing::{info, instrument};

use crate::dedup::Deduplicator;
use crate::error::Result;
use crate::filter::filter_eligible;
use crate::records::RecordParser;

/// Counts observed at each ingestion stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Records parsed from input
    pub total: usize,
    /// Records that passed the eligibility filter
    pub eligible: usize,
    /// Eligible records left after dedup
    pub unique: usize,
}

impl IngestionStats {
    /// Eligible records removed as duplicates
    pub fn duplicates_removed(&self) -> usize {
        self.eligible - self.unique
    }

    /// Share of eligible records, in percent
    pub fn eligible_rate(&self) -> f64 {
        if self.total > 0 {
            self.eligible as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Recipients ready for dispatch plus the stage counts
#[derive(Debug, Clone)]
pub struct Prepared {
    pub recipients: Vec<Recipient>,
    pub stats: IngestionStats,
}

/// Ingestion Pipeline
///
/// Runs the three upstream stages in order.
#[derive(Debug)]
pub struct IngestionPipeline {
    parser: RecordParser,
    dedup: Deduplicator,
}

impl IngestionPipeline {
    /// Create a pipeline deduplicating by `dedup`
    pub fn new(dedup: DedupKey) -> Self {
        Self {
            parser: RecordParser::new(),
            dedup: Deduplicator::new(dedup),
        }
    }

    /// Read and prepare a record file
    pub fn prepare_file(&mut self, path: &Path, signal: &CancelSignal) -> Result<Prepared> {
        let input = std::fs::read(path)?;
        self.prepare(&input, signal)
    }

    /// Prepare recipients from raw input bytes
    #[instrument(name = "ingestion_prepare", skip_all, fields(dedup = %self.dedup.strategy()))]
    pub fn prepare(&mut self, input: &[u8], signal: &CancelSignal) -> Result<Prepared> {
        let parsed = self.parser.parse_with_cancel(input, signal)?;
        let total = parsed.len();
        counter!("notifier_records_parsed_total").increment(total as u64);
        info!(total, "Records parsed");

        let eligible = filter_eligible(parsed);
        let eligible_count = eligible.len();
        counter!("notifier_records_eligible_total").increment(eligible_count as u64);
        info!(eligible = eligible_count, "Eligible recipients filtered");

        let recipients = self.dedup.filter(eligible);
        let unique = recipients.len();
        counter!("notifier_records_duplicate_total").increment((eligible_count - unique) as u64);
        info!(
            unique,
            duplicates = eligible_count - unique,
            "Duplicate recipients removed"
        );

        Ok(Prepared {
            recipients,
            stats: IngestionStats {
                total,
                eligible: eligible_count,
                unique,
            },
        })
    }
}
