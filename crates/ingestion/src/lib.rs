//! # Ingestion Pipeline
//!
//! Recipient ingestion module.
//!
//! Responsibilities:
//! - Parse the record text stream into `Recipient`s
//! - Keep only recipients eligible for the notification
//! - Remove duplicates by a caller-chosen identity key
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{CancelSignal, DedupKey};
//! use ingestion::IngestionPipeline;
//!
//! let mut pipeline = IngestionPipeline::new(DedupKey::ByEmail);
//! let prepared = pipeline.prepare_file(path, &CancelSignal::new())?;
//! println!("{} unique recipients", prepared.stats.unique);
//! ```

mod dedup;
mod error;
mod filter;
mod pipeline;
mod records;

// Re-exports
pub use contracts::Recipient;
pub use dedup::Deduplicator;
pub use error::{IngestionError, Result};
pub use filter::{count_eligible, filter_eligible};
pub use pipeline::{IngestionPipeline, IngestionStats, Prepared};
pub use records::{parse_recipients, RecordParser};
