//! Record parser - turns the input text stream into recipients
//!
//! One record per line: email, phone number, and a trailing one-character
//! credit flag (`Y` means the credit score went up). The fixed-width layout
//! (email padded to 50 columns, phone to 15, flag last) is whitespace padded,
//! so both the padded and the compact form split into the same fields.

use contracts::{CancelSignal, Recipient};
use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};

/// Flag value marking an eligible recipient
const ELIGIBLE_FLAG: &str = "Y";

/// Line-oriented recipient record parser
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse every record in `input`
    ///
    /// Blank lines are skipped. The first malformed line aborts parsing.
    pub fn parse(&self, input: &[u8]) -> Result<Vec<Recipient>> {
        self.parse_with_cancel(input, &CancelSignal::new())
    }

    /// Parse `input`, checking the signal before each line
    #[instrument(name = "record_parser_parse", skip_all, fields(bytes = input.len()))]
    pub fn parse_with_cancel(&self, input: &[u8], signal: &CancelSignal) -> Result<Vec<Recipient>> {
        let mut recipients = Vec::new();

        for (idx, raw) in input.split(|b| *b == b'\n').enumerate() {
            if let Some(reason) = signal.reason() {
                return Err(IngestionError::Cancelled(reason));
            }

            let line_no = idx + 1;
            let line = std::str::from_utf8(raw)
                .map_err(|e| IngestionError::parse_failed(line_no, format!("invalid UTF-8: {e}")))?;

            if line.trim().is_empty() {
                continue;
            }

            recipients.push(parse_line(line, line_no)?);
        }

        debug!(records = recipients.len(), "Records parsed");
        Ok(recipients)
    }
}

/// Parse one non-blank record line
fn parse_line(line: &str, line_no: usize) -> Result<Recipient> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(IngestionError::parse_failed(
            line_no,
            format!(
                "expected email, phone and credit flag, found {} field(s)",
                fields.len()
            ),
        ));
    }

    let email = fields[0];
    let phone = fields[1];
    let eligible = fields[fields.len() - 1] == ELIGIBLE_FLAG;

    Recipient::new(email, phone, eligible).map_err(|source| IngestionError::InvalidRecipient {
        line: line_no,
        source,
    })
}

/// Convenience wrapper around [`RecordParser::parse`]
pub fn parse_recipients(input: &[u8]) -> Result<Vec<Recipient>> {
    RecordParser::new().parse(input)
}
