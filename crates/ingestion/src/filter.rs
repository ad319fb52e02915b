//! Eligibility filter

use contracts::Recipient;

/// Keep only recipients whose credit score went up, preserving order
pub fn filter_eligible(recipients: Vec<Recipient>) -> Vec<Recipient> {
    recipients.into_iter().filter(Recipient::is_eligible).collect()
}

/// Count eligible recipients without consuming the input
pub fn count_eligible(recipients: &[Recipient]) -> usize {
    recipients.iter().filter(|r| r.is_eligible()).count()
}
