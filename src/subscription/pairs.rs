//! Textual pair list parsing (`Landing:Front,Landing2:Front2`).

use crate::chain::model::PairCandidate;
use crate::chain::oplog::OperationLog;
use crate::subscription::error::{SubscriptionError, SubscriptionResult};

/// Parse a comma-separated list of `landing:front` entries.
///
/// The first `:` splits an entry; both sides are trimmed and must be
/// non-empty. Malformed entries are logged and skipped, blank entries are
/// ignored silently.
pub fn parse_pairs(text: &str, log: &mut OperationLog) -> Vec<PairCandidate> {
    let mut pairs = Vec::new();

    for entry in text.split(',') {
        if entry.trim().is_empty() {
            continue;
        }

        match entry.split_once(':') {
            Some((landing, front)) if !landing.trim().is_empty() && !front.trim().is_empty() => {
                pairs.push(PairCandidate::new(landing.trim(), front.trim()));
            }
            _ => {
                log.warn(format!("Malformed pair entry '{}', skipping", entry.trim()));
            }
        }
    }

    pairs
}

/// Parse a caller-supplied list. Blank text is an empty list; text whose
/// entries are all malformed is an input error.
pub fn parse_pair_list(text: &str, log: &mut OperationLog) -> SubscriptionResult<Vec<PairCandidate>> {
    let pairs = parse_pairs(text, log);
    let supplied = text.split(',').filter(|e| !e.trim().is_empty()).count();
    require_pairs(pairs, supplied, log)
}

/// Fail when `supplied` entries were given and none survived parsing.
pub fn require_pairs(
    pairs: Vec<PairCandidate>,
    supplied: usize,
    log: &mut OperationLog,
) -> SubscriptionResult<Vec<PairCandidate>> {
    if supplied > 0 && pairs.is_empty() {
        let err = SubscriptionError::MalformedPairs(supplied);
        log.error(err.to_string());
        return Err(err);
    }
    Ok(pairs)
}

/// Encode pairs back into the textual form.
pub fn format_pairs(pairs: &[PairCandidate]) -> String {
    pairs
        .iter()
        .map(|p| format!("{}:{}", p.landing, p.front))
        .collect::<Vec<_>>()
        .join(",")
}
