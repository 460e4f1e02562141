//! Automatic landing/front pair detection.

use crate::chain::model::{ChainConfig, PairCandidate};
use crate::chain::oplog::OperationLog;
use crate::chain::region::{classify, PairingRules};
use crate::chain::resolver::{resolve_front, Resolution};

/// Suggest a front for every landing node in `config`, in node order.
///
/// Nodes that cannot be paired (no region, several regions, no front,
/// ambiguous front) are skipped and explained in `log`. An empty result is
/// not an error.
pub fn auto_detect(config: &ChainConfig, rules: &PairingRules, log: &mut OperationLog) -> Vec<PairCandidate> {
    let mut pairs = Vec::new();
    let mut landing_count = 0usize;

    for (idx, node) in config.nodes().iter().enumerate() {
        if !rules.is_landing(&node.name, log) {
            continue;
        }
        landing_count += 1;
        log.info(format!("Processing landing node '{}' (index {})", node.name, idx));

        let regions = classify(&node.name, &rules.regions, log);
        let region_id = match regions.len() {
            0 => {
                log.warn(format!(
                    "No region identified for landing node '{}'; skipped",
                    node.name
                ));
                continue;
            }
            1 => regions.into_iter().next(),
            _ => {
                log.error(format!(
                    "Landing node '{}' matches several regions ({}); ambiguous, skipped",
                    node.name,
                    regions.into_iter().collect::<Vec<_>>().join(", ")
                ));
                continue;
            }
        };

        let Some(region) = region_id.as_deref().and_then(|id| rules.region(id)) else {
            log.error(format!(
                "Region {} of landing node '{}' is missing from the region table; skipped",
                region_id.as_deref().unwrap_or("?"),
                node.name
            ));
            continue;
        };

        match resolve_front(region, config.groups(), config.nodes(), &node.name, log) {
            Resolution::Unique(front) => {
                log.info(format!(
                    "Suggested pair: landing '{}' -> front '{}'",
                    node.name, front
                ));
                pairs.push(PairCandidate::new(node.name.clone(), front));
            }
            Resolution::NoneFound => {
                log.warn(format!(
                    "No front group or node found for landing node '{}' in region {}; skipped",
                    node.name, region.id
                ));
            }
            Resolution::Ambiguous(candidates) => {
                log.error(format!(
                    "Ambiguous front for landing node '{}' in region {}: candidates {}; skipped",
                    node.name,
                    region.id,
                    candidates.join(", ")
                ));
            }
        }
    }

    if landing_count == 0 {
        log.warn("No landing nodes found in the subscription");
    } else {
        log.info(format!(
            "Automatic detection finished: {} of {} landing node(s) paired",
            pairs.len(),
            landing_count
        ));
    }

    pairs
}
