//! Installs chain links into a config.
//!
//! # Responsibilities
//! - Point each landing node's `dialer-proxy` at its front
//! - Remove the landing node from its front group's member list so the group
//!   can never select the node that dials through it
//! - Report per-pair outcomes and the aggregate result
//!
//! # Design Decisions
//! - Unknown landing nodes are skipped, not fatal
//! - The run fails only when pairs were supplied and none applied
//! - A front name that is both a group and a node is treated as the group

use serde::Serialize;

use crate::chain::model::{ChainConfig, PairCandidate};
use crate::chain::oplog::OperationLog;

/// Aggregate result of one `apply_pairs` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Pairs supplied by the caller.
    pub requested: usize,
    /// Pairs whose landing node was found and linked.
    pub applied: usize,
    /// Pairs that were not applied, in input order.
    pub skipped: Vec<PairCandidate>,
    /// Group memberships removed to break dial loops.
    pub memberships_removed: usize,
}

impl ApplyReport {
    /// Zero pairs is a no-op success; otherwise at least one must apply.
    pub fn success(&self) -> bool {
        self.requested == 0 || self.applied > 0
    }

    pub fn is_partial(&self) -> bool {
        self.applied > 0 && !self.skipped.is_empty()
    }
}

/// Apply `pairs` to `config` in order.
pub fn apply_pairs(config: &mut ChainConfig, pairs: &[PairCandidate], log: &mut OperationLog) -> ApplyReport {
    let mut report = ApplyReport {
        requested: pairs.len(),
        ..ApplyReport::default()
    };

    if pairs.is_empty() {
        log.info("No pairs supplied; configuration left unchanged");
        return report;
    }

    for pair in pairs {
        match apply_one(config, pair, log) {
            Some(removed) => {
                report.applied += 1;
                if removed {
                    report.memberships_removed += 1;
                }
            }
            None => report.skipped.push(pair.clone()),
        }
    }

    if report.applied == 0 {
        log.error(format!(
            "None of the {} supplied pair(s) matched a landing node",
            report.requested
        ));
    } else if report.is_partial() {
        let skipped: Vec<String> = report.skipped.iter().map(|p| p.to_string()).collect();
        log.warn(format!(
            "Applied {} of {} pair(s); not applied: {}",
            report.applied,
            report.requested,
            skipped.join(", ")
        ));
    } else {
        log.info(format!("Applied all {} pair(s)", report.applied));
    }

    report
}

/// Returns `None` if the pair was not applied, else whether a group
/// membership was removed.
fn apply_one(config: &mut ChainConfig, pair: &PairCandidate, log: &mut OperationLog) -> Option<bool> {
    let landing = pair.landing.as_str();
    let front = pair.front.as_str();

    if landing == front {
        log.error(format!(
            "Pair '{}' would make node '{}' dial through itself; skipped",
            pair, landing
        ));
        return None;
    }

    let front_is_group = config.has_group(front);
    let front_is_node = config.has_node(front);

    let Some(node) = config.node_mut(landing) else {
        log.warn(format!(
            "Landing node '{}' not found in proxies; pair '{}' skipped",
            landing, pair
        ));
        return None;
    };

    if node.dialer_proxy.as_deref() == Some(front) {
        log.debug(format!("Landing node '{}' already dials through '{}'", landing, front));
    }
    node.dialer_proxy = Some(front.to_string());
    log.info(format!("Set dialer-proxy of '{}' to '{}'", landing, front));

    if !front_is_group {
        if front_is_node {
            log.info(format!(
                "Front '{}' is a node; no group membership to adjust",
                front
            ));
        } else {
            log.warn(format!(
                "Front '{}' for landing node '{}' is neither a known group nor a known node",
                front, landing
            ));
        }
        return Some(false);
    }

    if front_is_node {
        log.debug(format!(
            "Name '{}' exists as both a group and a node; treating it as the group",
            front
        ));
    }

    let Some(group) = config.group_mut(front) else {
        return Some(false);
    };

    let Some(members) = group.members.as_mut() else {
        log.warn(format!(
            "Front group '{}' for landing node '{}' has no member list",
            front, landing
        ));
        return Some(false);
    };

    let before = members.len();
    members.retain(|m| m != landing);
    if members.len() == before {
        return Some(false);
    }

    log.info(format!(
        "Removed landing node '{}' from members of front group '{}' to prevent a dial loop",
        landing, front
    ));
    Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::model::{ProxyGroup, ProxyNode};
    use crate::chain::oplog::LogLevel;

    fn scenario() -> ChainConfig {
        ChainConfig::new(
            vec![
                ProxyNode::named("US-Landing"),
                ProxyNode::named("US-01"),
                ProxyNode::named("HK-01"),
            ],
            vec![ProxyGroup::new("US-Group", ["US-01", "US-Landing"])],
            &mut OperationLog::new(),
        )
    }

    #[test]
    fn test_link_installed_and_loop_removed() {
        let mut config = scenario();
        let mut log = OperationLog::new();
        let report = apply_pairs(&mut config, &[PairCandidate::new("US-Landing", "US-Group")], &mut log);

        assert!(report.success());
        assert_eq!(report.applied, 1);
        assert_eq!(report.memberships_removed, 1);
        assert_eq!(
            config.node("US-Landing").unwrap().dialer_proxy.as_deref(),
            Some("US-Group")
        );
        assert_eq!(
            config.group("US-Group").unwrap().members.as_deref(),
            Some(&["US-01".to_string()][..])
        );
    }

    #[test]
    fn test_applying_twice_is_idempotent() {
        let pair = [PairCandidate::new("US-Landing", "US-Group")];

        let mut once = scenario();
        apply_pairs(&mut once, &pair, &mut OperationLog::new());

        let mut twice = scenario();
        apply_pairs(&mut twice, &pair, &mut OperationLog::new());
        let report = apply_pairs(&mut twice, &pair, &mut OperationLog::new());

        assert!(report.success());
        assert_eq!(report.memberships_removed, 0);
        assert_eq!(once.nodes(), twice.nodes());
        assert_eq!(once.groups(), twice.groups());
    }

    #[test]
    fn test_unknown_landing_fails_run() {
        let mut config = scenario();
        let mut log = OperationLog::new();
        let report = apply_pairs(&mut config, &[PairCandidate::new("Nonexistent", "US-Group")], &mut log);

        assert!(!report.success());
        assert_eq!(report.skipped.len(), 1);
        assert!(log.contains(LogLevel::Warn, "Landing node 'Nonexistent' not found"));
        assert!(config.nodes().iter().all(|n| n.dialer_proxy.is_none()));
    }

    #[test]
    fn test_partial_apply_is_success() {
        let mut config = scenario();
        let mut log = OperationLog::new();
        let report = apply_pairs(
            &mut config,
            &[
                PairCandidate::new("Nonexistent", "US-Group"),
                PairCandidate::new("US-Landing", "US-Group"),
            ],
            &mut log,
        );

        assert!(report.success());
        assert!(report.is_partial());
        assert_eq!(report.skipped, vec![PairCandidate::new("Nonexistent", "US-Group")]);
        assert_eq!(log.latest_problem().unwrap().level, LogLevel::Warn);
    }

    #[test]
    fn test_empty_pairs_is_noop_success() {
        let mut config = scenario();
        let report = apply_pairs(&mut config, &[], &mut OperationLog::new());
        assert!(report.success());
        assert_eq!(report.applied, 0);
    }

    #[test]
    fn test_node_front_leaves_groups_untouched() {
        let mut config = scenario();
        let mut log = OperationLog::new();
        apply_pairs(&mut config, &[PairCandidate::new("US-Landing", "HK-01")], &mut log);

        assert_eq!(config.node("US-Landing").unwrap().dialer_proxy.as_deref(), Some("HK-01"));
        assert!(config.group("US-Group").unwrap().contains("US-Landing"));
    }

    #[test]
    fn test_self_dial_rejected() {
        let mut config = scenario();
        let mut log = OperationLog::new();
        let report = apply_pairs(&mut config, &[PairCandidate::new("US-01", "US-01")], &mut log);

        assert!(!report.success());
        assert!(config.node("US-01").unwrap().dialer_proxy.is_none());
        assert!(log.contains(LogLevel::Error, "dial through itself"));
    }

    #[test]
    fn test_unknown_front_still_linked_with_warning() {
        let mut config = scenario();
        let mut log = OperationLog::new();
        let report = apply_pairs(&mut config, &[PairCandidate::new("US-Landing", "Elsewhere")], &mut log);

        assert!(report.success());
        assert_eq!(config.node("US-Landing").unwrap().dialer_proxy.as_deref(), Some("Elsewhere"));
        assert!(log.contains(LogLevel::Warn, "neither a known group nor a known node"));
    }

    #[test]
    fn test_group_wins_name_collision() {
        let mut log = OperationLog::new();
        let mut config = ChainConfig::new(
            vec![ProxyNode::named("L Landing"), ProxyNode::named("Shared")],
            vec![ProxyGroup::new("Shared", ["L Landing", "Shared"])],
            &mut log,
        );
        let report = apply_pairs(&mut config, &[PairCandidate::new("L Landing", "Shared")], &mut log);

        assert_eq!(report.memberships_removed, 1);
        assert!(!config.group("Shared").unwrap().contains("L Landing"));
        assert!(log.contains(LogLevel::Debug, "both a group and a node"));
    }
}
