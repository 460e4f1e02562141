//! Front-proxy resolution for a region.
//!
//! # Responsibilities
//! - Find the group whose name carries the region's keywords
//! - Fall back to a single bare node only when no group matches
//! - Report ambiguity instead of guessing
//!
//! # Design Decisions
//! - Groups are curated regional pools and always take precedence
//! - An ambiguous group phase is final; it never falls through to nodes
//! - The landing node itself is never a candidate

use crate::chain::keyword;
use crate::chain::model::{ProxyGroup, ProxyNode};
use crate::chain::oplog::OperationLog;
use crate::chain::region::RegionDefinition;

/// Outcome of a front lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one candidate.
    Unique(String),
    /// No group or node carries the region's keywords.
    NoneFound,
    /// More than one candidate in the deciding phase.
    Ambiguous(Vec<String>),
}

/// Resolve the front for `region`, preferring groups over nodes and skipping
/// the node named `exclude`.
pub fn resolve_front(
    region: &RegionDefinition,
    groups: &[ProxyGroup],
    nodes: &[ProxyNode],
    exclude: &str,
    log: &mut OperationLog,
) -> Resolution {
    let group_hits: Vec<String> = groups
        .iter()
        .filter(|g| keyword::first_match(&g.name, &region.keywords, log).is_some())
        .map(|g| g.name.clone())
        .collect();

    match group_hits.as_slice() {
        [] => {
            log.debug(format!(
                "No group matches region {} ({}); searching bare nodes",
                region.id, region.display_name
            ));
        }
        [only] => {
            log.info(format!("Region {} resolved to group '{}'", region.id, only));
            return Resolution::Unique(only.clone());
        }
        _ => {
            log.debug(format!(
                "Region {} matches {} groups: {}",
                region.id,
                group_hits.len(),
                group_hits.join(", ")
            ));
            return Resolution::Ambiguous(group_hits);
        }
    }

    let node_hits: Vec<String> = nodes
        .iter()
        .filter(|n| n.name != exclude)
        .filter(|n| keyword::first_match(&n.name, &region.keywords, log).is_some())
        .map(|n| n.name.clone())
        .collect();

    match node_hits.as_slice() {
        [] => Resolution::NoneFound,
        [only] => {
            log.info(format!("Region {} resolved to bare node '{}'", region.id, only));
            Resolution::Unique(only.clone())
        }
        _ => {
            log.debug(format!(
                "Region {} matches {} nodes: {}",
                region.id,
                node_hits.len(),
                node_hits.join(", ")
            ));
            Resolution::Ambiguous(node_hits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us() -> RegionDefinition {
        RegionDefinition::new("US", "United States", &["US"])
    }

    fn nodes(names: &[&str]) -> Vec<ProxyNode> {
        names.iter().map(|n| ProxyNode::named(*n)).collect()
    }

    #[test]
    fn test_group_preferred_over_node() {
        let mut log = OperationLog::new();
        let groups = vec![ProxyGroup::new("US-Group", ["US-01"])];
        let result = resolve_front(&us(), &groups, &nodes(&["US-Landing", "US-01"]), "US-Landing", &mut log);
        assert_eq!(result, Resolution::Unique("US-Group".into()));
    }

    #[test]
    fn test_ambiguous_groups_do_not_fall_back() {
        let mut log = OperationLog::new();
        let groups = vec![
            ProxyGroup::new("US-Auto", ["US-01"]),
            ProxyGroup::new("US-Select", ["US-01"]),
        ];
        let result = resolve_front(&us(), &groups, &nodes(&["US-Landing", "US-01"]), "US-Landing", &mut log);
        assert_eq!(
            result,
            Resolution::Ambiguous(vec!["US-Auto".into(), "US-Select".into()])
        );
    }

    #[test]
    fn test_single_node_fallback() {
        let mut log = OperationLog::new();
        let groups = vec![ProxyGroup::new("HK-Group", ["HK-01"])];
        let result = resolve_front(&us(), &groups, &nodes(&["US-Landing", "US-01", "HK-01"]), "US-Landing", &mut log);
        assert_eq!(result, Resolution::Unique("US-01".into()));
    }

    #[test]
    fn test_landing_excluded_from_nodes() {
        let mut log = OperationLog::new();
        let result = resolve_front(&us(), &[], &nodes(&["US-Landing"]), "US-Landing", &mut log);
        assert_eq!(result, Resolution::NoneFound);
    }

    #[test]
    fn test_ambiguous_nodes() {
        let mut log = OperationLog::new();
        let result = resolve_front(&us(), &[], &nodes(&["US-Landing", "US-01", "US-02"]), "US-Landing", &mut log);
        assert_eq!(
            result,
            Resolution::Ambiguous(vec!["US-01".into(), "US-02".into()])
        );
    }
}
