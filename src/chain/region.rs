//! Region definitions and node-name classification.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::chain::keyword::{self, Keyword};
use crate::chain::oplog::OperationLog;

/// Raw region entry as it appears in the service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegionSpec {
    /// Short identifier (e.g., "HK").
    pub id: String,

    /// Human-readable name used in log messages.
    pub display_name: String,

    /// Keywords that identify the region in node and group names.
    pub keywords: Vec<String>,
}

/// A compiled region: identifier plus its keyword matchers.
#[derive(Debug, Clone)]
pub struct RegionDefinition {
    pub id: String,
    pub display_name: String,
    pub keywords: Vec<Keyword>,
}

impl RegionDefinition {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            keywords: keyword::compile(keywords.iter().copied()),
        }
    }

    /// True if any of this region's keywords occurs in `name`.
    pub fn matches(&self, name: &str, log: &mut OperationLog) -> bool {
        keyword::first_match(name, &self.keywords, log).is_some()
    }
}

impl From<&RegionSpec> for RegionDefinition {
    fn from(spec: &RegionSpec) -> Self {
        Self {
            id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            keywords: keyword::compile(spec.keywords.iter().cloned()),
        }
    }
}

/// Built-in region table.
pub fn default_region_specs() -> Vec<RegionSpec> {
    fn spec(id: &str, display_name: &str, keywords: &[&str]) -> RegionSpec {
        RegionSpec {
            id: id.to_string(),
            display_name: display_name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    vec![
        spec("HK", "Hong Kong", &["HK", "HongKong", "Hong Kong", "香港", "🇭🇰"]),
        spec("US", "United States", &["US", "UnitedStates", "United States", "America", "美国", "🇺🇸"]),
        spec("JP", "Japan", &["JP", "Japan", "日本", "🇯🇵"]),
        spec("SG", "Singapore", &["SG", "Singapore", "新加坡", "🇸🇬"]),
        spec("TW", "Taiwan", &["TW", "Taiwan", "台湾", "🇹🇼"]),
        spec("KR", "Korea", &["KR", "Korea", "韩国", "🇰🇷"]),
    ]
}

/// Built-in landing-node keywords.
pub fn default_landing_keywords() -> Vec<String> {
    vec!["Landing".to_string(), "落地".to_string()]
}

/// Everything automatic pairing needs, compiled once at startup and passed
/// explicitly into engine calls.
#[derive(Debug, Clone)]
pub struct PairingRules {
    pub regions: Vec<RegionDefinition>,
    pub landing_keywords: Vec<Keyword>,
}

impl PairingRules {
    pub fn new(regions: Vec<RegionDefinition>, landing_keywords: Vec<Keyword>) -> Self {
        Self {
            regions,
            landing_keywords,
        }
    }

    pub fn from_specs(regions: &[RegionSpec], landing_keywords: &[String]) -> Self {
        Self {
            regions: regions.iter().map(RegionDefinition::from).collect(),
            landing_keywords: keyword::compile(landing_keywords.iter().cloned()),
        }
    }

    pub fn region(&self, id: &str) -> Option<&RegionDefinition> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Is `name` a landing node?
    pub fn is_landing(&self, name: &str, log: &mut OperationLog) -> bool {
        keyword::first_match(name, &self.landing_keywords, log).is_some()
    }
}

impl Default for PairingRules {
    fn default() -> Self {
        Self::from_specs(&default_region_specs(), &default_landing_keywords())
    }
}

/// Every region whose keywords occur in `name`. Picking a winner is the
/// caller's job.
pub fn classify(name: &str, regions: &[RegionDefinition], log: &mut OperationLog) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for region in regions {
        if let Some(hit) = keyword::first_match(name, &region.keywords, log) {
            log.debug(format!(
                "Name '{}' matched region {} ({}) via keyword '{}'",
                name,
                region.id,
                region.display_name,
                hit.as_str()
            ));
            found.insert(region.id.clone());
        }
    }
    found
}
