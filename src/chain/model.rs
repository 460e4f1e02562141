//! In-memory model of the proxy nodes and groups of one subscription.
//!
//! Nodes and groups reference each other only by name. `ChainConfig` keeps a
//! name → position index per namespace so lookups never walk the lists.

use std::collections::HashMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::chain::oplog::OperationLog;

/// A proxy endpoint. Only `dialer_proxy` is ever changed by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProxyNode {
    #[serde(deserialize_with = "scalar_name")]
    pub name: String,

    /// Fields the engine does not interpret (type, server, port, ...).
    #[serde(flatten)]
    pub extra: Mapping,

    /// Node or group this node dials through.
    #[serde(rename = "dialer-proxy", default, skip_serializing_if = "Option::is_none")]
    pub dialer_proxy: Option<String>,
}

impl ProxyNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Mapping::new(),
            dialer_proxy: None,
        }
    }
}

/// A named selection of nodes/groups.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProxyGroup {
    #[serde(deserialize_with = "scalar_name")]
    pub name: String,

    #[serde(flatten)]
    pub extra: Mapping,

    /// Member names. `None` for groups fed by providers instead of a list.
    #[serde(
        rename = "proxies",
        default,
        deserialize_with = "scalar_members",
        skip_serializing_if = "Option::is_none"
    )]
    pub members: Option<Vec<String>>,
}

impl ProxyGroup {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            extra: Mapping::new(),
            members: Some(members.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members
            .as_ref()
            .map(|m| m.iter().any(|n| n == member))
            .unwrap_or(false)
    }
}

/// A suggested or requested chain link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PairCandidate {
    pub landing: String,
    pub front: String,
}

impl PairCandidate {
    pub fn new(landing: impl Into<String>, front: impl Into<String>) -> Self {
        Self {
            landing: landing.into(),
            front: front.into(),
        }
    }
}

impl std::fmt::Display for PairCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.landing, self.front)
    }
}

/// Unquoted YAML scalars (`name: 123`, `name: true`) are names too.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).ok_or_else(|| de::Error::custom("name is not a scalar"))
}

fn scalar_members<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(values) = Option::<Vec<Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    values
        .into_iter()
        .map(|v| scalar_to_string(v).ok_or_else(|| de::Error::custom("member name is not a scalar")))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Nodes and groups of one request, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct ChainConfig {
    nodes: Vec<ProxyNode>,
    groups: Vec<ProxyGroup>,
    node_index: HashMap<String, usize>,
    group_index: HashMap<String, usize>,
}

impl ChainConfig {
    /// Build the config and its indices. For duplicate names the first
    /// occurrence wins; later ones are reported to `log`.
    pub fn new(nodes: Vec<ProxyNode>, groups: Vec<ProxyGroup>, log: &mut OperationLog) -> Self {
        let node_index = index_by_name(nodes.iter().map(|n| n.name.as_str()), "node", log);
        let group_index = index_by_name(groups.iter().map(|g| g.name.as_str()), "group", log);

        Self {
            nodes,
            groups,
            node_index,
            group_index,
        }
    }

    pub fn nodes(&self) -> &[ProxyNode] {
        &self.nodes
    }

    pub fn groups(&self) -> &[ProxyGroup] {
        &self.groups
    }

    pub fn node(&self, name: &str) -> Option<&ProxyNode> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut ProxyNode> {
        match self.node_index.get(name) {
            Some(&i) => self.nodes.get_mut(i),
            None => None,
        }
    }

    pub fn group(&self, name: &str) -> Option<&ProxyGroup> {
        self.group_index.get(name).map(|&i| &self.groups[i])
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut ProxyGroup> {
        match self.group_index.get(name) {
            Some(&i) => self.groups.get_mut(i),
            None => None,
        }
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group_index.contains_key(name)
    }

    pub fn into_parts(self) -> (Vec<ProxyNode>, Vec<ProxyGroup>) {
        (self.nodes, self.groups)
    }
}

fn index_by_name<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &str,
    log: &mut OperationLog,
) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, name) in names.enumerate() {
        if index.contains_key(name) {
            log.warn(format!(
                "Duplicate {} name '{}' at position {}; only the first occurrence is used",
                kind, name, i
            ));
            continue;
        }
        index.insert(name.to_string(), i);
    }
    index
}
