//! Subscription document decoding and encoding.
//!
//! Only the `proxies` and `proxy-groups` sections are interpreted. Every
//! other top-level key is carried through in its original position.

use serde::{de::DeserializeOwned, Serialize};
use serde_yaml::{Mapping, Value};

use crate::chain::model::{ChainConfig, ProxyGroup, ProxyNode};
use crate::chain::oplog::OperationLog;
use crate::subscription::error::{SubscriptionError, SubscriptionResult};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";
const PROXIES_KEY: &str = "proxies";
const GROUPS_KEY: &str = "proxy-groups";

/// A decoded subscription document.
#[derive(Debug, Clone)]
pub struct SubscriptionDocument {
    root: Mapping,
}

impl SubscriptionDocument {
    /// Decode raw bytes: strip a UTF-8 BOM, require UTF-8, parse YAML, and
    /// check the minimal shape (non-empty `proxies` sequence).
    pub fn parse(bytes: &[u8], log: &mut OperationLog) -> SubscriptionResult<Self> {
        let bytes = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => {
                log.info("UTF-8 BOM detected and removed from remote content");
                rest
            }
            None => bytes,
        };

        let text = std::str::from_utf8(bytes)
            .map_err(|e| invalid(log, format!("content is not valid UTF-8: {}", e)))?;

        let value: Value = serde_yaml::from_str(text)
            .map_err(|e| invalid(log, format!("YAML parse error: {}", e)))?;

        let Value::Mapping(root) = value else {
            return Err(invalid(log, "top level is not a mapping".to_string()));
        };

        match root.get(PROXIES_KEY) {
            Some(Value::Sequence(seq)) if !seq.is_empty() => {}
            Some(Value::Sequence(_)) => {
                return Err(invalid(log, "'proxies' section is empty".to_string()));
            }
            Some(_) => {
                return Err(invalid(log, "'proxies' section is not a list".to_string()));
            }
            None => {
                return Err(invalid(log, "missing 'proxies' section".to_string()));
            }
        }

        match root.get(GROUPS_KEY) {
            None | Some(Value::Null) => {
                log.info("No 'proxy-groups' section; treating it as empty");
            }
            Some(Value::Sequence(_)) => {}
            Some(_) => {
                return Err(invalid(log, "'proxy-groups' section is not a list".to_string()));
            }
        }

        Ok(Self { root })
    }

    /// Extract the engine model. Entries without a usable name are logged
    /// and left out of the model; `store` writes them back untouched.
    pub fn chain_config(&self, log: &mut OperationLog) -> SubscriptionResult<ChainConfig> {
        let nodes: Vec<ProxyNode> = decode_section(self.root.get(PROXIES_KEY))
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| usable(entry, "proxies", i, log))
            .collect();

        let groups: Vec<ProxyGroup> = decode_section(self.root.get(GROUPS_KEY))
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| usable(entry, "proxy-groups", i, log))
            .collect();

        log.info(format!(
            "Subscription contains {} node(s) and {} group(s)",
            nodes.len(),
            groups.len()
        ));
        Ok(ChainConfig::new(nodes, groups, log))
    }

    /// Write the (possibly mutated) model back in place.
    pub fn store(&mut self, config: ChainConfig) -> SubscriptionResult<()> {
        let (nodes, groups) = config.into_parts();

        let nodes = merge_section::<ProxyNode>(self.root.get(PROXIES_KEY), nodes)?;
        self.root.insert(Value::String(PROXIES_KEY.to_string()), nodes);

        if !groups.is_empty() || self.root.contains_key(GROUPS_KEY) {
            let groups = merge_section::<ProxyGroup>(self.root.get(GROUPS_KEY), groups)?;
            self.root.insert(Value::String(GROUPS_KEY.to_string()), groups);
        }
        Ok(())
    }

    /// Serialize the document to YAML text.
    pub fn to_yaml(&self) -> SubscriptionResult<String> {
        serde_yaml::to_string(&self.root).map_err(|e| SubscriptionError::Encode(e.to_string()))
    }
}

/// Entries the engine can address by name.
trait Named: DeserializeOwned + Serialize {
    fn name(&self) -> &str;
}

impl Named for ProxyNode {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ProxyGroup {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Decode every entry of a section, keeping failures in place.
fn decode_section<T: Named>(section: Option<&Value>) -> Vec<Result<T, String>> {
    let Some(Value::Sequence(entries)) = section else {
        return Vec::new();
    };
    entries
        .iter()
        .map(|entry| {
            let item: T = serde_yaml::from_value(entry.clone()).map_err(|e| e.to_string())?;
            if item.name().trim().is_empty() {
                return Err("empty name".to_string());
            }
            Ok(item)
        })
        .collect()
}

fn usable<T>(entry: Result<T, String>, section: &str, position: usize, log: &mut OperationLog) -> Option<T> {
    match entry {
        Ok(item) => Some(item),
        Err(reason) => {
            log.warn(format!(
                "Entry {} in '{}' has no usable name ({}); left unchanged",
                position, section, reason
            ));
            None
        }
    }
}

/// Rebuild a section: usable entries come from `items` in order, skipped
/// entries keep their original value.
fn merge_section<T: Named>(original: Option<&Value>, items: Vec<T>) -> SubscriptionResult<Value> {
    let encode = |item: &T| serde_yaml::to_value(item).map_err(|e| SubscriptionError::Encode(e.to_string()));

    let Some(Value::Sequence(entries)) = original else {
        let values = items.iter().map(encode).collect::<SubscriptionResult<Vec<_>>>()?;
        return Ok(Value::Sequence(values));
    };

    let mut items = items.into_iter();
    let mut merged = Vec::with_capacity(entries.len());
    for (entry, decoded) in entries.iter().zip(decode_section::<T>(original)) {
        match decoded {
            Ok(_) => match items.next() {
                Some(item) => merged.push(encode(&item)?),
                None => merged.push(entry.clone()),
            },
            Err(_) => merged.push(entry.clone()),
        }
    }
    Ok(Value::Sequence(merged))
}

fn invalid(log: &mut OperationLog, reason: String) -> SubscriptionError {
    log.error(format!("Invalid subscription document: {}", reason));
    SubscriptionError::InvalidDocument(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::model::PairCandidate;
    use crate::chain::applier::apply_pairs;
    use crate::chain::oplog::LogLevel;

    const DOC: &str = "\
port: 7890
proxies:
  - name: US-Landing
    type: ss
    server: 10.0.0.1
    port: 443
  - name: US-01
    type: vmess
    server: 10.0.0.2
    port: 443
proxy-groups:
  - name: US-Group
    type: select
    proxies:
      - US-01
      - US-Landing
rules:
  - MATCH,US-Group
";

    #[test]
    fn test_parse_and_extract() {
        let mut log = OperationLog::new();
        let doc = SubscriptionDocument::parse(DOC.as_bytes(), &mut log).unwrap();
        let config = doc.chain_config(&mut log).unwrap();
        assert_eq!(config.nodes().len(), 2);
        assert_eq!(config.groups().len(), 1);
        assert!(config.group("US-Group").unwrap().contains("US-Landing"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(DOC.as_bytes());

        let mut log = OperationLog::new();
        assert!(SubscriptionDocument::parse(&bytes, &mut log).is_ok());
        assert!(log.contains(LogLevel::Info, "BOM"));
    }

    #[test]
    fn test_shape_errors() {
        let cases = [
            "- just\n- a list\n",
            "rules: []\n",
            "proxies: []\n",
            "proxies: nope\n",
            "proxies:\n  - name: a\nproxy-groups: 3\n",
        ];
        for case in cases {
            let mut log = OperationLog::new();
            let err = SubscriptionDocument::parse(case.as_bytes(), &mut log).unwrap_err();
            assert!(matches!(err, SubscriptionError::InvalidDocument(_)), "case: {case}");
            assert_eq!(log.latest_problem().unwrap().level, LogLevel::Error);
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let mut log = OperationLog::new();
        let err = SubscriptionDocument::parse(&[0x70, 0xff, 0xfe], &mut log).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_missing_groups_is_empty() {
        let mut log = OperationLog::new();
        let doc = SubscriptionDocument::parse(b"proxies:\n  - name: a\n", &mut log).unwrap();
        let config = doc.chain_config(&mut log).unwrap();
        assert!(config.groups().is_empty());

        let mut doc = doc;
        doc.store(config).unwrap();
        assert!(!doc.to_yaml().unwrap().contains("proxy-groups"));
    }

    #[test]
    fn test_numeric_names_are_converted() {
        let yaml = "proxies:\n  - {name: 123, type: ss}\n  - {name: US-01, type: ss}\nproxy-groups:\n  - {name: 456, type: select, proxies: [123, US-01]}\n";
        let mut log = OperationLog::new();
        let mut doc = SubscriptionDocument::parse(yaml.as_bytes(), &mut log).unwrap();
        let mut config = doc.chain_config(&mut log).unwrap();
        assert!(config.has_node("123"));
        assert!(config.group("456").unwrap().contains("123"));

        let report = apply_pairs(&mut config, &[PairCandidate::new("123", "456")], &mut log);
        assert_eq!(report.applied, 1);
        doc.store(config).unwrap();
        let out: Value = serde_yaml::from_str(&doc.to_yaml().unwrap()).unwrap();
        assert_eq!(out["proxies"][0]["dialer-proxy"], Value::from("456"));
    }

    #[test]
    fn test_nameless_entries_left_untouched() {
        let yaml = "\
proxies:
  - {name: US-Landing, type: ss}
  - {type: ss, server: 10.9.9.9}
  - {name: US-01, type: ss}
proxy-groups:
  - {type: select, use: [provider-a]}
  - {name: US-Group, type: select, proxies: [US-01, US-Landing]}
";
        let mut log = OperationLog::new();
        let mut doc = SubscriptionDocument::parse(yaml.as_bytes(), &mut log).unwrap();
        let mut config = doc.chain_config(&mut log).unwrap();
        assert_eq!(config.nodes().len(), 2);
        assert_eq!(config.groups().len(), 1);
        assert!(log.contains(LogLevel::Warn, "Entry 0 in 'proxy-groups' has no usable name"));
        assert!(log.contains(LogLevel::Warn, "Entry 1 in 'proxies' has no usable name"));

        apply_pairs(&mut config, &[PairCandidate::new("US-Landing", "US-Group")], &mut log);
        doc.store(config).unwrap();

        let out: Value = serde_yaml::from_str(&doc.to_yaml().unwrap()).unwrap();
        let proxies = out["proxies"].as_sequence().unwrap();
        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies[0]["dialer-proxy"], Value::from("US-Group"));
        assert_eq!(proxies[1]["server"], Value::from("10.9.9.9"));
        assert!(proxies[1].get("name").is_none());
        let groups = out["proxy-groups"].as_sequence().unwrap();
        assert_eq!(groups[0]["use"][0], Value::from("provider-a"));
        assert_eq!(groups[1]["name"], Value::from("US-Group"));
    }

    #[test]
    fn test_store_keeps_other_sections() {
        let mut log = OperationLog::new();
        let mut doc = SubscriptionDocument::parse(DOC.as_bytes(), &mut log).unwrap();
        let mut config = doc.chain_config(&mut log).unwrap();
        apply_pairs(&mut config, &[PairCandidate::new("US-Landing", "US-Group")], &mut log);
        doc.store(config).unwrap();

        let yaml = doc.to_yaml().unwrap();
        assert!(yaml.starts_with("port: 7890"));
        assert!(yaml.contains("dialer-proxy: US-Group"));
        assert!(yaml.contains("MATCH,US-Group"));
        assert!(yaml.find("proxies:").unwrap() < yaml.find("rules:").unwrap());

        let reparsed = SubscriptionDocument::parse(yaml.as_bytes(), &mut log).unwrap();
        let config = reparsed.chain_config(&mut log).unwrap();
        assert_eq!(
            config.group("US-Group").unwrap().members.as_deref(),
            Some(&["US-01".to_string()][..])
        );
        assert_eq!(config.node("US-01").unwrap().extra.get("server"), Some(&Value::from("10.0.0.2")));
    }
}
