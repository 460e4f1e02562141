//! Subscription conversion: the boundary around the pairing engine.
//!
//! # Data Flow
//! ```text
//! remote_url
//!     → fetch.rs (validate URL, bounded download)
//!     → document.rs (BOM strip, UTF-8, YAML, shape check)
//!     → chain engine (auto_detect and/or apply_pairs)
//!     → document.rs (write back proxies / proxy-groups, encode YAML)
//! ```
//!
//! # Design Decisions
//! - Each call is request-scoped; only the compiled rules are shared
//! - Total apply failure is an error; partial apply is a success with warnings

pub mod document;
pub mod error;
pub mod fetch;
pub mod pairs;

use std::sync::Arc;

use crate::chain::{apply_pairs, auto_detect, ApplyReport, OperationLog, PairCandidate, PairingRules};
use crate::config::FetchConfig;

pub use document::SubscriptionDocument;
pub use error::{SubscriptionError, SubscriptionResult};
pub use fetch::{parse_remote_url, Fetcher};
pub use pairs::{format_pairs, parse_pair_list, parse_pairs, require_pairs};

/// Where the pairs to apply come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairSource {
    /// Caller-supplied pairs, applied in order.
    Manual(Vec<PairCandidate>),
    /// Run automatic detection and apply its suggestions.
    Auto,
}

impl PairSource {
    pub fn mode(&self) -> &'static str {
        match self {
            PairSource::Manual(_) => "manual",
            PairSource::Auto => "auto",
        }
    }
}

/// Result of a full conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub yaml: String,
    pub pairs: Vec<PairCandidate>,
    pub report: ApplyReport,
}

/// Run the engine over raw document bytes.
pub fn convert_document(
    bytes: &[u8],
    source: &PairSource,
    rules: &PairingRules,
    log: &mut OperationLog,
) -> SubscriptionResult<Conversion> {
    let mut document = SubscriptionDocument::parse(bytes, log)?;
    let mut config = document.chain_config(log)?;

    let pairs = match source {
        PairSource::Manual(pairs) => {
            log.info(format!("Using manual mode with {} pair(s)", pairs.len()));
            pairs.clone()
        }
        PairSource::Auto => {
            log.info("Using automatic mode");
            auto_detect(&config, rules, log)
        }
    };

    let report = apply_pairs(&mut config, &pairs, log);
    if !report.success() {
        return Err(apply_failure(log));
    }

    document.store(config)?;
    let yaml = document.to_yaml()?;

    Ok(Conversion { yaml, pairs, report })
}

fn apply_failure(log: &OperationLog) -> SubscriptionError {
    let message = log
        .latest_problem()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| "No pair could be applied".to_string());
    SubscriptionError::ApplyFailed(message)
}

/// Fetches subscriptions and runs them through the engine.
#[derive(Clone)]
pub struct Converter {
    fetcher: Fetcher,
    rules: Arc<PairingRules>,
}

impl Converter {
    pub fn new(fetch: &FetchConfig, rules: PairingRules) -> SubscriptionResult<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch)?,
            rules: Arc::new(rules),
        })
    }

    pub fn rules(&self) -> &PairingRules {
        &self.rules
    }

    async fn download(&self, remote_url: &str, log: &mut OperationLog) -> SubscriptionResult<Vec<u8>> {
        let url = match parse_remote_url(remote_url) {
            Ok(url) => url,
            Err(e) => {
                log.error(e.to_string());
                return Err(e);
            }
        };
        self.fetcher.fetch(&url, log).await
    }

    /// Suggest pairs for the document at `remote_url`.
    pub async fn suggest(&self, remote_url: &str, log: &mut OperationLog) -> SubscriptionResult<Vec<PairCandidate>> {
        let bytes = self.download(remote_url, log).await?;
        let document = SubscriptionDocument::parse(&bytes, log)?;
        let config = document.chain_config(log)?;
        Ok(auto_detect(&config, &self.rules, log))
    }

    /// Check that `pairs` apply to the document at `remote_url`.
    pub async fn validate(
        &self,
        remote_url: &str,
        pairs: &[PairCandidate],
        log: &mut OperationLog,
    ) -> SubscriptionResult<ApplyReport> {
        let bytes = self.download(remote_url, log).await?;
        let document = SubscriptionDocument::parse(&bytes, log)?;
        let mut config = document.chain_config(log)?;

        let report = apply_pairs(&mut config, pairs, log);
        if report.success() {
            Ok(report)
        } else {
            Err(apply_failure(log))
        }
    }

    /// Fetch, rewrite, and encode the document at `remote_url`.
    pub async fn render(
        &self,
        remote_url: &str,
        source: &PairSource,
        log: &mut OperationLog,
    ) -> SubscriptionResult<Conversion> {
        let bytes = self.download(remote_url, log).await?;
        convert_document(&bytes, source, &self.rules, log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::LogLevel;

    const DOC: &str = "\
proxies:
  - {name: US-Landing, type: ss}
  - {name: US-01, type: ss}
  - {name: HK-01, type: ss}
proxy-groups:
  - {name: US-Group, type: select, proxies: [US-01, US-Landing]}
";

    #[test]
    fn test_auto_conversion() {
        let mut log = OperationLog::new();
        let out = convert_document(DOC.as_bytes(), &PairSource::Auto, &PairingRules::default(), &mut log).unwrap();
        assert_eq!(out.pairs, vec![PairCandidate::new("US-Landing", "US-Group")]);
        assert_eq!(out.report.applied, 1);
        assert!(out.yaml.contains("dialer-proxy: US-Group"));
    }

    #[test]
    fn test_manual_total_failure() {
        let mut log = OperationLog::new();
        let source = PairSource::Manual(vec![PairCandidate::new("Nonexistent", "US-Group")]);
        let err = convert_document(DOC.as_bytes(), &source, &PairingRules::default(), &mut log).unwrap_err();
        assert!(matches!(err, SubscriptionError::ApplyFailed(_)));
        assert!(log.contains(LogLevel::Warn, "Landing node 'Nonexistent' not found"));
    }

    #[test]
    fn test_manual_empty_returns_document_unchanged() {
        let mut log = OperationLog::new();
        let out = convert_document(DOC.as_bytes(), &PairSource::Manual(Vec::new()), &PairingRules::default(), &mut log)
            .unwrap();
        assert!(!out.yaml.contains("dialer-proxy"));
        assert!(out.report.success());
    }

    #[test]
    fn test_converter_builds() {
        let converter = Converter::new(&FetchConfig::default(), PairingRules::default()).unwrap();
        assert_eq!(converter.rules().regions.len(), 6);
    }
}
