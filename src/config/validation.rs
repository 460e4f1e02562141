//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Check the region table is usable (ids unique, keywords present)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("pairing.regions must define at least one region")]
    NoRegions,

    #[error("pairing.regions[{0}] has an empty id")]
    EmptyRegionId(usize),

    #[error("region id '{0}' is defined more than once")]
    DuplicateRegion(String),

    #[error("region '{0}' has no usable keywords")]
    NoRegionKeywords(String),

    #[error("pairing.landing_keywords has no usable keywords")]
    NoLandingKeywords,
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.fetch.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("fetch.timeout_secs"));
    }
    if config.fetch.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("fetch.max_body_bytes"));
    }

    let pairing = &config.pairing;
    if pairing.regions.is_empty() {
        errors.push(ValidationError::NoRegions);
    }

    let mut seen = HashSet::new();
    for (i, region) in pairing.regions.iter().enumerate() {
        let id = region.id.trim();
        if id.is_empty() {
            errors.push(ValidationError::EmptyRegionId(i));
            continue;
        }
        if !seen.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateRegion(id.to_string()));
        }
        if !has_usable_keyword(&region.keywords) {
            errors.push(ValidationError::NoRegionKeywords(id.to_string()));
        }
    }

    if !has_usable_keyword(&pairing.landing_keywords) {
        errors.push(ValidationError::NoLandingKeywords);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn has_usable_keyword(keywords: &[String]) -> bool {
    keywords.iter().any(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::region::RegionSpec;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.fetch.timeout_secs = 0;
        config.pairing.landing_keywords = vec!["  ".into()];
        config.pairing.regions.push(RegionSpec {
            id: "HK".into(),
            display_name: "Again".into(),
            keywords: vec![],
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::ZeroValue("fetch.timeout_secs")));
        assert!(errors.contains(&ValidationError::NoLandingKeywords));
        assert!(errors.contains(&ValidationError::DuplicateRegion("HK".into())));
        assert!(errors.contains(&ValidationError::NoRegionKeywords("HK".into())));
    }

    #[test]
    fn test_empty_region_table() {
        let mut config = ServiceConfig::default();
        config.pairing.regions.clear();
        assert_eq!(validate_config(&config).unwrap_err(), vec![ValidationError::NoRegions]);
    }
}
