//! Keyword matching against node and group names.
//!
//! # Responsibilities
//! - Case-fold both sides before comparing
//! - Keywords containing an ASCII letter match only on ASCII-letter
//!   boundaries ("us" must not hit "house" or "plus")
//! - Keywords without ASCII letters (CJK, flag emoji) use plain containment
//!
//! # Design Decisions
//! - Keywords are compiled once when the pairing rules are built, not per name
//! - A keyword whose pattern fails to compile never matches; the failure is
//!   reported through the operation log instead of an error

use regex::{Regex, RegexBuilder};

use crate::chain::oplog::OperationLog;

/// Upper bound for a compiled boundary pattern.
const PATTERN_SIZE_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone)]
enum Pattern {
    /// Word-boundary regex over case-folded text.
    Boundary(Regex),
    /// Case-folded substring containment.
    Substring,
    /// Compilation failed; never matches.
    Invalid(String),
}

/// A precompiled matching keyword.
#[derive(Debug, Clone)]
pub struct Keyword {
    raw: String,
    folded: String,
    pattern: Pattern,
}

impl Keyword {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let folded = raw.to_lowercase();

        let pattern = if folded.chars().any(|c| c.is_ascii_alphabetic()) {
            let source = format!("(?:^|[^a-z]){}(?:[^a-z]|$)", regex::escape(&folded));
            match RegexBuilder::new(&source)
                .size_limit(PATTERN_SIZE_LIMIT)
                .build()
            {
                Ok(re) => Pattern::Boundary(re),
                Err(e) => {
                    tracing::warn!(keyword = %raw, error = %e, "Keyword pattern failed to compile");
                    Pattern::Invalid(e.to_string())
                }
            }
        } else {
            Pattern::Substring
        };

        Self { raw, folded, pattern }
    }

    /// The keyword as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when this keyword is enforced on ASCII-letter boundaries.
    pub fn is_boundary(&self) -> bool {
        matches!(self.pattern, Pattern::Boundary(_))
    }

    /// Does `text` contain this keyword?
    pub fn matches(&self, text: &str, log: &mut OperationLog) -> bool {
        match &self.pattern {
            Pattern::Boundary(re) => re.is_match(&text.to_lowercase()),
            Pattern::Substring => text.to_lowercase().contains(&self.folded),
            Pattern::Invalid(reason) => {
                log.error(format!(
                    "Keyword '{}' is unusable and was treated as non-matching against '{}': {}",
                    self.raw, text, reason
                ));
                false
            }
        }
    }
}

impl From<&str> for Keyword {
    fn from(raw: &str) -> Self {
        Keyword::new(raw)
    }
}

impl From<String> for Keyword {
    fn from(raw: String) -> Self {
        Keyword::new(raw)
    }
}

/// Compile a list of raw keywords.
pub fn compile<I, S>(raw: I) -> Vec<Keyword>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    raw.into_iter().map(|s| Keyword::new(s)).collect()
}

/// Returns the first keyword in `keywords` that matches `text`.
pub fn first_match<'k>(
    text: &str,
    keywords: &'k [Keyword],
    log: &mut OperationLog,
) -> Option<&'k Keyword> {
    keywords.iter().find(|k| k.matches(text, log))
}

/// One-shot match without a precompiled keyword.
pub fn matches(text: &str, keyword: &str, log: &mut OperationLog) -> bool {
    Keyword::new(keyword).matches(text, log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::oplog::LogLevel;

    fn check(text: &str, keyword: &str) -> bool {
        matches(text, keyword, &mut OperationLog::new())
    }

    #[test]
    fn test_ascii_keyword_needs_boundaries() {
        assert!(!check("Housing", "us"));
        assert!(!check("Plus Node", "us"));
        assert!(check("US-Node", "us"));
        assert!(check("node us", "US"));
        assert!(check("us", "us"));
        assert!(check("[US]01", "us"));
    }

    #[test]
    fn test_digits_count_as_boundaries() {
        assert!(check("US01", "us"));
        assert!(check("01US", "us"));
        assert!(!check("USA", "us"));
    }

    #[test]
    fn test_multiword_keyword() {
        assert!(check("Hong Kong 02", "hong kong"));
        assert!(!check("HongKongX", "hongkong"));
        assert!(check("hongkong-01", "HongKong"));
    }

    #[test]
    fn test_non_ascii_keyword_is_substring() {
        assert!(check("香港节点01", "香港"));
        assert!(check("🇺🇸 Relay", "🇺🇸"));
        assert!(!check("日本", "香港"));
    }

    #[test]
    fn test_mixed_script_keyword_uses_boundaries() {
        assert!(check("美国US落地", "US落地"));
        assert!(!check("PLUS落地", "US落地"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(check("Node (HK)", "(hk)"));
        assert!(!check("Node hk", "h.k"));
        assert!(check("a+b relay", "a+b"));
    }

    #[test]
    fn test_oversized_keyword_never_matches() {
        let huge = "a".repeat(200_000);
        let keyword = Keyword::new(huge.clone());
        assert!(!keyword.is_boundary());

        let mut log = OperationLog::new();
        assert!(!keyword.matches(&huge, &mut log));
        assert_eq!(log.count_at_least(LogLevel::Error), 1);
    }

    #[test]
    fn test_first_match_order() {
        let keywords = compile(["Landing", "落地"]);
        let mut log = OperationLog::new();
        let hit = first_match("HK 落地 landing", &keywords, &mut log).unwrap();
        assert_eq!(hit.as_str(), "Landing");
        assert!(first_match("HK-01", &keywords, &mut log).is_none());
    }
}
