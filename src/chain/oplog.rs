//! Per-request operation log.
//!
//! # Responsibilities
//! - Record every classification / resolution / apply decision in order
//! - Carry the trace back to the caller as data (part of the API response)
//! - Surface the most recent WARN/ERROR as the human-readable failure message
//!
//! # Design Decisions
//! - One log per request, threaded through engine calls by `&mut`
//! - Entries are mirrored to `tracing` so process logs see the same events;
//!   the mirror never feeds back into control flow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// A single recorded decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// Ordered trace of one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationLog {
    entries: Vec<LogEntry>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and mirror it to the process log.
    pub fn record(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Debug => tracing::debug!(target: "chain_subconverter::oplog", "{}", message),
            LogLevel::Info => tracing::info!(target: "chain_subconverter::oplog", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "chain_subconverter::oplog", "{}", message),
            LogLevel::Error => tracing::error!(target: "chain_subconverter::oplog", "{}", message),
        }
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            level,
            message,
        });
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Error, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent WARN or ERROR entry, used to build caller-facing messages.
    pub fn latest_problem(&self) -> Option<&LogEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.level >= LogLevel::Warn)
    }

    /// Number of entries at or above `level`.
    pub fn count_at_least(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level >= level).count()
    }

    /// True if any entry at exactly `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}
