//! Response envelopes.
//!
//! # Responsibilities
//! - JSON envelope for the API endpoints: success flag, message, log trace
//! - Plain-text responses for the YAML endpoint and errors
//!
//! # Design Decisions
//! - The operation log is part of every API response, success or failure
//! - Failure messages come from the latest WARN/ERROR log entry

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::chain::{ApplyReport, LogEntry, OperationLog, PairCandidate};
use crate::subscription::SubscriptionError;

/// Cache policy for generated content.
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// JSON body returned by the `/api/*` endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_pairs: Option<Vec<PairCandidate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ApplyReport>,
    pub logs: Vec<LogEntry>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, log: OperationLog) -> Self {
        Self {
            success: true,
            message: message.into(),
            suggested_pairs: None,
            report: None,
            logs: log.into_entries(),
        }
    }

    pub fn failure(error: &SubscriptionError, log: OperationLog) -> Self {
        Self {
            success: false,
            message: failure_message(error, &log),
            suggested_pairs: None,
            report: None,
            logs: log.into_entries(),
        }
    }

    /// Failure that has no [`SubscriptionError`], e.g. a rejected request body.
    pub fn rejected(message: impl Into<String>, mut log: OperationLog) -> Self {
        let message = message.into();
        log.error(message.clone());
        Self {
            success: false,
            message,
            suggested_pairs: None,
            report: None,
            logs: log.into_entries(),
        }
    }

    pub fn with_pairs(mut self, pairs: Vec<PairCandidate>) -> Self {
        self.suggested_pairs = Some(pairs);
        self
    }

    pub fn with_report(mut self, report: ApplyReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Latest WARN/ERROR line, falling back to the error itself.
pub fn failure_message(error: &SubscriptionError, log: &OperationLog) -> String {
    log.latest_problem()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| error.to_string())
}

/// `text/plain` response with caching disabled.
pub fn plain_text(status: StatusCode, message: impl Into<String>) -> Response {
    let mut response = (status, message.into()).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    response
}

/// `text/yaml` response with caching disabled.
pub fn yaml(body: String) -> Response {
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/yaml; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    response
}
