//! Request handlers.
//!
//! # Responsibilities
//! - Translate query strings and JSON bodies into converter calls
//! - Map `SubscriptionError` to status codes and envelopes
//! - Record per-endpoint metrics and access details
//!
//! # Design Decisions
//! - Every handler owns a fresh `OperationLog`; nothing is shared across requests
//! - API endpoints always answer JSON, the YAML endpoint answers plain text on error

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::chain::{OperationLog, PairCandidate};
use crate::http::request::request_id;
use crate::http::response::{failure_message, plain_text, yaml, ApiResponse};
use crate::http::server::AppState;
use crate::http::static_files::INDEX_FILE;
use crate::observability::metrics;
use crate::subscription::{format_pairs, parse_pair_list, require_pairs, PairSource, SubscriptionError};

#[derive(Debug, Deserialize)]
pub struct DetectQuery {
    #[serde(default)]
    pub remote_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub remote_url: String,
    #[serde(default)]
    pub node_pairs: Vec<NodePair>,
}

/// One pair as sent by the frontend. Either side may be blank.
#[derive(Debug, Deserialize)]
pub struct NodePair {
    #[serde(default)]
    pub landing: String,
    #[serde(default)]
    pub front: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(default)]
    pub remote_url: String,
    pub manual_pairs: Option<String>,
    pub mode: Option<String>,
    pub manual_dialer_enabled: Option<String>,
}

impl SubscriptionQuery {
    /// `mode=auto` or the legacy `manual_dialer_enabled=0` selects detection.
    /// A non-blank `manual_pairs` with no well-formed entry is an input error.
    pub fn source(&self, log: &mut OperationLog) -> Result<PairSource, SubscriptionError> {
        let auto = self.mode.as_deref().map(str::trim) == Some("auto")
            || self.manual_dialer_enabled.as_deref().map(str::trim) == Some("0");
        if auto {
            return Ok(PairSource::Auto);
        }
        let pairs = match self.manual_pairs.as_deref() {
            Some(text) => parse_pair_list(text, log)?,
            None => Vec::new(),
        };
        Ok(PairSource::Manual(pairs))
    }
}

fn require_remote_url(remote_url: &str, log: &mut OperationLog) -> Result<String, SubscriptionError> {
    let trimmed = remote_url.trim();
    if trimmed.is_empty() {
        let err = SubscriptionError::MissingRemoteUrl;
        log.error(err.to_string());
        return Err(err);
    }
    Ok(trimmed.to_string())
}

/// `GET /api/auto_detect_pairs`
pub async fn auto_detect_pairs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DetectQuery>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);
    let mut log = OperationLog::new();

    let result = match require_remote_url(&query.remote_url, &mut log) {
        Ok(url) => state.converter.suggest(&url, &mut log).await,
        Err(e) => Err(e),
    };

    let (status, body) = match result {
        Ok(pairs) => {
            let message = if pairs.is_empty() {
                log.latest_problem()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "No landing/front pairs detected".to_string())
            } else {
                format!("Detected {} pair(s): {}", pairs.len(), format_pairs(&pairs))
            };
            metrics::record_pairs("suggest", pairs.len(), 0);
            (StatusCode::OK, ApiResponse::ok(message, log).with_pairs(pairs))
        }
        Err(e) => (e.status(), ApiResponse::failure(&e, log)),
    };

    tracing::info!(
        request_id = %request_id,
        status = status.as_u16(),
        success = body.success,
        "Auto-detect request finished"
    );
    metrics::record_request("auto_detect_pairs", status.as_u16(), start);
    body.into_response_with(status)
}

/// `POST /api/validate_configuration`
pub async fn validate_configuration(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);
    let mut log = OperationLog::new();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let status = StatusCode::BAD_REQUEST;
            metrics::record_request("validate_configuration", status.as_u16(), start);
            tracing::warn!(request_id = %request_id, error = %rejection.body_text(), "Rejected validation body");
            let body = ApiResponse::rejected(format!("Invalid request body: {}", rejection.body_text()), log);
            return body.into_response_with(status);
        }
    };

    let mut parsed = Vec::with_capacity(request.node_pairs.len());
    for pair in &request.node_pairs {
        let landing = pair.landing.trim();
        let front = pair.front.trim();
        if landing.is_empty() || front.is_empty() {
            log.warn(format!(
                "Incomplete pair (landing '{}', front '{}'), skipping",
                landing, front
            ));
            continue;
        }
        parsed.push(PairCandidate::new(landing, front));
    }

    let checked = require_pairs(parsed, request.node_pairs.len(), &mut log);
    let pair_count = checked.as_ref().map(Vec::len).unwrap_or(0);
    let result = match checked {
        Ok(pairs) => match require_remote_url(&request.remote_url, &mut log) {
            Ok(url) => state.converter.validate(&url, &pairs, &mut log).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let (status, body) = match result {
        Ok(report) => {
            metrics::record_pairs("validate", report.applied, report.skipped.len());
            let message = if report.requested == 0 {
                "No pairs to validate".to_string()
            } else if report.is_partial() {
                log.latest_problem()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| format!("Applied {} of {} pair(s)", report.applied, report.requested))
            } else {
                format!("All {} pair(s) are valid", report.applied)
            };
            (StatusCode::OK, ApiResponse::ok(message, log).with_report(report))
        }
        Err(e) => {
            if matches!(e, SubscriptionError::ApplyFailed(_)) {
                metrics::record_pairs("validate", 0, pair_count);
            }
            (e.status(), ApiResponse::failure(&e, log))
        }
    };

    tracing::info!(
        request_id = %request_id,
        status = status.as_u16(),
        pairs = pair_count,
        success = body.success,
        "Validation request finished"
    );
    metrics::record_request("validate_configuration", status.as_u16(), start);
    body.into_response_with(status)
}

/// `GET /subscription.yaml`
pub async fn subscription_yaml(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SubscriptionQuery>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);
    let mut log = OperationLog::new();

    let result = match query.source(&mut log) {
        Ok(source) => match require_remote_url(&query.remote_url, &mut log) {
            Ok(url) => state
                .converter
                .render(&url, &source, &mut log)
                .await
                .map(|conversion| (source, conversion)),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let response = match result {
        Ok((source, conversion)) => {
            metrics::record_pairs(
                source.mode(),
                conversion.report.applied,
                conversion.report.skipped.len(),
            );
            tracing::info!(
                request_id = %request_id,
                mode = source.mode(),
                applied = conversion.report.applied,
                requested = conversion.report.requested,
                "Subscription rendered"
            );
            yaml(conversion.yaml)
        }
        Err(e) => {
            if e.is_upstream() {
                tracing::warn!(request_id = %request_id, error = %e, "Upstream failure while rendering");
            } else {
                tracing::info!(request_id = %request_id, error = %e, "Subscription request rejected");
            }
            plain_text(e.status(), failure_message(&e, &log))
        }
    };

    metrics::record_request("subscription_yaml", response.status().as_u16(), start);
    response
}

/// `GET /healthz`
pub async fn healthz() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Response {
    serve_static(&state, INDEX_FILE).await
}

/// `GET /{*path}`
pub async fn static_file(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_static(&state, &path).await
}

async fn serve_static(state: &AppState, path: &str) -> Response {
    let start = Instant::now();
    let response = match &state.static_files {
        Some(files) => files.serve(path).await,
        None => plain_text(StatusCode::NOT_FOUND, format!("Resource not found: /{}", path)),
    };
    metrics::record_request("static", response.status().as_u16(), start);
    response
}

/// Fallback for every unmatched route.
pub async fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "Not Found")
}
