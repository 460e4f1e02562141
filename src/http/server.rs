//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the API, YAML and static routes
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Build the shared converter from configuration
//! - Serve until the shutdown broadcast fires
//!
//! # Design Decisions
//! - `AppState` is cheap to clone; the converter and config sit behind `Arc`
//! - Request ID layer is outermost so every span and response carries it

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{request_id, request_id_header, UuidRequestId};
use crate::http::response::NO_CACHE;
use crate::http::static_files::StaticFiles;
use crate::subscription::{Converter, SubscriptionResult};

/// Largest accepted inbound request body.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub converter: Converter,
    pub static_files: Option<Arc<StaticFiles>>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> SubscriptionResult<Self> {
        let converter = Converter::new(&config.fetch, config.pairing.rules())?;
        let static_files = if config.static_files.enabled {
            StaticFiles::new(&config.static_files.dir).map(Arc::new)
        } else {
            tracing::info!("Static frontend disabled by configuration");
            None
        };

        Ok(Self {
            converter,
            static_files,
            config: Arc::new(config),
        })
    }
}

/// HTTP server for the subscription converter.
pub struct HttpServer {
    router: Router,
    config: Arc<ServiceConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> SubscriptionResult<Self> {
        let state = AppState::new(config)?;
        let config = state.config.clone();
        let router = build_router(state);
        Ok(Self { router, config })
    }

    /// The fully layered router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

    let api = Router::new()
        .route("/api/auto_detect_pairs", get(handlers::auto_detect_pairs))
        .route("/api/validate_configuration", post(handlers::validate_configuration))
        .route("/subscription.yaml", get(handlers::subscription_yaml))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_CACHE),
        ));

    Router::new()
        .merge(api)
        .route("/healthz", get(handlers::healthz))
        .route("/", get(handlers::index))
        .route("/{*path}", get(handlers::static_file))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(request_id_header()))
        .layer(SetRequestIdLayer::new(request_id_header(), UuidRequestId))
}
