//! Chain proxy subscription converter library.
//!
//! The `chain` module is the pure engine; `subscription` wraps it with
//! fetching and YAML handling; `http` exposes it as a service.

pub mod chain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod subscription;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use subscription::{convert_document, Converter, PairSource, SubscriptionError};
