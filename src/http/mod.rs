//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit, tracing)
//!     → handlers.rs (query/body extraction, converter calls)
//!     → subscription (fetch, engine, encode)
//!     → response.rs (JSON envelope or text/yaml, no-cache headers)
//!     → Send to client
//!
//! Static requests:
//!     → handlers.rs → static_files.rs (allow-list, containment check)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, HttpServer};
