//! Static frontend files.
//!
//! # Responsibilities
//! - Serve the configurator page and its assets from one directory
//! - Refuse file types outside an allow-list
//! - Refuse paths that resolve outside the directory (`..`, symlinks)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::response::plain_text;

/// Page served for `/`.
pub const INDEX_FILE: &str = "frontend.html";

/// Serves files below a canonical root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Returns `None` when `dir` does not exist.
    pub fn new(dir: impl AsRef<Path>) -> Option<Self> {
        let dir = dir.as_ref();
        match dir.canonicalize() {
            Ok(root) if root.is_dir() => Some(Self { root }),
            Ok(_) => {
                tracing::warn!(dir = %dir.display(), "Static path is not a directory; frontend disabled");
                None
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Static directory unavailable; frontend disabled");
                None
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serve `relative` (a request path without the leading `/`).
    pub async fn serve(&self, relative: &str) -> Response {
        let Some(content_type) = content_type(relative) else {
            tracing::warn!(path = %relative, "Attempt to access disallowed file type");
            return plain_text(StatusCode::FORBIDDEN, format!("File type not allowed: /{}", relative));
        };

        let candidate = self.root.join(relative);
        let resolved = match tokio::fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return plain_text(StatusCode::NOT_FOUND, format!("Resource not found: /{}", relative));
            }
            Err(e) => {
                tracing::error!(path = %candidate.display(), error = %e, "Failed to resolve static file");
                return plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Error serving file");
            }
        };

        if !resolved.starts_with(&self.root) {
            tracing::warn!(path = %resolved.display(), "Attempt to access file outside of static directory");
            return plain_text(StatusCode::FORBIDDEN, format!("Access denied to: /{}", relative));
        }

        match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                tracing::warn!(path = %resolved.display(), "Static path is not a file");
                return plain_text(StatusCode::NOT_FOUND, format!("Resource not found: /{}", relative));
            }
        }

        match tokio::fs::read(&resolved).await {
            Ok(bytes) => {
                tracing::debug!(path = %resolved.display(), "Serving static file");
                let mut response = (StatusCode::OK, bytes).into_response();
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
                response
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                plain_text(StatusCode::NOT_FOUND, format!("Resource not found: /{}", relative))
            }
            Err(e) => {
                tracing::error!(path = %resolved.display(), error = %e, "Failed to read static file");
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Error serving file")
            }
        }
    }
}

fn content_type(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "html" => Some("text/html; charset=utf-8"),
        "js" => Some("application/javascript; charset=utf-8"),
        "css" => Some("text/css; charset=utf-8"),
        _ => None,
    }
}
