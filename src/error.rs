use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No server name")]
    MissingServerName,

    #[error("Invalid server name: {0}")]
    InvalidServerName(String),

    #[error("Server not running")]
    ServerNotRunning,

    #[error("{0} is disabled or invalid command")]
    CommandBlocked(String),

    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),

    #[error("File not found")]
    FileNotFound,

    #[error("tmux error: {0}")]
    Tmux(String),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Every failure renders as the `{success, error}` envelope. The panel keeps
/// a uniform 200 status; only the raw file read endpoint uses a real 404,
/// and it builds that response itself.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "Request failed");
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (StatusCode::OK, body).into_response()
    }
}
