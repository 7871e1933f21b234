use reqwest::StatusCode;
use serde::Deserialize;

use crate::bugs::models::BugStatus;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the bearer token (or the credentials).
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("session is no longer valid"))]
    Unauthorized(Option<String>),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Refused before sending: the backend does not take this status.
    #[error("Invalid status value")]
    InvalidStatus(BugStatus),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Message the server put in the response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(m) => m.as_deref(),
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Build an error from a non-success status and its raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized(message)
        } else {
            ApiError::Status { status, message }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// The backend reports failures as `{"error": "..."}`; some proxies use
/// `{"message": "..."}`. Prefer `message` when both are present.
pub fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
