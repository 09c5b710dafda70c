use reqwest::StatusCode;
use thiserror::Error;

use super::request::ResponseBody;

/// Error code the server puts on a 401 body when the access token is
/// expired or invalid. Triggers the refresh-and-retry path.
const TOKEN_NOT_VALID: &str = "token_not_valid";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not logged in - no access token available")]
    Unauthenticated,

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Build an error from a non-success response, pulling the message out
    /// of the DRF-style body fields the server actually uses.
    pub fn from_response(status: StatusCode, body: &ResponseBody) -> Self {
        let json = body.json().cloned();
        let message = extract_message(status, json.as_ref());
        ApiError::Api {
            status,
            message,
            body: json,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Unauthenticated => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// 401 with the server's expired-token code. Handled internally by the
    /// refresh flow; callers only see it if refresh itself is impossible.
    pub(crate) fn is_token_expired(&self) -> bool {
        match self {
            ApiError::Api {
                status,
                body: Some(body),
                ..
            } => {
                *status == StatusCode::UNAUTHORIZED
                    && body.get("code").and_then(|c| c.as_str()) == Some(TOKEN_NOT_VALID)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err)
        }
    }
}

/// Error bodies vary across endpoints; check the known fields in order of
/// specificity and fall back to a synthesized status line.
fn extract_message(status: StatusCode, body: Option<&serde_json::Value>) -> String {
    if let Some(body) = body {
        for key in ["detail", "error", "non_field_errors"] {
            if let Some(value) = body.get(key) {
                return match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
            }
        }
    }
    format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}
