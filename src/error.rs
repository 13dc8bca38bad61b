use serde::Deserialize;
use thiserror::Error;

/// Shown when the backend gives no usable message.
pub const TRY_AGAIN: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

impl ApiError {
    /// Maps a non-success response to the error taxonomy. The message comes
    /// from the `error` or `detail` field of a JSON body when there is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.error.or(body.detail))
            .unwrap_or_default();

        match status {
            400 => Self::Validation(message),
            401 | 403 => Self::Auth(message),
            404 => Self::NotFound(message),
            status => Self::Server { status, message },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Text suitable for showing next to the control that triggered the call.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            Self::Validation(message)
            | Self::Auth(message)
            | Self::NotFound(message)
            | Self::Server { message, .. } => message.as_str(),
            Self::Network(_) | Self::Decode(_) | Self::Endpoint(_) => "",
        };

        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message.to_string()
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
