//! Error types for the gridscale client.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;

/// Message reported when the server sent no usable error text.
pub const NO_ERROR_MESSAGE: &str = "no error message received from server";

/// Uniform failure envelope built from any response with status >= 300.
///
/// The status code always comes from the HTTP layer, never from the body.
#[derive(Clone, Debug, Default, Error, Eq, PartialEq)]
pub struct ApiError {
    /// HTTP status code returned by the API.
    pub status_code: u16,
    /// Short status text from the body's `status` field, when present.
    pub status: Option<String>,
    /// Human-readable message from the body's `message` field, when present.
    pub message: Option<String>,
}

impl ApiError {
    /// Builds the envelope from a raw error response. Bodies that are not
    /// JSON, or that lack the expected fields, still produce an envelope.
    #[must_use]
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<Value>(body).ok();
        let field = |name: &str| parsed.as_ref().and_then(|value| text_field(value, name));
        Self {
            status_code,
            status: field("status"),
            message: field("message"),
        }
    }

    /// Message text, falling back to [`NO_ERROR_MESSAGE`].
    #[must_use]
    pub fn display_message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(NO_ERROR_MESSAGE)
    }

    /// Whether the API reported that the object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status_code == 404
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Error] statuscode {} returned: {}",
            self.status_code,
            self.display_message()
        )
    }
}

fn text_field(value: &Value, name: &str) -> Option<String> {
    match value.get(name)? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Errors raised by the gridscale client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// Raised when the client configuration fails validation.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when a request body cannot be serialised to JSON.
    #[error("failed to encode request body: {message}")]
    Encode {
        /// Serialiser error message.
        message: String,
    },
    /// Raised on network level failures (DNS, connect, read).
    #[error("transport error: {message}")]
    Transport {
        /// Message reported by the HTTP client.
        message: String,
    },
    /// Raised when the API answers with a status code >= 300.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Raised when a successful response body does not match the expected
    /// shape and the client uses the strict decode policy.
    #[error("failed to decode response from {path}: {message}")]
    Decode {
        /// Request path whose response failed to decode.
        path: String,
        /// Deserialiser error message.
        message: String,
    },
    /// Raised when a wait loop exceeds its deadline.
    #[error("timeout reached waiting for {action} of {id}")]
    Timeout {
        /// Condition being waited on.
        action: String,
        /// Request or object identifier being polled.
        id: String,
    },
    /// Raised when a wait loop is cancelled by its caller.
    #[error("cancelled while waiting for {action} of {id}")]
    Cancelled {
        /// Condition being waited on.
        action: String,
        /// Request or object identifier being polled.
        id: String,
    },
}

impl ClientError {
    /// HTTP status code carried by an [`ClientError::Api`] error.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => Some(api.status_code),
            _ => None,
        }
    }

    /// Whether this error is an API 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(api) if api.is_not_found())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

impl From<ConfigError> for ClientError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
