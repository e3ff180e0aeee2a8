//! Error types for declarative resources.

use std::time::Duration;

use thiserror::Error;

use crate::client::ClientError;

/// Errors raised by resource operations. Every variant carrying an
/// `operation` renders it as a prefix such as `create k8s (<id>) resource`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ResourceError {
    /// Wrapper for client failures.
    #[error("{operation} - error: {source}")]
    Client {
        /// Operation prefix.
        operation: String,
        /// Underlying client error.
        source: ClientError,
    },
    /// Raised when the declared state is unusable.
    #[error("{operation} - error: {message}")]
    Validation {
        /// Operation prefix.
        operation: String,
        /// Description of the problem.
        message: String,
    },
    /// Raised when the requested Kubernetes release has no template.
    #[error(
        "{operation} - error: {release} is not a valid kubernetes release number. Valid release numbers are: {valid}"
    )]
    InvalidRelease {
        /// Operation prefix.
        operation: String,
        /// Release requested by the caller.
        release: String,
        /// Comma separated list of available releases.
        valid: String,
    },
    /// Raised when a service runs a template that maps to no known release.
    #[error(
        "{operation} - error setting k8s_release_computed: could not find a release number of k8s service template UUID {template_uuid}"
    )]
    UnknownTemplate {
        /// Operation prefix.
        operation: String,
        /// Template UUID reported by the service.
        template_uuid: String,
    },
    /// Raised when an operation exceeds its budget.
    #[error("{operation} - error: timed out after {timeout:?}")]
    Timeout {
        /// Operation prefix.
        operation: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },
}

impl ResourceError {
    pub(crate) fn client(operation: &str, source: ClientError) -> Self {
        Self::Client {
            operation: operation.to_owned(),
            source,
        }
    }

    pub(crate) fn validation(operation: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            operation: operation.to_owned(),
            message: message.into(),
        }
    }

    /// Client error wrapped by this error, if any.
    #[must_use]
    pub const fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client { source, .. } => Some(source),
            _ => None,
        }
    }
}
