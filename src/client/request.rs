//! Request execution and response classification.

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ApiError, Client, ClientError};

/// Header carrying the user UUID.
pub const USER_ID_HEADER: &str = "X-Auth-UserId";
/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "X-Auth-Token";

/// How successful response bodies that do not match the expected shape are
/// handled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DecodePolicy {
    /// Report a [`ClientError::Decode`].
    #[default]
    Strict,
    /// Ignore the body and return the output shape's default value.
    Lenient,
}

/// Description of a single API call.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    path: String,
    method: Method,
    body: Option<Value>,
}

impl Request {
    /// Creates a request for `path` relative to the configured base URL.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Shorthand for a `PATCH` request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Shorthand for a `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] when the body cannot be serialised.
    pub fn with_body(mut self, body: &impl Serialize) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body).map_err(|err| ClientError::Encode {
            message: err.to_string(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Path relative to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Classifies a response: status < 300 decodes into `T`, anything else
/// becomes an [`ApiError`] carrying `status`.
///
/// # Errors
///
/// Returns [`ClientError::Api`] for status >= 300 and [`ClientError::Decode`]
/// when a success body does not decode under [`DecodePolicy::Strict`].
pub fn classify<T>(
    path: &str,
    status: u16,
    body: &[u8],
    policy: DecodePolicy,
) -> Result<T, ClientError>
where
    T: DeserializeOwned + Default,
{
    if status >= 300 {
        return Err(ApiError::from_response(status, body).into());
    }
    match serde_json::from_slice(body) {
        Ok(decoded) => Ok(decoded),
        Err(err) => match policy {
            DecodePolicy::Strict => Err(ClientError::Decode {
                path: path.to_owned(),
                message: err.to_string(),
            }),
            DecodePolicy::Lenient => {
                debug!(path, error = %err, "ignoring undecodable response body");
                Ok(T::default())
            }
        },
    }
}

impl Client {
    /// Sends `request` and decodes a successful body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] on network failure,
    /// [`ClientError::Api`] for status >= 300, and [`ClientError::Decode`]
    /// when the body does not match `T` under the strict decode policy.
    pub async fn execute<T>(&self, request: &Request) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Default,
    {
        let (status, body) = self.send(request).await?;
        classify(request.path(), status, &body, self.decode_policy)
    }

    /// Sends `request` for its side effect only. A successful body is never
    /// decoded.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] on network failure and
    /// [`ClientError::Api`] for status >= 300.
    pub async fn execute_empty(&self, request: &Request) -> Result<(), ClientError> {
        let (status, body) = self.send(request).await?;
        if status >= 300 {
            return Err(ApiError::from_response(status, &body).into());
        }
        Ok(())
    }

    async fn send(&self, request: &Request) -> Result<(u16, Vec<u8>), ClientError> {
        let url = format!("{}{}", self.config.base_url(), request.path());
        debug!(method = %request.method(), %url, "sending request");

        let mut builder = self
            .http
            .request(request.method().clone(), &url)
            .header(USER_ID_HEADER, &self.config.user_uuid)
            .header(TOKEN_HEADER, &self.config.api_token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = request.body() {
            let encoded = serde_json::to_vec(body).map_err(|err| ClientError::Encode {
                message: err.to_string(),
            })?;
            debug!(body = %body, "request body");
            builder = builder.body(encoded);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, body = %String::from_utf8_lossy(&body), "response received");
        Ok((status, body))
    }
}
