//! REST client for the gridscale API.
//!
//! A [`Client`] owns its configuration, its HTTP connection pool and a
//! cancellation token. Calls are executed through [`Client::execute`], which
//! classifies every response as either a decoded success value or an
//! [`ApiError`]. Creation calls that start asynchronous work on the server
//! wait for it with [`Client::wait_for_request_completion`].

mod error;
mod network;
mod paas;
mod request;
mod server;
mod template;
mod types;
mod wait;

use tokio_util::sync::CancellationToken;

use crate::config::GridscaleConfig;

pub use error::{ApiError, ClientError, NO_ERROR_MESSAGE};
pub use request::{DecodePolicy, Request, TOKEN_HEADER, USER_ID_HEADER, classify};
pub use types::{
    CreateResponse, NetworkProperties, NetworkRelations, Networks, PaasCredential, PaasService,
    PaasServiceCreateRequest, PaasServiceProperties, PaasServiceUpdateRequest,
    PaasTemplateProperties, PaasTemplates, REQUEST_DONE, RelatedObject, RequestStatus,
    RequestStatusProperties, Server, ServerProperties, Template, TemplateCreateRequest,
    TemplateProperties, TemplateUpdateRequest, Templates,
};
pub use wait::{PollErrorPolicy, WaitSettings};

/// Authenticated client for the gridscale API.
#[derive(Clone, Debug)]
pub struct Client {
    config: GridscaleConfig,
    http: reqwest::Client,
    decode_policy: DecodePolicy,
    request_wait: WaitSettings,
    power_wait: WaitSettings,
    service_wait: WaitSettings,
    cancel: CancellationToken,
}

impl Client {
    /// Constructs a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the configuration fails
    /// validation and [`ClientError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn new(config: GridscaleConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(Self {
            decode_policy: config.decode_policy(),
            request_wait: config.request_wait(),
            power_wait: config.power_wait(),
            service_wait: config.service_wait(),
            config,
            http,
            cancel: CancellationToken::new(),
        })
    }

    /// Configuration the client was built from.
    #[must_use]
    pub const fn config(&self) -> &GridscaleConfig {
        &self.config
    }

    /// Replaces the decode policy for successful responses.
    #[must_use]
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Replaces the settings used by [`Client::wait_for_request_completion`].
    #[must_use]
    pub fn with_request_wait(mut self, settings: WaitSettings) -> Self {
        self.request_wait = settings;
        self
    }

    /// Replaces the settings used by [`Client::wait_for_server_power_status`].
    #[must_use]
    pub fn with_power_wait(mut self, settings: WaitSettings) -> Self {
        self.power_wait = settings;
        self
    }

    /// Replaces the settings used by [`Client::wait_for_paas_service_template`].
    #[must_use]
    pub fn with_service_wait(mut self, settings: WaitSettings) -> Self {
        self.service_wait = settings;
        self
    }

    /// Uses `token` to cancel wait loops. Clones of the returned client share
    /// the token.
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token observed by every wait loop of this client.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fetches the status map of the asynchronous request `request_uuid`.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute`].
    pub async fn get_request_status(
        &self,
        request_uuid: &str,
    ) -> Result<RequestStatus, ClientError> {
        self.execute(&Request::get(format!("/requests/{request_uuid}")))
            .await
    }
}
