//! Shared client fixture for tests that run against a mockito server.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Include this helper via:
//!
//! ```rust
//! #[path = "common/mock_api.rs"]
//! mod mock_api;
//! ```

use std::time::Duration;

use gridscale::{Client, GridscaleConfig, PollErrorPolicy, WaitSettings};
use mockito::ServerGuard;

pub const USER_UUID: &str = "2a1b6a2c-7a5e-4c3e-9c59-8b1f8a0d7a11";
pub const API_TOKEN: &str = "test-token";

/// Request-completion settings: short cadence, failures tolerated.
pub const REQUEST_WAIT: WaitSettings = WaitSettings {
    timeout: Duration::from_secs(2),
    interval: Duration::from_millis(10),
    on_error: PollErrorPolicy::Tolerate,
};

/// Power-state settings: short cadence, failures end the wait.
pub const POWER_WAIT: WaitSettings = WaitSettings {
    timeout: Duration::from_millis(300),
    interval: Duration::from_millis(10),
    on_error: PollErrorPolicy::Fatal,
};

/// Template-switch settings: short cadence, failures tolerated.
pub const SERVICE_WAIT: WaitSettings = WaitSettings {
    timeout: Duration::from_secs(2),
    interval: Duration::from_millis(10),
    on_error: PollErrorPolicy::Tolerate,
};

pub fn config_for_url(api_url: impl Into<String>) -> GridscaleConfig {
    GridscaleConfig {
        api_url: api_url.into(),
        ..GridscaleConfig::with_credentials(USER_UUID, API_TOKEN)
    }
}

pub fn client_for_url(api_url: impl Into<String>) -> Client {
    Client::new(config_for_url(api_url))
        .expect("client should build")
        .with_request_wait(REQUEST_WAIT)
        .with_power_wait(POWER_WAIT)
        .with_service_wait(SERVICE_WAIT)
}

pub fn client_for(server: &ServerGuard) -> Client {
    client_for_url(server.url())
}
