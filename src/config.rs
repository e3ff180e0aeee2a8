//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::client::{DecodePolicy, PollErrorPolicy, WaitSettings};

/// Default base URL of the gridscale API.
pub const DEFAULT_API_URL: &str = "https://api.gridscale.io";

/// Client configuration derived from environment variables, configuration
/// files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "GRIDSCALE")]
pub struct GridscaleConfig {
    /// Base URL every request path is appended to.
    #[ortho_config(default = DEFAULT_API_URL.to_owned())]
    pub api_url: String,
    /// User UUID sent in the `X-Auth-UserId` header. This value is required.
    pub user_uuid: String,
    /// API token sent in the `X-Auth-Token` header. This value is required.
    pub api_token: String,
    /// Per-request HTTP timeout in seconds.
    #[ortho_config(default = 30)]
    pub http_timeout_secs: u64,
    /// Budget for waiting on an asynchronous request to report `done`.
    #[ortho_config(default = 60)]
    pub request_wait_timeout_secs: u64,
    /// Budget for waiting on a server to reach a requested power state.
    #[ortho_config(default = 120)]
    pub power_wait_timeout_secs: u64,
    /// Budget for waiting on a PaaS service to switch to a new template.
    #[ortho_config(default = 600)]
    pub service_wait_timeout_secs: u64,
    /// Delay before each status poll, in milliseconds.
    #[ortho_config(default = 500)]
    pub poll_interval_ms: u64,
    /// Ignore malformed success bodies instead of reporting a decode error.
    #[ortho_config(default = false)]
    pub lenient_decode: bool,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl GridscaleConfig {
    /// Builds a configuration with the given credentials and default values
    /// for everything else.
    #[must_use]
    pub fn with_credentials(user_uuid: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            user_uuid: user_uuid.into(),
            api_token: api_token.into(),
            http_timeout_secs: 30,
            request_wait_timeout_secs: 60,
            power_wait_timeout_secs: 120,
            service_wait_timeout_secs: 600,
            poll_interval_ms: 500,
            lenient_decode: false,
        }
    }

    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to [gridscale] in gridscale.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("gridscale")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages for missing values
    /// include guidance on where to provide them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.api_url,
            &FieldMetadata::new("gridscale API URL", "GRIDSCALE_API_URL", "api_url"),
        )?;
        Self::require_field(
            &self.user_uuid,
            &FieldMetadata::new("gridscale user UUID", "GRIDSCALE_USER_UUID", "user_uuid"),
        )?;
        Self::require_field(
            &self.api_token,
            &FieldMetadata::new("gridscale API token", "GRIDSCALE_API_TOKEN", "api_token"),
        )?;
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "poll_interval_ms must be greater than zero",
            )));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Timeout applied to every HTTP request.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Decode policy for successful responses.
    #[must_use]
    pub const fn decode_policy(&self) -> DecodePolicy {
        if self.lenient_decode {
            DecodePolicy::Lenient
        } else {
            DecodePolicy::Strict
        }
    }

    /// Wait settings for request completion. Per-poll failures are tolerated
    /// until the deadline.
    #[must_use]
    pub const fn request_wait(&self) -> WaitSettings {
        WaitSettings {
            timeout: Duration::from_secs(self.request_wait_timeout_secs),
            interval: Duration::from_millis(self.poll_interval_ms),
            on_error: PollErrorPolicy::Tolerate,
        }
    }

    /// Wait settings for server power changes. A failed poll ends the wait.
    #[must_use]
    pub const fn power_wait(&self) -> WaitSettings {
        WaitSettings {
            timeout: Duration::from_secs(self.power_wait_timeout_secs),
            interval: Duration::from_millis(self.poll_interval_ms),
            on_error: PollErrorPolicy::Fatal,
        }
    }

    /// Wait settings for a PaaS service template switch, such as a
    /// Kubernetes release upgrade. Per-poll failures are tolerated until the
    /// deadline.
    #[must_use]
    pub const fn service_wait(&self) -> WaitSettings {
        WaitSettings {
            timeout: Duration::from_secs(self.service_wait_timeout_secs),
            interval: Duration::from_millis(self.poll_interval_ms),
            on_error: PollErrorPolicy::Tolerate,
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value the client cannot use.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid_config() -> GridscaleConfig {
        GridscaleConfig::with_credentials("user-uuid", "secret-token")
    }

    #[rstest]
    #[case::user(|cfg: &mut GridscaleConfig| cfg.user_uuid.clear(), "GRIDSCALE_USER_UUID")]
    #[case::token(
        |cfg: &mut GridscaleConfig| cfg.api_token = String::from("  "),
        "GRIDSCALE_API_TOKEN"
    )]
    #[case::url(|cfg: &mut GridscaleConfig| cfg.api_url.clear(), "GRIDSCALE_API_URL")]
    fn validate_names_env_var_for_missing_fields(
        valid_config: GridscaleConfig,
        #[case] mutate: fn(&mut GridscaleConfig),
        #[case] env_var: &str,
    ) {
        let mut cfg = valid_config;
        mutate(&mut cfg);
        let err = cfg.validate().expect_err("validation should fail");
        let message = err.to_string();
        assert!(message.contains(env_var), "unexpected message: {message}");
        assert!(message.contains("gridscale.toml"), "unexpected message: {message}");
    }

    #[rstest]
    fn validate_rejects_url_without_scheme(valid_config: GridscaleConfig) {
        let cfg = GridscaleConfig {
            api_url: String::from("api.gridscale.io"),
            ..valid_config
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[rstest]
    fn validate_rejects_zero_poll_interval(valid_config: GridscaleConfig) {
        let cfg = GridscaleConfig {
            poll_interval_ms: 0,
            ..valid_config
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[rstest]
    fn defaults_match_documented_wait_budgets(valid_config: GridscaleConfig) {
        assert!(valid_config.validate().is_ok());
        let request = valid_config.request_wait();
        assert_eq!(request.timeout, Duration::from_secs(60));
        assert_eq!(request.interval, Duration::from_millis(500));
        assert_eq!(request.on_error, PollErrorPolicy::Tolerate);
        let power = valid_config.power_wait();
        assert_eq!(power.timeout, Duration::from_secs(120));
        assert_eq!(power.on_error, PollErrorPolicy::Fatal);
        let service = valid_config.service_wait();
        assert_eq!(service.timeout, Duration::from_secs(600));
        assert_eq!(service.interval, Duration::from_millis(500));
        assert_eq!(service.on_error, PollErrorPolicy::Tolerate);
        assert_eq!(valid_config.decode_policy(), DecodePolicy::Strict);
    }

    #[rstest]
    fn base_url_strips_trailing_slash(valid_config: GridscaleConfig) {
        let cfg = GridscaleConfig {
            api_url: String::from("http://localhost:8080/"),
            ..valid_config
        };
        assert_eq!(cfg.base_url(), "http://localhost:8080");
    }
}
