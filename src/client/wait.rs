//! Completion and power-state wait loops.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Client, ClientError};

/// What a wait loop does when a single poll fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollErrorPolicy {
    /// Return the poll's error immediately.
    Fatal,
    /// Treat the failed poll as "not yet" and keep polling until the deadline.
    Tolerate,
}

/// Deadline, cadence and error policy of a wait loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitSettings {
    /// Total budget, measured from the start of the wait.
    pub timeout: Duration,
    /// Delay before each poll.
    pub interval: Duration,
    /// Handling of per-poll failures.
    pub on_error: PollErrorPolicy,
}

impl WaitSettings {
    /// Returns a copy using `policy` for per-poll failures.
    #[must_use]
    pub const fn with_error_policy(mut self, policy: PollErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }
}

/// Polls `probe` until it reports `true`.
///
/// Every iteration checks the deadline, sleeps one interval, then probes, so
/// the first probe happens one interval after entry. Neither the sleep nor an
/// in-flight probe outlives the deadline. A probe that starts exactly at the
/// deadline still gets its result checked when it is immediately ready.
pub(crate) async fn poll_until<F, Fut>(
    action: &str,
    id: &str,
    settings: WaitSettings,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<(), ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ClientError>>,
{
    let cancelled = || ClientError::Cancelled {
        action: action.to_owned(),
        id: id.to_owned(),
    };
    let expired = || ClientError::Timeout {
        action: action.to_owned(),
        id: id.to_owned(),
    };
    let deadline = Instant::now() + settings.timeout;

    loop {
        if Instant::now() >= deadline {
            return Err(expired());
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled()),
            () = sleep(settings.interval) => {}
            () = sleep_until(deadline) => return Err(expired()),
        }

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled()),
            outcome = probe() => outcome,
            () = sleep_until(deadline) => return Err(expired()),
        };

        match outcome {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(err) => match settings.on_error {
                PollErrorPolicy::Fatal => return Err(err),
                PollErrorPolicy::Tolerate => {
                    debug!(action, id, error = %err, "poll failed, retrying until deadline");
                }
            },
        }
    }
}

impl Client {
    /// Waits until the asynchronous request `request_uuid` reports `done`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] when the request does not finish in
    /// time and [`ClientError::Cancelled`] when the client's token fires.
    /// Per-poll failures follow the configured policy, which tolerates them
    /// by default.
    pub async fn wait_for_request_completion(&self, request_uuid: &str) -> Result<(), ClientError> {
        poll_until(
            "request completion",
            request_uuid,
            self.request_wait,
            &self.cancel,
            || async move {
                let status = self.get_request_status(request_uuid).await?;
                Ok(status
                    .get(request_uuid)
                    .is_some_and(super::RequestStatusProperties::is_done))
            },
        )
        .await?;
        info!(request_uuid, "request completed");
        Ok(())
    }

    /// Waits until the server `server_uuid` reports power state `power`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] when the state is not reached in time
    /// and [`ClientError::Cancelled`] when the client's token fires. By
    /// default a failed lookup ends the wait with that error.
    pub async fn wait_for_server_power_status(
        &self,
        server_uuid: &str,
        power: bool,
    ) -> Result<(), ClientError> {
        poll_until(
            "server power state",
            server_uuid,
            self.power_wait,
            &self.cancel,
            || async move {
                let server = self.get_server(server_uuid).await?;
                Ok(server.properties.power == power)
            },
        )
        .await?;
        info!(server_uuid, power, "server power state changed");
        Ok(())
    }

    /// Waits until the PaaS service `service_uuid` runs the template
    /// `template_uuid`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] when the switch does not finish in
    /// time and [`ClientError::Cancelled`] when the client's token fires.
    /// Per-poll failures follow the configured policy, which tolerates them
    /// by default.
    pub async fn wait_for_paas_service_template(
        &self,
        service_uuid: &str,
        template_uuid: &str,
    ) -> Result<(), ClientError> {
        poll_until(
            "paas service template",
            service_uuid,
            self.service_wait,
            &self.cancel,
            || async move {
                let service = self.get_paas_service(service_uuid).await?;
                Ok(service.properties.service_template_uuid == template_uuid)
            },
        )
        .await?;
        info!(service_uuid, template_uuid, "paas service switched template");
        Ok(())
    }
}
