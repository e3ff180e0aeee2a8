//! Server lookup and power management.

use super::types::ServerPowerRequest;
use super::{Client, ClientError, Request, Server};

impl Client {
    /// Fetches a single server.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute`].
    pub async fn get_server(&self, id: &str) -> Result<Server, ClientError> {
        self.execute(&Request::get(format!("/objects/servers/{id}")))
            .await
    }

    /// Requests power state `power` and waits until the server reports it.
    /// Returns immediately when the server is already in that state.
    ///
    /// # Errors
    ///
    /// Propagates request errors and errors from
    /// [`Client::wait_for_server_power_status`].
    pub async fn set_server_power(&self, id: &str, power: bool) -> Result<(), ClientError> {
        if self.get_server(id).await?.properties.power == power {
            return Ok(());
        }
        let request = Request::patch(format!("/objects/servers/{id}/power"))
            .with_body(&ServerPowerRequest { power })?;
        self.execute_empty(&request).await?;
        self.wait_for_server_power_status(id, power).await
    }

    /// Powers a server on and waits for it to report running.
    ///
    /// # Errors
    ///
    /// See [`Client::set_server_power`].
    pub async fn start_server(&self, id: &str) -> Result<(), ClientError> {
        self.set_server_power(id, true).await
    }

    /// Powers a server off and waits for it to report stopped.
    ///
    /// # Errors
    ///
    /// See [`Client::set_server_power`].
    pub async fn stop_server(&self, id: &str) -> Result<(), ClientError> {
        self.set_server_power(id, false).await
    }
}
