//! Network endpoints.

use super::{Client, ClientError, Networks, Request};

impl Client {
    /// Lists all networks visible to the user.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute`].
    pub async fn get_network_list(&self) -> Result<Networks, ClientError> {
        self.execute(&Request::get("/objects/networks")).await
    }
}
