//! Declarative resources backed by the gridscale client.
//!
//! Each resource maps a state struct onto create, read, update and delete
//! calls. Diffing, planning and dependency ordering belong to the hosting
//! framework; a resource only reconciles the state it is handed.

mod error;
mod k8s;
mod template;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::client::ClientError;

pub use error::ResourceError;
pub use k8s::{
    DEFAULT_STORAGE_TYPE, K8S_TEMPLATE_CATEGORY, K8sResource, K8sState, ListenPort, STORAGE_TYPES,
};
pub use template::{TemplateResource, TemplateState};

/// Future returned by resource operations.
pub type ResourceFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ResourceError>> + Send + 'a>>;

/// Interface implemented by declarative resources.
pub trait Resource {
    /// State the resource reconciles.
    type State: Send + Sync;

    /// Resource kind used in error prefixes (for example `k8s`).
    const KIND: &'static str;

    /// Creates the remote object and refreshes `state` from it.
    fn create<'a>(&'a self, state: &'a mut Self::State) -> ResourceFuture<'a, ()>;

    /// Refreshes `state` from the remote object. Clears the identifier when
    /// the object no longer exists.
    fn read<'a>(&'a self, state: &'a mut Self::State) -> ResourceFuture<'a, ()>;

    /// Applies the difference between `prior` and `state`, then refreshes
    /// `state`.
    fn update<'a>(
        &'a self,
        prior: &'a Self::State,
        state: &'a mut Self::State,
    ) -> ResourceFuture<'a, ()>;

    /// Deletes the remote object. An object that is already gone is not an
    /// error.
    fn delete<'a>(&'a self, state: &'a Self::State) -> ResourceFuture<'a, ()>;
}

/// Budgets for mutating resource operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResourceTimeouts {
    /// Budget for create, including the follow-up read.
    pub create: Duration,
    /// Budget for update, including the follow-up read.
    pub update: Duration,
    /// Budget for delete.
    pub delete: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        let fifteen_minutes = Duration::from_secs(15 * 60);
        Self {
            create: fifteen_minutes,
            update: fifteen_minutes,
            delete: fifteen_minutes,
        }
    }
}

/// Drops API errors whose status code is listed in `codes`.
///
/// # Errors
///
/// Returns every error that is not an API error with one of `codes`.
pub fn ignore_status_codes(
    result: Result<(), ClientError>,
    codes: &[u16],
) -> Result<(), ClientError> {
    match result {
        Err(err) if err.status_code().is_some_and(|code| codes.contains(&code)) => Ok(()),
        other => other,
    }
}

pub(crate) fn operation_prefix(action: &str, kind: &str, id: Option<&str>) -> String {
    format!("{action} {kind} ({}) resource", id.unwrap_or_default())
}

pub(crate) async fn bounded<T, F>(
    operation: &str,
    budget: Duration,
    work: F,
) -> Result<T, ResourceError>
where
    F: Future<Output = Result<T, ResourceError>>,
{
    tokio::time::timeout(budget, work)
        .await
        .map_err(|_elapsed| ResourceError::Timeout {
            operation: operation.to_owned(),
            timeout: budget,
        })?
}
