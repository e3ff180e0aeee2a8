//! Storage template resource.

use tracing::info;

use crate::client::{Client, TemplateCreateRequest, TemplateUpdateRequest};

use super::{
    Resource, ResourceError, ResourceFuture, ResourceTimeouts, bounded, ignore_status_codes,
    operation_prefix,
};

/// Declared and observed state of a storage template.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TemplateState {
    /// Object UUID, `None` until created or after the object disappeared.
    pub id: Option<String>,
    /// Template name.
    pub name: String,
    /// Snapshot the template is created from. Changing it requires a new
    /// template.
    pub snapshot_uuid: String,
    /// Labels attached to the template.
    pub labels: Vec<String>,
    /// Observed object status.
    pub status: String,
    /// Observed description.
    pub description: Option<String>,
    /// Observed creation timestamp.
    pub create_time: String,
    /// Observed last change timestamp.
    pub change_time: String,
}

impl TemplateState {
    /// Declares a template built from `snapshot_uuid`.
    #[must_use]
    pub fn new(name: impl Into<String>, snapshot_uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snapshot_uuid: snapshot_uuid.into(),
            ..Self::default()
        }
    }
}

/// Reconciles [`TemplateState`] against `/objects/templates`.
#[derive(Clone, Debug)]
pub struct TemplateResource {
    client: Client,
    timeouts: ResourceTimeouts,
}

impl TemplateResource {
    /// Creates the resource with default timeouts.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_timeouts(client, ResourceTimeouts::default())
    }

    /// Creates the resource with explicit timeouts.
    #[must_use]
    pub const fn with_timeouts(client: Client, timeouts: ResourceTimeouts) -> Self {
        Self { client, timeouts }
    }

    async fn refresh(&self, state: &mut TemplateState) -> Result<(), ResourceError> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        let operation = operation_prefix("read", Self::KIND, Some(&id));
        let template = match self.client.get_template(&id).await {
            Ok(template) => template,
            Err(err) if err.is_not_found() => {
                state.id = None;
                return Ok(());
            }
            Err(err) => return Err(ResourceError::client(&operation, err)),
        };

        let props = template.properties;
        state.name = props.name;
        state.labels = props.labels;
        state.status = props.status;
        state.description = props.description;
        state.create_time = props.create_time;
        state.change_time = props.change_time;
        Ok(())
    }
}

impl Resource for TemplateResource {
    type State = TemplateState;

    const KIND: &'static str = "template";

    fn create<'a>(&'a self, state: &'a mut TemplateState) -> ResourceFuture<'a, ()> {
        Box::pin(async move {
            let operation = operation_prefix("create", Self::KIND, state.id.as_deref());
            bounded(&operation, self.timeouts.create, async {
                if state.name.trim().is_empty() {
                    return Err(ResourceError::validation(&operation, "name must not be empty"));
                }
                let body = TemplateCreateRequest {
                    name: state.name.clone(),
                    snapshot_uuid: state.snapshot_uuid.clone(),
                    labels: state.labels.clone(),
                };
                let response = self
                    .client
                    .create_template(&body)
                    .await
                    .map_err(|err| ResourceError::client(&operation, err))?;
                info!(name = %body.name, id = %response.object_uuid, "template created");
                state.id = Some(response.object_uuid);
                self.refresh(state).await
            })
            .await
        })
    }

    fn read<'a>(&'a self, state: &'a mut TemplateState) -> ResourceFuture<'a, ()> {
        Box::pin(async move { self.refresh(state).await })
    }

    fn update<'a>(
        &'a self,
        _prior: &'a TemplateState,
        state: &'a mut TemplateState,
    ) -> ResourceFuture<'a, ()> {
        Box::pin(async move {
            let operation = operation_prefix("update", Self::KIND, state.id.as_deref());
            bounded(&operation, self.timeouts.update, async {
                let Some(id) = state.id.clone() else {
                    return Err(ResourceError::validation(&operation, "resource has no id"));
                };
                let body = TemplateUpdateRequest {
                    name: Some(state.name.clone()),
                    labels: Some(state.labels.clone()),
                };
                self.client
                    .update_template(&id, &body)
                    .await
                    .map_err(|err| ResourceError::client(&operation, err))?;
                self.refresh(state).await
            })
            .await
        })
    }

    fn delete<'a>(&'a self, state: &'a TemplateState) -> ResourceFuture<'a, ()> {
        Box::pin(async move {
            let Some(id) = state.id.as_deref() else {
                return Ok(());
            };
            let operation = operation_prefix("delete", Self::KIND, Some(id));
            bounded(&operation, self.timeouts.delete, async {
                ignore_status_codes(self.client.delete_template(id).await, &[404])
                    .map_err(|err| ResourceError::client(&operation, err))
            })
            .await
        })
    }
}
