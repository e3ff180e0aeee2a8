//! Managed Kubernetes resource built on PaaS services.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::client::{
    Client, PaasServiceCreateRequest, PaasServiceProperties, PaasServiceUpdateRequest,
};

use super::{
    Resource, ResourceError, ResourceFuture, ResourceTimeouts, bounded, ignore_status_codes,
    operation_prefix,
};

/// PaaS template category that holds Kubernetes releases.
pub const K8S_TEMPLATE_CATEGORY: &str = "kubernetes";

/// Storage types accepted for worker nodes.
pub const STORAGE_TYPES: [&str; 3] = ["storage", "storage_high", "storage_insane"];

/// Storage type used when none is declared.
pub const DEFAULT_STORAGE_TYPE: &str = "storage_insane";

const PARAM_RAM: &str = "k8s_worker_node_ram";
const PARAM_CORES: &str = "k8s_worker_node_cores";
const PARAM_COUNT: &str = "k8s_worker_node_count";
const PARAM_STORAGE: &str = "k8s_worker_node_storage";
const PARAM_STORAGE_TYPE: &str = "k8s_worker_node_storage_type";

/// A port the cluster listens on.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct ListenPort {
    /// Name of the listener.
    pub name: String,
    /// Port number.
    pub port: i64,
}

/// Declared and observed state of a managed Kubernetes cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct K8sState {
    /// Object UUID, `None` until created or after the object disappeared.
    pub id: Option<String>,
    /// Cluster name.
    pub name: String,
    /// Declared release number.
    pub k8s_release: String,
    /// Release the service actually runs. Differs from `k8s_release` when the
    /// release was changed outside of this resource.
    pub k8s_release_computed: Option<String>,
    /// Security zone the cluster lives in.
    pub security_zone_uuid: Option<String>,
    /// Network that contains the security zone.
    pub network_uuid: Option<String>,
    /// Kubeconfig issued for the cluster.
    pub kubeconfig: Option<String>,
    /// Ports the cluster listens on, sorted by name.
    pub listen_ports: Vec<ListenPort>,
    /// Memory per worker node in GiB.
    pub worker_node_ram: i64,
    /// Cores per worker node.
    pub worker_node_cores: i64,
    /// Number of worker nodes.
    pub worker_node_count: i64,
    /// Storage per worker node in GiB.
    pub worker_node_storage: i64,
    /// Storage type, one of [`STORAGE_TYPES`].
    pub worker_node_storage_type: String,
    /// Minutes the service has been in use.
    pub usage_in_minute: i64,
    /// Current price of the service.
    pub current_price: f64,
    /// Observed creation timestamp.
    pub create_time: String,
    /// Observed last change timestamp.
    pub change_time: String,
    /// Observed service status.
    pub status: String,
    /// Labels attached to the service.
    pub labels: Vec<String>,
}

impl K8sState {
    /// Declares a cluster running `k8s_release` with default worker nodes.
    #[must_use]
    pub fn new(name: impl Into<String>, k8s_release: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            k8s_release: k8s_release.into(),
            k8s_release_computed: None,
            security_zone_uuid: None,
            network_uuid: None,
            kubeconfig: None,
            listen_ports: Vec::new(),
            worker_node_ram: 16,
            worker_node_cores: 4,
            worker_node_count: 3,
            worker_node_storage: 30,
            worker_node_storage_type: DEFAULT_STORAGE_TYPE.to_owned(),
            usage_in_minute: 0,
            current_price: 0.0,
            create_time: String::new(),
            change_time: String::new(),
            status: String::new(),
            labels: Vec::new(),
        }
    }

    /// Checks the declared fields.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(String::from("name must not be empty"));
        }
        if self.k8s_release.trim().is_empty() {
            return Err(String::from("k8s_release must not be empty"));
        }
        if !STORAGE_TYPES.contains(&self.worker_node_storage_type.as_str()) {
            return Err(format!(
                "{} is not a valid storage type. Valid types are: {}",
                self.worker_node_storage_type,
                STORAGE_TYPES.join(",")
            ));
        }
        if let Some(zone) = self.security_zone_uuid.as_deref() {
            Uuid::parse_str(zone)
                .map_err(|err| format!("security_zone_uuid '{zone}' is not a UUID: {err}"))?;
        }
        Ok(())
    }

    fn parameters(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(PARAM_RAM.to_owned(), Value::from(self.worker_node_ram));
        params.insert(PARAM_CORES.to_owned(), Value::from(self.worker_node_cores));
        params.insert(PARAM_COUNT.to_owned(), Value::from(self.worker_node_count));
        params.insert(PARAM_STORAGE.to_owned(), Value::from(self.worker_node_storage));
        params.insert(
            PARAM_STORAGE_TYPE.to_owned(),
            Value::from(self.worker_node_storage_type.clone()),
        );
        params
    }

    fn apply_service(&mut self, props: PaasServiceProperties) {
        self.kubeconfig = props
            .credentials
            .into_iter()
            .next()
            .map(|credential| credential.kube_config)
            .or_else(|| self.kubeconfig.take());

        let mut ports: Vec<ListenPort> = props
            .listen_ports
            .into_values()
            .flat_map(|ports| ports.into_iter())
            .map(|(name, port)| ListenPort { name, port })
            .collect();
        ports.sort();
        self.listen_ports = ports;

        let int_param = |key: &str| props.parameters.get(key).and_then(Value::as_i64);
        if let Some(ram) = int_param(PARAM_RAM) {
            self.worker_node_ram = ram;
        }
        if let Some(cores) = int_param(PARAM_CORES) {
            self.worker_node_cores = cores;
        }
        if let Some(count) = int_param(PARAM_COUNT) {
            self.worker_node_count = count;
        }
        if let Some(storage) = int_param(PARAM_STORAGE) {
            self.worker_node_storage = storage;
        }
        if let Some(storage_type) = props
            .parameters
            .get(PARAM_STORAGE_TYPE)
            .and_then(Value::as_str)
        {
            storage_type.clone_into(&mut self.worker_node_storage_type);
        }

        self.name = props.name;
        self.security_zone_uuid = Some(props.security_zone_uuid).filter(|zone| !zone.is_empty());
        self.usage_in_minute = props.usage_in_minutes;
        self.current_price = props.current_price;
        self.create_time = props.create_time;
        self.change_time = props.change_time;
        self.status = props.status;
        self.labels = props.labels;
    }
}

/// Reconciles [`K8sState`] against `/objects/paas/services`.
#[derive(Clone, Debug)]
pub struct K8sResource {
    client: Client,
    timeouts: ResourceTimeouts,
}

impl K8sResource {
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

    /// Maps every Kubernetes release number to its PaaS template UUID.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Client`] when the template list cannot be
    /// fetched.
    pub async fn release_templates(
        &self,
        operation: &str,
    ) -> Result<BTreeMap<String, String>, ResourceError> {
        let templates = self
            .client
            .get_paas_template_list()
            .await
            .map_err(|err| ResourceError::client(operation, err))?;
        Ok(templates
            .list
            .into_values()
            .filter(|template| template.category == K8S_TEMPLATE_CATEGORY)
            .map(|template| (template.release, template.object_uuid))
            .collect())
    }

    async fn template_for_release(
        &self,
        operation: &str,
        release: &str,
    ) -> Result<String, ResourceError> {
        let releases = self.release_templates(operation).await?;
        releases
            .get(release)
            .cloned()
            .ok_or_else(|| ResourceError::InvalidRelease {
                operation: operation.to_owned(),
                release: release.to_owned(),
                valid: releases.keys().cloned().collect::<Vec<_>>().join(","),
            })
    }

    async fn refresh(&self, state: &mut K8sState) -> Result<(), ResourceError> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        let operation = operation_prefix("read", Self::KIND, Some(&id));
        let service = match self.client.get_paas_service(&id).await {
            Ok(service) => service,
            Err(err) if err.is_not_found() => {
                state.id = None;
                return Ok(());
            }
            Err(err) => return Err(ResourceError::client(&operation, err)),
        };
        let props = service.properties;

        let releases = self.release_templates(&operation).await?;
        let computed = releases
            .iter()
            .find(|(_, uuid)| **uuid == props.service_template_uuid)
            .map(|(release, _)| release.clone())
            .ok_or_else(|| ResourceError::UnknownTemplate {
                operation: operation.clone(),
                template_uuid: props.service_template_uuid.clone(),
            })?;

        let networks = self
            .client
            .get_network_list()
            .await
            .map_err(|err| ResourceError::client(&operation, err))?;
        let network_uuid = networks
            .list
            .into_values()
            .find(|network| {
                network
                    .relations
                    .paas_security_zones
                    .first()
                    .is_some_and(|zone| zone.object_uuid == props.security_zone_uuid)
            })
            .map(|network| network.object_uuid);

        state.k8s_release_computed = Some(computed);
        state.network_uuid = network_uuid;
        state.apply_service(props);
        Ok(())
    }
}

impl Resource for K8sResource {
    type State = K8sState;

    const KIND: &'static str = "k8s";

    fn create<'a>(&'a self, state: &'a mut K8sState) -> ResourceFuture<'a, ()> {
        Box::pin(async move {
            let operation = operation_prefix("create", Self::KIND, state.id.as_deref());
            bounded(&operation, self.timeouts.create, async {
                state
                    .validate()
                    .map_err(|message| ResourceError::validation(&operation, message))?;
                let template_uuid = self
                    .template_for_release(&operation, &state.k8s_release)
                    .await?;
                let body = PaasServiceCreateRequest {
                    name: state.name.clone(),
                    paas_service_template_uuid: template_uuid,
                    labels: state.labels.clone(),
                    paas_security_zone_uuid: state.security_zone_uuid.clone(),
                    parameters: state.parameters(),
                };
                let response = self
                    .client
                    .create_paas_service(&body)
                    .await
                    .map_err(|err| ResourceError::client(&operation, err))?;
                info!(name = %body.name, id = %response.object_uuid, "k8s cluster created");
                state.id = Some(response.object_uuid);
                self.refresh(state).await
            })
            .await
        })
    }

    fn read<'a>(&'a self, state: &'a mut K8sState) -> ResourceFuture<'a, ()> {
        Box::pin(async move { self.refresh(state).await })
    }

    fn update<'a>(
        &'a self,
        prior: &'a K8sState,
        state: &'a mut K8sState,
    ) -> ResourceFuture<'a, ()> {
        Box::pin(async move {
            let operation = operation_prefix("update", Self::KIND, state.id.as_deref());
            bounded(&operation, self.timeouts.update, async {
                let Some(id) = state.id.clone() else {
                    return Err(ResourceError::validation(&operation, "resource has no id"));
                };
                state
                    .validate()
                    .map_err(|message| ResourceError::validation(&operation, message))?;
                let template_uuid = if prior.k8s_release == state.k8s_release {
                    None
                } else {
                    Some(
                        self.template_for_release(&operation, &state.k8s_release)
                            .await?,
                    )
                };
                let body = PaasServiceUpdateRequest {
                    name: state.name.clone(),
                    labels: Some(state.labels.clone()),
                    paas_service_template_uuid: template_uuid,
                    parameters: state.parameters(),
                };
                self.client
                    .update_paas_service(&id, &body)
                    .await
                    .map_err(|err| ResourceError::client(&operation, err))?;
                self.refresh(state).await
            })
            .await
        })
    }

    fn delete<'a>(&'a self, state: &'a K8sState) -> ResourceFuture<'a, ()> {
        Box::pin(async move {
            let Some(id) = state.id.as_deref() else {
                return Ok(());
            };
            let operation = operation_prefix("delete", Self::KIND, Some(id));
            bounded(&operation, self.timeouts.delete, async {
                ignore_status_codes(self.client.delete_paas_service(id).await, &[404])
                    .map_err(|err| ResourceError::client(&operation, err))
            })
            .await
        })
    }
}
