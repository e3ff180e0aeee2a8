//! Wire types exchanged with the gridscale API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status value reported by `/requests/{id}` once the work has finished.
pub const REQUEST_DONE: &str = "done";

/// Response to a creation call that may trigger asynchronous work.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CreateResponse {
    /// Identifier of the created object.
    #[serde(default)]
    pub object_uuid: String,
    /// Identifier of the asynchronous request to poll.
    #[serde(default)]
    pub request_uuid: String,
    /// Secondary server identifier returned by some endpoints.
    #[serde(default)]
    pub server_uuid: Option<String>,
}

/// Status map returned by `/requests/{id}`, keyed by request identifier.
pub type RequestStatus = HashMap<String, RequestStatusProperties>;

/// Status entry of a single asynchronous request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RequestStatusProperties {
    /// Current status, [`REQUEST_DONE`] when finished.
    #[serde(default)]
    pub status: String,
    /// Free-form progress or failure message.
    #[serde(default)]
    pub message: String,
    /// Time the request was created.
    #[serde(default)]
    pub create_time: String,
}

impl RequestStatusProperties {
    /// Whether the request has finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == REQUEST_DONE
    }
}

/// Single template envelope.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Template {
    /// Template properties.
    #[serde(rename = "template", default)]
    pub properties: TemplateProperties,
}

/// Template list envelope keyed by object UUID.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Templates {
    /// Templates keyed by object UUID.
    #[serde(rename = "templates", default)]
    pub list: HashMap<String, TemplateProperties>,
}

/// Properties of a storage template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TemplateProperties {
    /// Object UUID.
    pub object_uuid: String,
    /// Human-readable name.
    pub name: String,
    /// Object status (`active`, `in-provisioning`, ...).
    pub status: String,
    /// Creation timestamp.
    pub create_time: String,
    /// Last change timestamp.
    pub change_time: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Labels attached to the template.
    pub labels: Vec<String>,
}

/// Body of `POST /objects/templates`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TemplateCreateRequest {
    /// Template name.
    pub name: String,
    /// Snapshot the template is built from.
    pub snapshot_uuid: String,
    /// Labels to attach.
    pub labels: Vec<String>,
}

/// Body of `PATCH /objects/templates/{id}`. Absent fields stay unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TemplateUpdateRequest {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement label set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Single server envelope.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Server {
    /// Server properties.
    #[serde(rename = "server", default)]
    pub properties: ServerProperties,
}

/// Server properties relevant to power management.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ServerProperties {
    /// Object UUID.
    pub object_uuid: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the server is powered on.
    pub power: bool,
    /// Object status.
    pub status: String,
}

/// Body of `PATCH /objects/servers/{id}/power`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub(crate) struct ServerPowerRequest {
    pub(crate) power: bool,
}

/// Single PaaS service envelope.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PaasService {
    /// Service properties.
    #[serde(rename = "paas_service", default)]
    pub properties: PaasServiceProperties,
}

/// Properties of a PaaS service such as a managed Kubernetes cluster.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PaasServiceProperties {
    /// Object UUID.
    pub object_uuid: String,
    /// Human-readable name.
    pub name: String,
    /// Labels attached to the service.
    pub labels: Vec<String>,
    /// Credentials issued for the service.
    pub credentials: Vec<PaasCredential>,
    /// Creation timestamp.
    pub create_time: String,
    /// Last change timestamp.
    pub change_time: String,
    /// Object status.
    pub status: String,
    /// Ports the service listens on, grouped by host.
    pub listen_ports: HashMap<String, HashMap<String, i64>>,
    /// Security zone the service lives in.
    pub security_zone_uuid: String,
    /// Template that describes the live configuration (release).
    pub service_template_uuid: String,
    /// Minutes the service has been in use.
    pub usage_in_minutes: i64,
    /// Current price of the service.
    pub current_price: f64,
    /// Template-specific parameters.
    pub parameters: Map<String, Value>,
}

/// Credential block of a PaaS service.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PaasCredential {
    /// Username, when the service issues one.
    pub username: String,
    /// Password, when the service issues one.
    pub password: String,
    /// Kubeconfig document for Kubernetes services.
    #[serde(rename = "kubeconfig")]
    pub kube_config: String,
}

/// Body of `POST /objects/paas/services`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PaasServiceCreateRequest {
    /// Service name.
    pub name: String,
    /// Template to instantiate.
    pub paas_service_template_uuid: String,
    /// Labels to attach.
    pub labels: Vec<String>,
    /// Security zone to place the service in; the API picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paas_security_zone_uuid: Option<String>,
    /// Template-specific parameters.
    pub parameters: Map<String, Value>,
}

/// Body of `PATCH /objects/paas/services/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PaasServiceUpdateRequest {
    /// New name.
    pub name: String,
    /// Replacement label set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// New template, which switches the release of the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paas_service_template_uuid: Option<String>,
    /// Template-specific parameters.
    pub parameters: Map<String, Value>,
}

/// PaaS template list envelope keyed by object UUID.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PaasTemplates {
    /// Templates keyed by object UUID.
    #[serde(rename = "paas_service_templates", default)]
    pub list: HashMap<String, PaasTemplateProperties>,
}

/// Properties of a PaaS service template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PaasTemplateProperties {
    /// Object UUID.
    pub object_uuid: String,
    /// Human-readable name.
    pub name: String,
    /// Template category, `kubernetes` for managed clusters.
    pub category: String,
    /// Release number of the product the template installs.
    pub release: String,
    /// Product version.
    pub version: String,
}

/// Network list envelope keyed by object UUID.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Networks {
    /// Networks keyed by object UUID.
    #[serde(rename = "networks", default)]
    pub list: HashMap<String, NetworkProperties>,
}

/// Properties of a network.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NetworkProperties {
    /// Object UUID.
    pub object_uuid: String,
    /// Human-readable name.
    pub name: String,
    /// Objects related to the network.
    pub relations: NetworkRelations,
}

/// Relations of a network to other objects.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NetworkRelations {
    /// PaaS security zones attached to the network. At most one is expected.
    pub paas_security_zones: Vec<RelatedObject>,
}

/// Minimal reference to a related object.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RelatedObject {
    /// Object UUID.
    pub object_uuid: String,
}
