//! PaaS service and PaaS template endpoints.

use super::{
    Client, ClientError, CreateResponse, PaasService, PaasServiceCreateRequest,
    PaasServiceUpdateRequest, PaasTemplates, Request,
};

const SERVICES_PATH: &str = "/objects/paas/services";
const TEMPLATES_PATH: &str = "/objects/paas/service_templates";

impl Client {
    /// Fetches a single PaaS service.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute`].
    pub async fn get_paas_service(&self, id: &str) -> Result<PaasService, ClientError> {
        self.execute(&Request::get(format!("{SERVICES_PATH}/{id}")))
            .await
    }

    /// Creates a PaaS service and waits for the provisioning request to
    /// finish.
    ///
    /// # Errors
    ///
    /// Propagates request errors and errors from
    /// [`Client::wait_for_request_completion`].
    pub async fn create_paas_service(
        &self,
        body: &PaasServiceCreateRequest,
    ) -> Result<CreateResponse, ClientError> {
        let request = Request::post(SERVICES_PATH).with_body(body)?;
        let response: CreateResponse = self.execute(&request).await?;
        self.wait_for_request_completion(&response.request_uuid)
            .await?;
        Ok(response)
    }

    /// Updates a PaaS service. When the body switches the template, waits
    /// until the service reports the new template.
    ///
    /// # Errors
    ///
    /// Propagates request errors and errors from
    /// [`Client::wait_for_paas_service_template`].
    pub async fn update_paas_service(
        &self,
        id: &str,
        body: &PaasServiceUpdateRequest,
    ) -> Result<(), ClientError> {
        let request = Request::patch(format!("{SERVICES_PATH}/{id}")).with_body(body)?;
        self.execute_empty(&request).await?;
        if let Some(template_uuid) = body.paas_service_template_uuid.as_deref() {
            self.wait_for_paas_service_template(id, template_uuid)
                .await?;
        }
        Ok(())
    }

    /// Deletes a PaaS service.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute_empty`],
    /// including a 404 when the service is already gone.
    pub async fn delete_paas_service(&self, id: &str) -> Result<(), ClientError> {
        self.execute_empty(&Request::delete(format!("{SERVICES_PATH}/{id}")))
            .await
    }

    /// Lists all PaaS service templates.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute`].
    pub async fn get_paas_template_list(&self) -> Result<PaasTemplates, ClientError> {
        self.execute(&Request::get(TEMPLATES_PATH)).await
    }
}
