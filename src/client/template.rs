//! Storage template endpoints.

use tracing::debug;

use super::{
    Client, ClientError, CreateResponse, Request, Template, TemplateCreateRequest, Templates,
    TemplateUpdateRequest,
};

const TEMPLATES_PATH: &str = "/objects/templates";

impl Client {
    /// Fetches a single template.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute`].
    pub async fn get_template(&self, id: &str) -> Result<Template, ClientError> {
        let template: Template = self
            .execute(&Request::get(format!("{TEMPLATES_PATH}/{id}")))
            .await?;
        debug!(id, name = %template.properties.name, "received template");
        Ok(template)
    }

    /// Lists all templates visible to the user.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute`].
    pub async fn get_template_list(&self) -> Result<Templates, ClientError> {
        let templates: Templates = self.execute(&Request::get(TEMPLATES_PATH)).await?;
        debug!(count = templates.list.len(), "received templates");
        Ok(templates)
    }

    /// Creates a template and waits for the provisioning request to finish.
    ///
    /// # Errors
    ///
    /// Propagates request errors and errors from
    /// [`Client::wait_for_request_completion`].
    pub async fn create_template(
        &self,
        body: &TemplateCreateRequest,
    ) -> Result<CreateResponse, ClientError> {
        let request = Request::post(TEMPLATES_PATH).with_body(body)?;
        let response: CreateResponse = self.execute(&request).await?;
        self.wait_for_request_completion(&response.request_uuid)
            .await?;
        Ok(response)
    }

    /// Updates name and labels of a template.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute_empty`].
    pub async fn update_template(
        &self,
        id: &str,
        body: &TemplateUpdateRequest,
    ) -> Result<(), ClientError> {
        let request = Request::patch(format!("{TEMPLATES_PATH}/{id}")).with_body(body)?;
        self.execute_empty(&request).await
    }

    /// Deletes a template.
    ///
    /// # Errors
    ///
    /// Propagates any [`ClientError`] from [`Client::execute_empty`],
    /// including a 404 when the template is already gone.
    pub async fn delete_template(&self, id: &str) -> Result<(), ClientError> {
        self.execute_empty(&Request::delete(format!("{TEMPLATES_PATH}/{id}")))
            .await
    }
}
