use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

use super::types::{CreateIntegration, DeleteResponse, EndpointIntegration, UpdateIntegration};

/// Client for the evaluation platform's endpoint-integration resources.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub async fn create_integration(&self, payload: &CreateIntegration) -> Result<EndpointIntegration, ApiError> {
        tracing::info!(name = %payload.name, eval_id = %payload.eval_id, "creating endpoint integration");
        let response = self
            .client
            .post(format!("{}/endpoint-integrations", self.base_url))
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update_integration(
        &self,
        id: Uuid,
        payload: &UpdateIntegration,
    ) -> Result<EndpointIntegration, ApiError> {
        tracing::info!(%id, "updating endpoint integration");
        let response = self
            .client
            .put(format!("{}/endpoint-integrations/{id}", self.base_url))
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_integrations_for_eval(&self, eval_id: Uuid) -> Result<Vec<EndpointIntegration>, ApiError> {
        let response = self
            .client
            .get(format!("{}/evals/{eval_id}/endpoint-integrations", self.base_url))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn get_integration(&self, id: Uuid) -> Result<EndpointIntegration, ApiError> {
        let response = self
            .client
            .get(format!("{}/endpoint-integrations/{id}", self.base_url))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_integration(&self, id: Uuid) -> Result<DeleteResponse, ApiError> {
        tracing::info!(%id, "deleting endpoint integration");
        let response = self
            .client
            .delete(format!("{}/endpoint-integrations/{id}", self.base_url))
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read response: {e}"));
        tracing::warn!(status = status.as_u16(), "API call rejected");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}
