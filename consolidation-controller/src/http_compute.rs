use async_trait::async_trait;
use serde::Serialize;

use crate::error::ComputeApiError;
use crate::interfaces::ComputeApi;

/// `ComputeApi` backed by a REST compute-action service.
pub struct HttpComputeApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpComputeApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct LiveMigrateRequest<'a> {
    instance_id: u64,
    block_migration: bool,
    disk_over_commit: bool,
    destination_hostname: &'a str,
}

#[async_trait]
impl ComputeApi for HttpComputeApi {
    async fn live_migrate(
        &self,
        instance_id: u64,
        block_migration: bool,
        disk_over_commit: bool,
        destination_hostname: &str,
    ) -> Result<(), ComputeApiError> {
        let url = format!("{}/instances/{instance_id}/live-migrate", self.base_url);
        let body = LiveMigrateRequest {
            instance_id,
            block_migration,
            disk_over_commit,
            destination_hostname,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ComputeApiError::Other(e.to_string()))?;

        match response.status().as_u16() {
            200..=299 => Ok(()),
            404 => Err(ComputeApiError::InstanceNotFound { instance_id }),
            409 => Err(ComputeApiError::InstanceInvalidState { instance_id }),
            422 => Err(ComputeApiError::MigrationPreCheckError {
                instance_id,
                reason: response.text().await.unwrap_or_default(),
            }),
            status => Err(ComputeApiError::Other(format!(
                "unexpected status {status} migrating instance {instance_id}"
            ))),
        }
    }
}
