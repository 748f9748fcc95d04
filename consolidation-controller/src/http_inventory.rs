use async_trait::async_trait;
use consolidation_core::{InstanceRecord, NodeRecord};
use serde::Deserialize;

use crate::error::InventoryError;
use crate::interfaces::InventorySource;

/// `InventorySource` backed by a REST inventory service, the way
/// `core-engine`'s `vendor_client` module calls out to vendor REST APIs
/// behind its own trait boundary.
pub struct HttpInventorySource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInventorySource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NodeDto {
    hostname: String,
    vcpus: u64,
    memory_mb: u64,
    local_gb: u64,
    vcpus_used: u64,
    memory_mb_used: u64,
    local_gb_used: u64,
    compute_agent_enabled: bool,
}

impl From<NodeDto> for NodeRecord {
    fn from(dto: NodeDto) -> Self {
        NodeRecord {
            hostname: dto.hostname,
            vcpus: dto.vcpus,
            memory_mb: dto.memory_mb,
            local_gb: dto.local_gb,
            vcpus_used: dto.vcpus_used,
            memory_mb_used: dto.memory_mb_used,
            local_gb_used: dto.local_gb_used,
            compute_agent_enabled: dto.compute_agent_enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstanceDto {
    id: u64,
    vcpus: u64,
    memory_mb: u64,
    root_gb: u64,
    vm_state: String,
    power_state: String,
    host: String,
}

impl From<InstanceDto> for InstanceRecord {
    fn from(dto: InstanceDto) -> Self {
        InstanceRecord {
            id: dto.id,
            vcpus: dto.vcpus,
            memory_mb: dto.memory_mb,
            root_gb: dto.root_gb,
            vm_state_active: dto.vm_state.eq_ignore_ascii_case("active"),
            power_state_running: dto.power_state.eq_ignore_ascii_case("running"),
            host: dto.host,
        }
    }
}

#[async_trait]
impl InventorySource for HttpInventorySource {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>, InventoryError> {
        let url = format!("{}/nodes", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InventoryError::unavailable(e.to_string()))?;

        let dtos: Vec<NodeDto> = response
            .error_for_status()
            .map_err(|e| InventoryError::unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| InventoryError::malformed(e.to_string()))?;

        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn list_instances_on(&self, host: &str) -> Result<Vec<InstanceRecord>, InventoryError> {
        let url = format!("{}/nodes/{host}/instances", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InventoryError::unavailable(e.to_string()))?;

        let dtos: Vec<InstanceDto> = response
            .error_for_status()
            .map_err(|e| InventoryError::unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| InventoryError::malformed(e.to_string()))?;

        Ok(dtos.into_iter().map(Into::into).collect())
    }
}
