use async_trait::async_trait;
use consolidation_core::{InstanceRecord, NodeRecord};

use crate::error::{ComputeApiError, InventoryError};

/// Read-only cluster inventory (spec.md section 6). Out of scope for this
/// crate's own logic — an external collaborator, specified only at this
/// interface boundary, the way `core-engine`'s `vendor_client` traits model
/// calls out to vendor REST APIs.
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>, InventoryError>;
    async fn list_instances_on(&self, host: &str) -> Result<Vec<InstanceRecord>, InventoryError>;
}

/// Side-effectful compute action API (spec.md section 6).
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn live_migrate(
        &self,
        instance_id: u64,
        block_migration: bool,
        disk_over_commit: bool,
        destination_hostname: &str,
    ) -> Result<(), ComputeApiError>;
}
