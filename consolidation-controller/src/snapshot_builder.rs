use std::collections::HashMap;

use consolidation_core::Snapshot;

use crate::error::InventoryError;
use crate::interfaces::InventorySource;

/// Fetches the raw node and instance records from the inventory source and
/// builds an immutable [`Snapshot`]. The async I/O lives here; the
/// filtering/classification logic lives in `consolidation-core` and is
/// synchronous (spec.md 4.A, "construction failure surface").
pub async fn build(inventory: &dyn InventorySource) -> Result<Snapshot, InventoryError> {
    let nodes = inventory.list_nodes().await?;

    let mut instances_by_host = HashMap::new();
    for node in nodes.iter().filter(|n| n.compute_agent_enabled) {
        let instances = inventory.list_instances_on(&node.hostname).await?;
        instances_by_host.insert(node.hostname.clone(), instances);
    }

    Snapshot::from_records(nodes, instances_by_host)
        .map_err(|e| InventoryError::malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use consolidation_core::InstanceRecord;
    use consolidation_core::NodeRecord;
    use std::sync::Mutex;

    struct FakeInventory {
        nodes: Vec<NodeRecord>,
        instances: Mutex<HashMap<String, Vec<InstanceRecord>>>,
    }

    #[async_trait]
    impl InventorySource for FakeInventory {
        async fn list_nodes(&self) -> Result<Vec<NodeRecord>, InventoryError> {
            Ok(self.nodes.clone())
        }

        async fn list_instances_on(&self, host: &str) -> Result<Vec<InstanceRecord>, InventoryError> {
            Ok(self
                .instances
                .lock()
                .unwrap()
                .get(host)
                .cloned()
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn builds_a_snapshot_from_fake_inventory() {
        let mut instances = HashMap::new();
        instances.insert(
            "host-a".to_string(),
            vec![InstanceRecord {
                id: 1,
                vcpus: 2,
                memory_mb: 2048,
                root_gb: 20,
                vm_state_active: true,
                power_state_running: true,
                host: "host-a".into(),
            }],
        );

        let inventory = FakeInventory {
            nodes: vec![NodeRecord {
                hostname: "host-a".into(),
                vcpus: 8,
                memory_mb: 8192,
                local_gb: 200,
                vcpus_used: 2,
                memory_mb_used: 2048,
                local_gb_used: 20,
                compute_agent_enabled: true,
            }],
            instances: Mutex::new(instances),
        };

        let snapshot = build(&inventory).await.unwrap();
        assert_eq!(snapshot.node_count(), 1);
        assert_eq!(snapshot.migrable_count(), 1);
    }
}
