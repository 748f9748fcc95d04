use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use consolidation_core::{consolidate, ConsolidatorConfig};
use tracing::{debug, error, info, warn};

use crate::error::{ComputeApiError, ControllerError};
use crate::interfaces::{ComputeApi, InventorySource};
use crate::snapshot_builder;

/// Drives the periodic consolidation tick (spec.md 4.F). A single worker
/// executes ticks serially; if a tick is still running when the interval
/// fires, the new tick is dropped rather than queued (spec.md section 5).
#[derive(Clone)]
pub struct ControlLoop {
    inventory: Arc<dyn InventorySource>,
    compute: Arc<dyn ComputeApi>,
    config: ConsolidatorConfig,
    busy: Arc<AtomicBool>,
}

impl ControlLoop {
    pub fn new(
        inventory: Arc<dyn InventorySource>,
        compute: Arc<dyn ComputeApi>,
        config: ConsolidatorConfig,
    ) -> Self {
        Self {
            inventory,
            compute,
            config,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs forever, firing one tick per `consolidation_interval_secs`.
    /// Never returns under normal operation — a failed tick is logged and
    /// does not stop the loop (spec.md section 7).
    pub async fn run(self) {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.consolidation_interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if self.busy.swap(true, Ordering::SeqCst) {
                warn!("previous tick still in progress, dropping this tick");
                continue;
            }

            let loop_for_tick = self.clone();
            tokio::spawn(async move {
                info!(engine = ?loop_for_tick.config.engine, "tick starting");
                if let Err(e) = loop_for_tick.run_tick().await {
                    error!(error = %e, "tick aborted");
                } else {
                    info!("tick finished");
                }
                loop_for_tick.busy.store(false, Ordering::SeqCst);
            });
        }
    }

    /// Runs a single tick: build snapshot, compute the plan, dispatch each
    /// migration in order.
    pub async fn run_tick(&self) -> Result<(), ControllerError> {
        let snapshot = snapshot_builder::build(self.inventory.as_ref()).await?;
        let engine = self.config.build_engine();
        let outcome = consolidate(&snapshot, engine.as_ref())?;

        for migration in &outcome.migrations {
            debug!(
                instance_id = migration.instance_id,
                destination = %migration.destination_host,
                "dispatching migration"
            );

            let result = self
                .compute
                .live_migrate(
                    migration.instance_id,
                    false,
                    false,
                    &migration.destination_host,
                )
                .await;

            match result {
                Ok(()) => {}
                Err(ComputeApiError::InstanceInvalidState { instance_id }) => {
                    warn!(instance_id, "instance in invalid state, skipping");
                }
                Err(ComputeApiError::InstanceNotFound { instance_id }) => {
                    warn!(instance_id, "instance not found, skipping");
                }
                Err(ComputeApiError::MigrationPreCheckError { instance_id, reason }) => {
                    warn!(instance_id, reason, "migration pre-check failed, skipping");
                }
                Err(other @ ComputeApiError::Other(_)) => {
                    return Err(ControllerError::Dispatch(other));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use consolidation_core::{EngineKind, InstanceRecord, NodeRecord};
    use std::sync::Mutex;

    use crate::error::InventoryError;

    struct FakeInventory {
        nodes: Vec<NodeRecord>,
        instances: std::collections::HashMap<String, Vec<InstanceRecord>>,
    }

    #[async_trait]
    impl InventorySource for FakeInventory {
        async fn list_nodes(&self) -> Result<Vec<NodeRecord>, InventoryError> {
            Ok(self.nodes.clone())
        }

        async fn list_instances_on(&self, host: &str) -> Result<Vec<InstanceRecord>, InventoryError> {
            Ok(self.instances.get(host).cloned().unwrap_or_default())
        }
    }

    struct RecordingCompute {
        calls: Mutex<Vec<u64>>,
        fail_on: Option<u64>,
    }

    #[async_trait]
    impl ComputeApi for RecordingCompute {
        async fn live_migrate(
            &self,
            instance_id: u64,
            _block_migration: bool,
            _disk_over_commit: bool,
            _destination_hostname: &str,
        ) -> Result<(), ComputeApiError> {
            self.calls.lock().unwrap().push(instance_id);
            if Some(instance_id) == self.fail_on {
                return Err(ComputeApiError::InstanceNotFound { instance_id });
            }
            Ok(())
        }
    }

    fn two_host_snapshot_inventory() -> FakeInventory {
        let nodes = vec![
            NodeRecord {
                hostname: "a".into(),
                vcpus: 10,
                memory_mb: 10_000,
                local_gb: 100,
                vcpus_used: 0,
                memory_mb_used: 0,
                local_gb_used: 0,
                compute_agent_enabled: true,
            },
            NodeRecord {
                hostname: "b".into(),
                vcpus: 10,
                memory_mb: 10_000,
                local_gb: 100,
                vcpus_used: 0,
                memory_mb_used: 0,
                local_gb_used: 0,
                compute_agent_enabled: true,
            },
        ];
        let mut instances = std::collections::HashMap::new();
        instances.insert(
            "a".to_string(),
            vec![InstanceRecord {
                id: 1,
                vcpus: 5,
                memory_mb: 5_000,
                root_gb: 50,
                vm_state_active: true,
                power_state_running: true,
                host: "a".into(),
            }],
        );
        instances.insert(
            "b".to_string(),
            vec![InstanceRecord {
                id: 2,
                vcpus: 5,
                memory_mb: 5_000,
                root_gb: 50,
                vm_state_active: true,
                power_state_running: true,
                host: "b".into(),
            }],
        );
        FakeInventory { nodes, instances }
    }

    #[tokio::test]
    async fn holistic_tick_dispatches_exactly_one_migration() {
        let inventory = two_host_snapshot_inventory();
        let compute = RecordingCompute {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
        };

        let mut config = ConsolidatorConfig::default();
        config.engine = EngineKind::Holistic;

        let control_loop = ControlLoop::new(Arc::new(inventory), Arc::new(compute), config);
        control_loop.run_tick().await.unwrap();
    }

    #[tokio::test]
    async fn recoverable_dispatch_error_does_not_abort_remaining_migrations() {
        // 5 distinct source hosts, each with one migrable instance, all of
        // equal size: Holistic will relocate several of them onto the
        // single most-loaded host. We fail the second dispatched call and
        // assert the loop still attempts the rest.
        let mut nodes = Vec::new();
        let mut instances = std::collections::HashMap::new();
        for i in 0..5u64 {
            let hostname = format!("host-{i}");
            nodes.push(NodeRecord {
                hostname: hostname.clone(),
                vcpus: 10,
                memory_mb: 10_000,
                local_gb: 100,
                vcpus_used: 0,
                memory_mb_used: 0,
                local_gb_used: 0,
                compute_agent_enabled: true,
            });
            instances.insert(
                hostname.clone(),
                vec![InstanceRecord {
                    id: i + 1,
                    vcpus: 1,
                    memory_mb: 1_000,
                    root_gb: 10,
                    vm_state_active: true,
                    power_state_running: true,
                    host: hostname,
                }],
            );
        }
        let inventory = FakeInventory { nodes, instances };

        let compute = Arc::new(RecordingCompute {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(2),
        });
        let compute_dyn: Arc<dyn ComputeApi> = compute.clone();

        let mut config = ConsolidatorConfig::default();
        config.engine = EngineKind::Holistic;

        let control_loop = ControlLoop::new(Arc::new(inventory), compute_dyn, config);
        let result = control_loop.run_tick().await;
        assert!(result.is_ok());
        assert!(compute.calls.lock().unwrap().len() >= 2);
    }
}
