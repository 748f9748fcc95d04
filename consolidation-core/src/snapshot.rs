use std::collections::HashMap;

use crate::error::CoreError;
use crate::host::Host;
use crate::instance::Instance;
use crate::metrics::ResourceVec;
use serde::{Deserialize, Serialize};

/// Raw compute node as reported by the inventory source (spec.md section 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub hostname: String,
    pub vcpus: u64,
    pub memory_mb: u64,
    pub local_gb: u64,
    pub vcpus_used: u64,
    pub memory_mb_used: u64,
    pub local_gb_used: u64,
    pub compute_agent_enabled: bool,
}

impl NodeRecord {
    pub fn capacity(&self) -> ResourceVec {
        ResourceVec::new(self.vcpus, self.memory_mb, self.local_gb)
    }
}

/// Raw instance record as reported by the inventory source (spec.md section 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: u64,
    pub vcpus: u64,
    pub memory_mb: u64,
    pub root_gb: u64,
    pub vm_state_active: bool,
    pub power_state_running: bool,
    pub host: String,
}

impl InstanceRecord {
    pub fn flavor(&self) -> ResourceVec {
        ResourceVec::new(self.vcpus, self.memory_mb, self.root_gb)
    }
}

/// Immutable observation of the cluster at a single consolidation tick.
///
/// Built once, eagerly, at the start of a tick and never mutated afterward —
/// the source's lazily-memoized accessors have no externally visible effect
/// once the snapshot is single-threaded and consumed within one tick, so all
/// derived views are computed up front here instead (spec.md section 9,
/// "lazy memoization" design note).
#[derive(Debug, Clone)]
pub struct Snapshot {
    hosts: HashMap<String, Host>,
    instances: HashMap<u64, Instance>,
    /// Migrable instance ids in a fixed canonical order (ascending id),
    /// the order a GA chromosome's positions map to.
    migrable_order: Vec<u64>,
}

impl Snapshot {
    /// Builds a Snapshot from raw inventory records. Synchronous and
    /// I/O-free: the async fetch from the inventory source is the caller's
    /// responsibility (`consolidation-controller::snapshot_builder`), this
    /// only does the filtering/classification spec.md 4.A describes.
    ///
    /// A node is included only if `compute_agent_enabled`; instances are
    /// only those reported present on an included node. Instances pointing
    /// at a host that was filtered out (or never listed) are dropped along
    /// with that host.
    pub fn from_records(
        nodes: Vec<NodeRecord>,
        mut instances_by_host: HashMap<String, Vec<InstanceRecord>>,
    ) -> Result<Snapshot, CoreError> {
        let mut hosts = HashMap::new();
        let mut instances = HashMap::new();

        for node in nodes.into_iter().filter(|n| n.compute_agent_enabled) {
            let records = instances_by_host.remove(&node.hostname).unwrap_or_default();

            let mut host = Host::new(node.hostname.clone(), node.capacity(), ResourceVec::ZERO);
            let mut base = ResourceVec::ZERO;

            for record in records {
                let instance = Instance::new(
                    record.id,
                    record.host.clone(),
                    record.flavor(),
                    record.vm_state_active,
                    record.power_state_running,
                );

                if instance.is_migrable() {
                    host.migrable_instance_ids.push(instance.id);
                } else {
                    host.not_migrable_instance_ids.push(instance.id);
                    base = base.checked_add(&instance.flavor);
                }

                instances.insert(instance.id, instance);
            }

            host.base = base;
            hosts.insert(host.hostname.clone(), host);
        }

        let mut migrable_order: Vec<u64> = hosts
            .values()
            .flat_map(|h| h.migrable_instance_ids.iter().copied())
            .collect();
        migrable_order.sort_unstable();

        Ok(Snapshot {
            hosts,
            instances,
            migrable_order,
        })
    }

    pub fn nodes(&self) -> Vec<&Host> {
        let mut out: Vec<&Host> = self.hosts.values().collect();
        out.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        out
    }

    pub fn host(&self, hostname: &str) -> Option<&Host> {
        self.hosts.get(hostname)
    }

    pub fn instance(&self, id: u64) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn instances_migrable(&self, hostname: &str) -> Vec<&Instance> {
        self.hosts
            .get(hostname)
            .into_iter()
            .flat_map(|h| h.migrable_instance_ids.iter())
            .filter_map(|id| self.instances.get(id))
            .collect()
    }

    pub fn instances_not_migrable(&self, hostname: &str) -> Vec<&Instance> {
        self.hosts
            .get(hostname)
            .into_iter()
            .flat_map(|h| h.not_migrable_instance_ids.iter())
            .filter_map(|id| self.instances.get(id))
            .collect()
    }

    /// The fixed canonical order migrable instances appear in — chromosome
    /// position *i* corresponds to `migrable_order()[i]`.
    pub fn migrable_order(&self) -> &[u64] {
        &self.migrable_order
    }

    pub fn node_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn migrable_count(&self) -> usize {
        self.migrable_order.len()
    }
}
