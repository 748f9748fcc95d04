use std::collections::HashMap;

use crate::error::CoreError;
use crate::metrics::ResourceVec;
use crate::snapshot::Snapshot;

/// A total function from migrable-instance-id to destination hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement(HashMap<u64, String>);

impl Placement {
    pub fn new(assignments: HashMap<u64, String>) -> Self {
        Self(assignments)
    }

    pub fn host_of(&self, instance_id: u64) -> Option<&str> {
        self.0.get(&instance_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.0.iter().map(|(id, host)| (*id, host.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validity per spec.md section 3: for every host, `base + Σ flavors ≤
    /// capacity` on all three axes.
    pub fn validate(&self, snapshot: &Snapshot) -> Result<(), CoreError> {
        let mut used: HashMap<&str, ResourceVec> = HashMap::new();

        for host in snapshot.nodes() {
            used.insert(host.hostname.as_str(), host.base);
        }

        for (instance_id, hostname) in self.iter() {
            let instance = snapshot.instance(instance_id).ok_or_else(|| {
                CoreError::invariant(format!(
                    "placement references unknown instance {instance_id}"
                ))
            })?;
            let entry = used.get_mut(hostname).ok_or_else(|| {
                CoreError::invariant(format!("placement references unknown host '{hostname}'"))
            })?;
            *entry = entry.checked_add(&instance.flavor);
        }

        for host in snapshot.nodes() {
            let total = used[host.hostname.as_str()];
            if total.vcpus > host.capacity.vcpus {
                return Err(CoreError::capacity_exceeded(
                    host.hostname.clone(),
                    "vcpus",
                    total.vcpus - host.capacity.vcpus,
                ));
            }
            if total.ram_mb > host.capacity.ram_mb {
                return Err(CoreError::capacity_exceeded(
                    host.hostname.clone(),
                    "ram_mb",
                    total.ram_mb - host.capacity.ram_mb,
                ));
            }
            if total.disk_gb > host.capacity.disk_gb {
                return Err(CoreError::capacity_exceeded(
                    host.hostname.clone(),
                    "disk_gb",
                    total.disk_gb - host.capacity.disk_gb,
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{InstanceRecord, NodeRecord};
    use std::collections::HashMap as Map;

    fn snapshot_two_hosts() -> Snapshot {
        let nodes = vec![
            NodeRecord {
                hostname: "a".into(),
                vcpus: 4,
                memory_mb: 4096,
                local_gb: 100,
                vcpus_used: 0,
                memory_mb_used: 0,
                local_gb_used: 0,
                compute_agent_enabled: true,
            },
            NodeRecord {
                hostname: "b".into(),
                vcpus: 4,
                memory_mb: 4096,
                local_gb: 100,
                vcpus_used: 0,
                memory_mb_used: 0,
                local_gb_used: 0,
                compute_agent_enabled: true,
            },
        ];
        let mut by_host = Map::new();
        by_host.insert(
            "a".to_string(),
            vec![InstanceRecord {
                id: 1,
                vcpus: 2,
                memory_mb: 2048,
                root_gb: 50,
                vm_state_active: true,
                power_state_running: true,
                host: "a".into(),
            }],
        );
        by_host.insert("b".to_string(), vec![]);
        Snapshot::from_records(nodes, by_host).unwrap()
    }

    #[test]
    fn validate_accepts_exact_fit() {
        let snap = snapshot_two_hosts();
        let mut assignments = Map::new();
        assignments.insert(1, "b".to_string());
        let placement = Placement::new(assignments);
        assert!(placement.validate(&snap).is_ok());
    }

    #[test]
    fn validate_rejects_capacity_overflow() {
        let nodes = vec![NodeRecord {
            hostname: "tiny".into(),
            vcpus: 1,
            memory_mb: 1024,
            local_gb: 10,
            vcpus_used: 0,
            memory_mb_used: 0,
            local_gb_used: 0,
            compute_agent_enabled: true,
        }];
        let mut by_host = Map::new();
        by_host.insert(
            "tiny".to_string(),
            vec![InstanceRecord {
                id: 1,
                vcpus: 2,
                memory_mb: 2048,
                root_gb: 50,
                vm_state_active: true,
                power_state_running: true,
                host: "tiny".into(),
            }],
        );
        let snap = Snapshot::from_records(nodes, by_host).unwrap();

        let mut assignments = Map::new();
        assignments.insert(1, "tiny".to_string());
        let placement = Placement::new(assignments);
        assert!(matches!(
            placement.validate(&snap),
            Err(CoreError::CapacityExceeded { .. })
        ));
    }
}
