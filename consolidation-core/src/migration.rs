use std::collections::HashMap;

use crate::placement::Placement;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// `(instance, destination_host)` where `destination_host != instance.current_host`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub instance_id: u64,
    pub destination_host: String,
}

impl Migration {
    pub fn new(instance_id: u64, destination_host: impl Into<String>) -> Self {
        Self {
            instance_id,
            destination_host: destination_host.into(),
        }
    }
}

/// `diff(snapshot, placement) = { (i, P[i]) : i ∈ migrable(S), P[i] ≠ S.host(i) }`
/// (spec.md 4.E). Instances the placement left on their current host produce
/// no migration.
pub fn diff(snapshot: &Snapshot, placement: &Placement) -> Vec<Migration> {
    snapshot
        .migrable_order()
        .iter()
        .filter_map(|&instance_id| {
            let instance = snapshot.instance(instance_id)?;
            let destination = placement.host_of(instance_id)?;
            if destination != instance.host {
                Some(Migration::new(instance_id, destination))
            } else {
                None
            }
        })
        .collect()
}

/// Collapses a migration list to the last occurrence per instance id,
/// preserving the relative order of those last occurrences. Idempotent:
/// `transitive_closure(transitive_closure(x)) == transitive_closure(x)`.
///
/// Grounded on the worked example in spec.md section 8:
/// `[(i1→A),(i2→B),(i1→C),(i3→A),(i1→D)] -> [(i2→B),(i3→A),(i1→D)]`.
pub fn transitive_closure(migrations: &[Migration]) -> Vec<Migration> {
    let mut last_index: HashMap<u64, usize> = HashMap::new();
    for (index, migration) in migrations.iter().enumerate() {
        last_index.insert(migration.instance_id, index);
    }

    migrations
        .iter()
        .enumerate()
        .filter(|(index, migration)| last_index.get(&migration.instance_id) == Some(index))
        .map(|(_, migration)| migration.clone())
        .collect()
}
