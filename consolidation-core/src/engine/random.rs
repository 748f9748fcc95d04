use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::{ConsolidationEngine, EngineMetadata};
use crate::error::CoreError;
use crate::metrics::{fits, ResourceVec};
use crate::placement::Placement;
use crate::snapshot::Snapshot;

/// **[SUPPLEMENT]** Random engine, grounded on
/// `original_source/nova/consolidator/base.py`'s `RandomConsolidator`
/// (spec.md's distillation names this engine in its configuration table and
/// testable properties but never describes its algorithm in a `[MODULE]`
/// block).
///
/// Touches `migration_percentage` of the migrable instances by repeatedly
/// choosing a random source host, moving a random migrable instance off it
/// to a different randomly chosen host, and falling through to the next
/// candidate source host once the current one has nothing left to offer.
pub struct RandomEngine {
    /// Fraction (not percent, despite the configuration key's name) of
    /// migrable instances to touch, in `[0.0, 1.0]`.
    pub migration_percentage: f64,
}

impl ConsolidationEngine for RandomEngine {
    fn build_placement(
        &self,
        snapshot: &Snapshot,
    ) -> Result<(Placement, EngineMetadata), CoreError> {
        let identity: HashMap<u64, String> = snapshot
            .migrable_order()
            .iter()
            .filter_map(|&id| snapshot.instance(id).map(|i| (id, i.host.clone())))
            .collect();

        if snapshot.node_count() < 2 || snapshot.migrable_count() == 0 {
            return Ok((Placement::new(identity), EngineMetadata::None));
        }

        let target_count =
            ((snapshot.migrable_count() as f64) * self.migration_percentage).floor() as usize;
        if target_count == 0 {
            return Ok((Placement::new(identity), EngineMetadata::None));
        }

        let mut rng = rand::thread_rng();
        let hostnames: Vec<String> = snapshot.nodes().iter().map(|h| h.hostname.clone()).collect();

        let mut pool: HashMap<String, Vec<u64>> = hostnames
            .iter()
            .map(|h| {
                (
                    h.clone(),
                    snapshot
                        .instances_migrable(h)
                        .into_iter()
                        .map(|i| i.id)
                        .collect(),
                )
            })
            .collect();

        let mut candidate_sources = hostnames.clone();
        candidate_sources.shuffle(&mut rng);

        let mut running_used: HashMap<&str, ResourceVec> = HashMap::new();
        for host in snapshot.nodes() {
            let flavors = snapshot
                .instances_migrable(&host.hostname)
                .into_iter()
                .map(|i| i.flavor);
            running_used.insert(host.hostname.as_str(), host.used(flavors));
        }

        let mut placement = identity;
        let mut moved = 0;

        while moved < target_count {
            let Some(source) = candidate_sources.last().cloned() else {
                break;
            };

            let source_empty = pool.get(&source).map(|v| v.is_empty()).unwrap_or(true);
            if source_empty {
                candidate_sources.pop();
                continue;
            }

            let source_pool = pool.get_mut(&source).expect("checked non-empty above");
            let pick = rng.gen_range(0..source_pool.len());
            let instance_id = source_pool.remove(pick);
            let flavor = snapshot
                .instance(instance_id)
                .map(|i| i.flavor)
                .ok_or_else(|| CoreError::invariant(format!("unknown instance {instance_id}")))?;

            // Only destinations with room are candidates, keeping Random's
            // output a valid Placement the same as every other engine.
            let mut destinations: Vec<String> = hostnames
                .iter()
                .filter(|h| **h != source)
                .filter(|h| {
                    snapshot
                        .host(h)
                        .map(|host| fits(&host.capacity, &running_used[h.as_str()], &flavor))
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            destinations.shuffle(&mut rng);

            if let Some(destination) = destinations.into_iter().next() {
                let dest_key = hostnames
                    .iter()
                    .find(|h| **h == destination)
                    .map(String::as_str)
                    .expect("destination drawn from hostnames");
                let dest_used = running_used[dest_key];
                running_used.insert(dest_key, dest_used.checked_add(&flavor));
                placement.insert(instance_id, destination);
                moved += 1;
            }
        }

        Ok((Placement::new(placement), EngineMetadata::None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::diff;
    use crate::snapshot::{InstanceRecord, NodeRecord};
    use std::collections::HashMap as Map;

    fn node(hostname: &str) -> NodeRecord {
        NodeRecord {
            hostname: hostname.to_string(),
            vcpus: 100,
            memory_mb: 100_000,
            local_gb: 1000,
            vcpus_used: 0,
            memory_mb_used: 0,
            local_gb_used: 0,
            compute_agent_enabled: true,
        }
    }

    fn instance(id: u64, host: &str) -> InstanceRecord {
        InstanceRecord {
            id,
            vcpus: 1,
            memory_mb: 100,
            root_gb: 5,
            vm_state_active: true,
            power_state_running: true,
            host: host.to_string(),
        }
    }

    #[test]
    fn single_node_produces_empty_plan() {
        let nodes = vec![node("only")];
        let mut by_host = Map::new();
        by_host.insert("only".to_string(), vec![instance(1, "only")]);
        let snapshot = Snapshot::from_records(nodes, by_host).unwrap();

        let engine = RandomEngine {
            migration_percentage: 1.0,
        };
        let (placement, _) = engine.build_placement(&snapshot).unwrap();
        assert!(diff(&snapshot, &placement).is_empty());
    }

    #[test]
    fn full_percentage_moves_every_migrable_instance() {
        let nodes = vec![node("a"), node("b")];
        let mut by_host = Map::new();
        by_host.insert(
            "a".to_string(),
            (0..4).map(|i| instance(i, "a")).collect(),
        );
        by_host.insert("b".to_string(), vec![]);
        let snapshot = Snapshot::from_records(nodes, by_host).unwrap();

        let engine = RandomEngine {
            migration_percentage: 1.0,
        };
        let (placement, _) = engine.build_placement(&snapshot).unwrap();
        let migrations = diff(&snapshot, &placement);
        assert_eq!(migrations.len(), 4);
        for m in migrations {
            assert_eq!(m.destination_host, "b");
        }
    }

    #[test]
    fn zero_percentage_moves_nothing() {
        let nodes = vec![node("a"), node("b")];
        let mut by_host = Map::new();
        by_host.insert("a".to_string(), vec![instance(1, "a")]);
        by_host.insert("b".to_string(), vec![]);
        let snapshot = Snapshot::from_records(nodes, by_host).unwrap();

        let engine = RandomEngine {
            migration_percentage: 0.0,
        };
        let (placement, _) = engine.build_placement(&snapshot).unwrap();
        assert!(diff(&snapshot, &placement).is_empty());
    }
}
