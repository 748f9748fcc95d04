use std::cmp::Ordering;
use std::collections::HashMap;

use super::{ConsolidationEngine, EngineMetadata};
use crate::error::CoreError;
use crate::host::Host;
use crate::metrics::fits;
use crate::placement::Placement;
use crate::snapshot::Snapshot;

/// Deterministic greedy reshuffle: empty the least-loaded hosts into the
/// most-loaded ones, per spec.md 4.C.
pub struct HolisticEngine;

impl ConsolidationEngine for HolisticEngine {
    fn build_placement(
        &self,
        snapshot: &Snapshot,
    ) -> Result<(Placement, EngineMetadata), CoreError> {
        if snapshot.node_count() == 0 || snapshot.migrable_count() == 0 {
            return Ok((
                Placement::new(HashMap::new()),
                EngineMetadata::Holistic {
                    released_fewer_than_was_used: false,
                },
            ));
        }

        let hosts = snapshot.nodes();
        let mut running_used = HashMap::new();
        for host in &hosts {
            let flavors = snapshot
                .instances_migrable(&host.hostname)
                .into_iter()
                .map(|i| i.flavor);
            running_used.insert(host.hostname.as_str(), host.used(flavors));
        }

        let before_non_empty = running_used.values().filter(|u| u.vcpus > 0).count();

        // Step 1: sort by load_key descending, ties broken by hostname ascending.
        let mut sorted: Vec<&Host> = hosts;
        sorted.sort_by(|a, b| {
            let ka = a.load_key(&running_used[a.hostname.as_str()]);
            let kb = b.load_key(&running_used[b.hostname.as_str()]);
            kb.partial_cmp(&ka)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.hostname.cmp(&b.hostname))
        });

        let len = sorted.len();
        let mut placement: HashMap<u64, String> = snapshot
            .migrable_order()
            .iter()
            .filter_map(|&id| snapshot.instance(id).map(|i| (id, i.host.clone())))
            .collect();

        for index in 1..=len {
            let source = sorted[len - index];

            let mut source_instances: Vec<_> = snapshot
                .instances_migrable(&source.hostname)
                .into_iter()
                .filter(|instance| {
                    placement.get(&instance.id).map(String::as_str) == Some(source.hostname.as_str())
                })
                .collect();
            // Step 2: big-first best-fit within the source host.
            source_instances.sort_by(|a, b| b.flavor.weight().cmp(&a.flavor.weight()));

            let dest_candidates = &sorted[0..len - index];

            for instance in source_instances {
                for dest in dest_candidates {
                    let dest_used = running_used[dest.hostname.as_str()];
                    if fits(&dest.capacity, &dest_used, &instance.flavor) {
                        let source_used = running_used[source.hostname.as_str()];
                        let new_source_used = source_used.checked_sub(&instance.flavor)?;
                        running_used.insert(source.hostname.as_str(), new_source_used);
                        running_used.insert(
                            dest.hostname.as_str(),
                            dest_used.checked_add(&instance.flavor),
                        );
                        placement.insert(instance.id, dest.hostname.clone());
                        break;
                    }
                }
            }
        }

        let after_non_empty = running_used.values().filter(|u| u.vcpus > 0).count();

        Ok((
            Placement::new(placement),
            EngineMetadata::Holistic {
                released_fewer_than_was_used: after_non_empty < before_non_empty,
            },
        ))
    }
}
