pub mod ga;
pub mod holistic;
pub mod random;

use crate::error::CoreError;
use crate::placement::Placement;
use crate::snapshot::Snapshot;

/// Metadata an engine returns alongside its placement. Most engines have
/// nothing to report; Holistic reports whether it actually shrank the
/// number of occupied hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMetadata {
    #[default]
    None,
    Holistic {
        /// `true` iff the number of non-empty hosts after the pass is
        /// strictly less than before. Per the resolved Open Question in
        /// spec.md section 9, this is metadata attached to the plan, not a
        /// gate that suppresses dispatch.
        released_fewer_than_was_used: bool,
    },
}

/// Base-class-and-override pattern from spec.md section 9 modeled as a
/// trait: one method, `build_placement`, implemented per engine kind. The
/// "snapshot construction + transitive closure" wrapper that used to be a
/// parent class lives instead as the free function
/// [`crate::consolidator::consolidate`].
pub trait ConsolidationEngine: Send + Sync {
    fn build_placement(&self, snapshot: &Snapshot) -> Result<(Placement, EngineMetadata), CoreError>;
}

/// Builds the identity placement: every migrable instance stays on its
/// current host. This is the `Base` engine from spec.md section 6's
/// configuration table — a no-op baseline against which the others are
/// measured.
pub struct BaseEngine;

impl ConsolidationEngine for BaseEngine {
    fn build_placement(&self, snapshot: &Snapshot) -> Result<(Placement, EngineMetadata), CoreError> {
        let mut assignments = std::collections::HashMap::new();
        for &instance_id in snapshot.migrable_order() {
            if let Some(instance) = snapshot.instance(instance_id) {
                assignments.insert(instance_id, instance.host.clone());
            }
        }
        Ok((Placement::new(assignments), EngineMetadata::None))
    }
}
