use tracing::info;

use crate::engine::{ConsolidationEngine, EngineMetadata};
use crate::error::CoreError;
use crate::migration::{self, Migration};
use crate::snapshot::Snapshot;

/// Result of one consolidation pass: the migrations to dispatch, in order,
/// plus whatever metadata the engine attached to its placement.
#[derive(Debug, Clone)]
pub struct ConsolidationOutcome {
    pub migrations: Vec<Migration>,
    pub metadata: EngineMetadata,
}

/// Drives one engine invocation end to end: precondition short-circuit,
/// `build_placement`, capacity validation, diff against the snapshot, and
/// transitive closure (spec.md 4.E).
///
/// This free function replaces the source's base-class wrapper (spec.md
/// section 9, "base-class + override pattern"): the engine only implements
/// `build_placement`, everything else is shared here.
pub fn consolidate(
    snapshot: &Snapshot,
    engine: &dyn ConsolidationEngine,
) -> Result<ConsolidationOutcome, CoreError> {
    if snapshot.node_count() == 0 || snapshot.migrable_count() == 0 {
        info!(
            nodes = snapshot.node_count(),
            migrable = snapshot.migrable_count(),
            "snapshot has nothing to consolidate, skipping engine"
        );
        return Ok(ConsolidationOutcome {
            migrations: Vec::new(),
            metadata: EngineMetadata::None,
        });
    }

    let (placement, metadata) = engine.build_placement(snapshot)?;
    placement.validate(snapshot)?;

    let raw_migrations = migration::diff(snapshot, &placement);
    let migrations = migration::transitive_closure(&raw_migrations);

    info!(count = migrations.len(), "consolidation plan computed");

    Ok(ConsolidationOutcome {
        migrations,
        metadata,
    })
}
