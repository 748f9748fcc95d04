//! Placement engine for the workload consolidation controller: metrics,
//! snapshot, placement, migration, the Holistic/GA/Random engines, and the
//! consolidator that wires an engine's output through diff + transitive
//! closure. No I/O, no async — the control loop around this crate lives in
//! `consolidation-controller`.

pub mod config;
pub mod consolidator;
pub mod engine;
pub mod error;
pub mod host;
pub mod instance;
pub mod metrics;
pub mod migration;
pub mod placement;
pub mod snapshot;

pub use config::{ConsolidatorConfig, EngineKind, GaConfig, RandomConfig};
pub use consolidator::{consolidate, ConsolidationOutcome};
pub use error::CoreError;
pub use host::Host;
pub use instance::Instance;
pub use metrics::ResourceVec;
pub use migration::Migration;
pub use placement::Placement;
pub use snapshot::{InstanceRecord, NodeRecord, Snapshot};

pub type Result<T> = std::result::Result<T, CoreError>;
