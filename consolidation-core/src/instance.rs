use crate::metrics::ResourceVec;
use serde::{Deserialize, Serialize};

/// A virtual machine instance as observed in a Snapshot.
///
/// `vm_state_active`/`power_state_running` are already reduced to booleans by
/// the time the instance reaches this crate — the inventory source is
/// responsible for mapping its own richer state enums down to "is this
/// ACTIVE and RUNNING", the only distinction the engines care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: u64,
    pub host: String,
    pub flavor: ResourceVec,
    pub vm_state_active: bool,
    pub power_state_running: bool,
}

impl Instance {
    pub fn new(
        id: u64,
        host: impl Into<String>,
        flavor: ResourceVec,
        vm_state_active: bool,
        power_state_running: bool,
    ) -> Self {
        Self {
            id,
            host: host.into(),
            flavor,
            vm_state_active,
            power_state_running,
        }
    }

    /// `migrable ⇔ vm_state=ACTIVE ∧ power_state=RUNNING`.
    pub fn is_migrable(&self) -> bool {
        self.vm_state_active && self.power_state_running
    }
}
