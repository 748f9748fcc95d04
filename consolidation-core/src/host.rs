use crate::metrics::ResourceVec;
use serde::{Deserialize, Serialize};

/// A compute host and the derived views the engines need, computed once at
/// Snapshot construction. Grounded on spec.md 4.A's "explicit adapter
/// struct" resolution of the source's attribute-forwarding wrapper: rather
/// than forwarding unknown attribute reads to a wrapped inventory node, this
/// struct copies the fields it needs and precomputes the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub hostname: String,
    pub capacity: ResourceVec,
    /// Resources consumed by non-migrable instances pinned to this host.
    pub base: ResourceVec,
    /// Ids of instances currently running on this host, partitioned below.
    pub migrable_instance_ids: Vec<u64>,
    pub not_migrable_instance_ids: Vec<u64>,
}

impl Host {
    pub fn new(hostname: impl Into<String>, capacity: ResourceVec, base: ResourceVec) -> Self {
        Self {
            hostname: hostname.into(),
            capacity,
            base,
            migrable_instance_ids: Vec::new(),
            not_migrable_instance_ids: Vec::new(),
        }
    }

    /// `used = base + Σ flavor(i) for i currently placed`, given the
    /// flavors of the migrable instances presently assigned here.
    pub fn used(&self, migrable_flavors: impl IntoIterator<Item = ResourceVec>) -> ResourceVec {
        migrable_flavors
            .into_iter()
            .fold(self.base, |acc, f| acc.checked_add(&f))
    }

    /// Per-axis utilization ratios, `used / capacity`.
    pub fn ratios(&self, used: &ResourceVec) -> (f64, f64, f64) {
        used.ratios(&self.capacity)
    }

    /// `load_key` from spec.md 4.C step 1: uniformly-weighted sum of the
    /// three per-axis ratios. Any positive monotone combination works; only
    /// the ordering it induces matters.
    pub fn load_key(&self, used: &ResourceVec) -> f64 {
        let (v, r, d) = self.ratios(used);
        0.3 * v + 0.3 * r + 0.3 * d
    }
}
