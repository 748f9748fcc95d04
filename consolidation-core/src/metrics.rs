//! Three-axis resource tuple `(vcpus, ram_mb, disk_gb)` and the suitability
//! test shared by every placement engine.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// A non-negative `(vcpus, ram_mb, disk_gb)` tuple.
///
/// Addition and subtraction are checked: subtracting more than is present on
/// any axis is a programmer error (an invariant violation), not a recoverable
/// condition, so it returns `CoreError::Invariant` rather than panicking or
/// silently clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceVec {
    pub vcpus: u64,
    pub ram_mb: u64,
    pub disk_gb: u64,
}

impl ResourceVec {
    pub const ZERO: ResourceVec = ResourceVec {
        vcpus: 0,
        ram_mb: 0,
        disk_gb: 0,
    };

    pub fn new(vcpus: u64, ram_mb: u64, disk_gb: u64) -> Self {
        Self {
            vcpus,
            ram_mb,
            disk_gb,
        }
    }

    pub fn checked_add(&self, other: &ResourceVec) -> ResourceVec {
        ResourceVec {
            vcpus: self.vcpus + other.vcpus,
            ram_mb: self.ram_mb + other.ram_mb,
            disk_gb: self.disk_gb + other.disk_gb,
        }
    }

    /// Component-wise subtraction. Errs instead of wrapping/panicking if any
    /// axis would go negative.
    pub fn checked_sub(&self, other: &ResourceVec) -> Result<ResourceVec, CoreError> {
        let sub_axis = |a: u64, b: u64, axis: &str| -> Result<u64, CoreError> {
            a.checked_sub(b).ok_or_else(|| {
                CoreError::invariant(format!(
                    "cannot subtract {b} from {a} on axis '{axis}'"
                ))
            })
        };

        Ok(ResourceVec {
            vcpus: sub_axis(self.vcpus, other.vcpus, "vcpus")?,
            ram_mb: sub_axis(self.ram_mb, other.ram_mb, "ram_mb")?,
            disk_gb: sub_axis(self.disk_gb, other.disk_gb, "disk_gb")?,
        })
    }

    /// `true` iff every axis of `self` is `<=` the matching axis of `other`.
    pub fn le_on_every_axis(&self, other: &ResourceVec) -> bool {
        self.vcpus <= other.vcpus && self.ram_mb <= other.ram_mb && self.disk_gb <= other.disk_gb
    }

    /// Per-axis utilization ratios `self / capacity`, as floats.
    pub fn ratios(&self, capacity: &ResourceVec) -> (f64, f64, f64) {
        let ratio = |used: u64, cap: u64| if cap == 0 { 0.0 } else { used as f64 / cap as f64 };
        (
            ratio(self.vcpus, capacity.vcpus),
            ratio(self.ram_mb, capacity.ram_mb),
            ratio(self.disk_gb, capacity.disk_gb),
        )
    }

    /// Scalar "size" used to rank instances/hosts by weight (vcpus+ram+disk).
    pub fn weight(&self) -> u64 {
        self.vcpus + self.ram_mb + self.disk_gb
    }
}

/// `fits(host, flavor, current_used) = ∀ axis: C[axis] − used[axis] − flavor[axis] ≥ 0`
///
/// The single suitability predicate shared by the Holistic and GA engines
/// (standardized on "fits exactly is allowed", i.e. `>= 0`, per the resolved
/// Open Question in spec.md section 9).
pub fn fits(capacity: &ResourceVec, used: &ResourceVec, flavor: &ResourceVec) -> bool {
    capacity.vcpus >= used.vcpus + flavor.vcpus
        && capacity.ram_mb >= used.ram_mb + flavor.ram_mb
        && capacity.disk_gb >= used.disk_gb + flavor.disk_gb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_roundtrip() {
        let a = ResourceVec::new(4, 16, 100);
        let b = ResourceVec::new(1, 2, 3);
        let sum = a.checked_add(&b);
        assert_eq!(sum, ResourceVec::new(5, 18, 103));
        assert_eq!(sum.checked_sub(&b).unwrap(), a);
    }

    #[test]
    fn sub_below_zero_is_invariant_error() {
        let a = ResourceVec::new(1, 1, 1);
        let b = ResourceVec::new(2, 0, 0);
        assert!(matches!(a.checked_sub(&b), Err(CoreError::Invariant(_))));
    }

    #[test]
    fn fits_allows_exact_match() {
        let cap = ResourceVec::new(10, 10, 10);
        let used = ResourceVec::new(8, 8, 8);
        let flavor = ResourceVec::new(2, 2, 2);
        assert!(fits(&cap, &used, &flavor));
    }

    #[test]
    fn fits_rejects_overflow_on_any_axis() {
        let cap = ResourceVec::new(10, 10, 10);
        let used = ResourceVec::new(9, 0, 0);
        let flavor = ResourceVec::new(2, 0, 0);
        assert!(!fits(&cap, &used, &flavor));
    }
}
