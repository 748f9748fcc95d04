use crate::host::Host;
use crate::metrics::ResourceVec;

/// A chromosome's per-host utilization tallies, ready for scoring.
pub struct HostLoad<'a> {
    pub host: &'a Host,
    pub used: ResourceVec,
}

/// Scores a chromosome's resulting host utilization. Stateless with respect
/// to any population — a pure function of the per-host loads it is given.
pub trait FitnessFn: Send + Sync {
    fn score(&self, loads: &[HostLoad<'_>]) -> f64;
}

/// `w_v * avg(vcpu_ratio) + w_r * avg(ram_ratio) + w_d * avg(disk_ratio)`,
/// averaged over hosts that are non-empty under this chromosome (spec.md
/// 4.D.2). A host counts as empty when its vcpu ratio is 0.
pub struct MetricsFitness {
    pub vcpu_weight: f64,
    pub ram_weight: f64,
    pub disk_weight: f64,
}

impl FitnessFn for MetricsFitness {
    fn score(&self, loads: &[HostLoad<'_>]) -> f64 {
        let mut sum_vcpu = 0.0;
        let mut sum_ram = 0.0;
        let mut sum_disk = 0.0;
        let mut count = 0usize;

        for load in loads {
            let (vcpu_ratio, ram_ratio, disk_ratio) = load.used.ratios(&load.host.capacity);
            if vcpu_ratio == 0.0 {
                continue;
            }
            sum_vcpu += vcpu_ratio;
            sum_ram += ram_ratio;
            sum_disk += disk_ratio;
            count += 1;
        }

        if count == 0 {
            return 0.0;
        }

        let n = count as f64;
        self.vcpu_weight * (sum_vcpu / n)
            + self.ram_weight * (sum_ram / n)
            + self.disk_weight * (sum_disk / n)
    }
}

/// Grounded on `original_source/nova/consolidator/ga/functions.py`'s
/// `RandomFitnessFunction` — used only to exercise selection pressure in
/// tests/tuning, never the default.
pub struct RandomRatingFitness;

impl FitnessFn for RandomRatingFitness {
    fn score(&self, _loads: &[HostLoad<'_>]) -> f64 {
        rand::random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;

    #[test]
    fn empty_hosts_are_excluded_from_the_average() {
        let full = Host::new("full", ResourceVec::new(10, 10, 10), ResourceVec::ZERO);
        let empty = Host::new("empty", ResourceVec::new(10, 10, 10), ResourceVec::ZERO);

        let loads = vec![
            HostLoad {
                host: &full,
                used: ResourceVec::new(10, 10, 10),
            },
            HostLoad {
                host: &empty,
                used: ResourceVec::ZERO,
            },
        ];

        let fitness = MetricsFitness {
            vcpu_weight: 0.4,
            ram_weight: 0.4,
            disk_weight: 0.2,
        };
        assert_eq!(fitness.score(&loads), 1.0);
    }

    #[test]
    fn all_empty_scores_zero() {
        let fitness = MetricsFitness {
            vcpu_weight: 0.4,
            ram_weight: 0.4,
            disk_weight: 0.2,
        };
        assert_eq!(fitness.score(&[]), 0.0);
    }
}
