pub mod crossover;
pub mod fitness;
pub mod selection;

use std::collections::HashMap;

use rand::rngs::ThreadRng;
use rand::Rng;

use super::{ConsolidationEngine, EngineMetadata};
use crate::config::{FitnessFunction, GaConfig};
use crate::error::CoreError;
use crate::host::Host;
use crate::metrics::{fits, ResourceVec};
use crate::placement::Placement;
use crate::snapshot::Snapshot;
use fitness::{FitnessFn, HostLoad, MetricsFitness, RandomRatingFitness};

type Chromosome = Vec<String>;

/// Population-based search over placements (spec.md 4.D): selection,
/// crossover, mutation, elitism, capacity repair by rejection, fitness by
/// utilization.
pub struct GaEngine {
    config: GaConfig,
}

impl GaEngine {
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    fn fitness_fn(&self) -> Box<dyn FitnessFn> {
        match self.config.fitness_function {
            FitnessFunction::Metrics => Box::new(MetricsFitness {
                vcpu_weight: self.config.vcpu_weight,
                ram_weight: self.config.ram_weight,
                disk_weight: self.config.disk_weight,
            }),
            FitnessFunction::Random => Box::new(RandomRatingFitness),
        }
    }
}

impl ConsolidationEngine for GaEngine {
    fn build_placement(
        &self,
        snapshot: &Snapshot,
    ) -> Result<(Placement, EngineMetadata), CoreError> {
        if snapshot.node_count() == 0 || snapshot.migrable_count() == 0 {
            return Ok((Placement::new(HashMap::new()), EngineMetadata::None));
        }

        let hosts = snapshot.nodes();
        let migrable_order = snapshot.migrable_order();
        let flavors: Vec<ResourceVec> = migrable_order
            .iter()
            .map(|&id| {
                snapshot
                    .instance(id)
                    .map(|i| i.flavor)
                    .ok_or_else(|| CoreError::invariant(format!("unknown instance {id}")))
            })
            .collect::<Result<_, _>>()?;

        let fitness_fn = self.fitness_fn();
        let max_fitness = match self.config.fitness_function {
            FitnessFunction::Metrics => theoretical_max_fitness(
                &hosts,
                &flavors,
                (
                    self.config.vcpu_weight,
                    self.config.ram_weight,
                    self.config.disk_weight,
                ),
            ),
            FitnessFunction::Random => f64::INFINITY,
        };

        let mut rng = rand::thread_rng();

        let pop_size = self.config.population_size;
        let mut population: Vec<(Chromosome, f64)> = (0..pop_size)
            .map(|_| {
                let chromosome = build_valid_chromosome(&hosts, &flavors, migrable_order, &mut rng)?;
                let score = evaluate(&chromosome, &hosts, &flavors, fitness_fn.as_ref());
                Ok((chromosome, score))
            })
            .collect::<Result<_, CoreError>>()?;
        sort_desc(&mut population);

        let elite_count = ((self.config.elitism_perc as f64 / 100.0) * pop_size as f64).round() as usize;
        let k = ((self.config.k_perc as f64 / 100.0) * pop_size as f64).round().max(1.0) as usize;

        for _epoch in 0..self.config.epoch_limit {
            if population[0].1 >= max_fitness {
                break;
            }

            let mut next: Vec<(Chromosome, f64)> = population[..elite_count.min(population.len())]
                .iter()
                .cloned()
                .collect();

            while next.len() < pop_size {
                let father_idx =
                    selection::select(self.config.selection_algorithm, population.len(), k, self.config.p, &mut rng);
                let father = &population[father_idx].0;

                let mut child = if rng.gen_bool(self.config.prob_crossover.clamp(0.0, 1.0)) {
                    let mother_idx = selection::select(
                        self.config.selection_algorithm,
                        population.len(),
                        k,
                        self.config.p,
                        &mut rng,
                    );
                    let mother = &population[mother_idx].0;
                    match self.config.crossover_function {
                        crate::config::CrossoverFunction::SinglePoint => {
                            crossover::single_point(father, mother, &mut rng)
                        }
                    }
                } else {
                    father.clone()
                };

                if !chromosome_is_valid(&child, &hosts, &flavors) {
                    child = father.clone();
                }

                if rng.gen_bool(self.config.prob_mutation.clamp(0.0, 1.0)) {
                    mutate(&mut child, &hosts, &flavors, self.config.mutation_perc, &mut rng);
                }

                let score = evaluate(&child, &hosts, &flavors, fitness_fn.as_ref());
                next.push((child, score));
            }

            sort_desc(&mut next);
            population = next;
        }

        let winner = &population[0].0;
        let assignments: HashMap<u64, String> = migrable_order
            .iter()
            .zip(winner.iter())
            .map(|(&id, host)| (id, host.clone()))
            .collect();

        Ok((Placement::new(assignments), EngineMetadata::None))
    }
}

fn sort_desc(population: &mut [(Chromosome, f64)]) {
    population.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}

fn evaluate(
    chromosome: &[String],
    hosts: &[&Host],
    flavors: &[ResourceVec],
    fitness_fn: &dyn FitnessFn,
) -> f64 {
    let tally = host_used_tally(chromosome, hosts, flavors);
    let loads: Vec<HostLoad<'_>> = hosts
        .iter()
        .map(|h| HostLoad {
            host: h,
            used: tally[h.hostname.as_str()],
        })
        .collect();
    fitness_fn.score(&loads)
}

/// Per-host `used = base + Σ flavor(i) for i assigned to this host`, given a
/// chromosome.
fn host_used_tally<'a>(
    chromosome: &[String],
    hosts: &'a [&'a Host],
    flavors: &[ResourceVec],
) -> HashMap<&'a str, ResourceVec> {
    let mut tally: HashMap<&str, ResourceVec> =
        hosts.iter().map(|h| (h.hostname.as_str(), h.base)).collect();
    for (gene, flavor) in chromosome.iter().zip(flavors.iter()) {
        if let Some(used) = tally.get_mut(gene.as_str()) {
            *used = used.checked_add(flavor);
        }
    }
    tally
}

/// `∀ host: base + Σ flavors assigned ≤ capacity` on every axis — the
/// standardized `≥ 0` residual predicate from spec.md section 9.
fn chromosome_is_valid(chromosome: &[String], hosts: &[&Host], flavors: &[ResourceVec]) -> bool {
    let tally = host_used_tally(chromosome, hosts, flavors);
    hosts
        .iter()
        .all(|h| tally[h.hostname.as_str()].le_on_every_axis(&h.capacity))
}

/// Builds one valid chromosome by placing each instance, in canonical
/// order, onto a uniformly chosen suitable host given the running
/// residuals (spec.md 4.D.1). Fails with `CoreError::no_suitable_host` if
/// some instance has no suitable host at all — a fatal, configuration-level
/// condition per spec.md 4.D.5.
fn build_valid_chromosome(
    hosts: &[&Host],
    flavors: &[ResourceVec],
    migrable_order: &[u64],
    rng: &mut ThreadRng,
) -> Result<Chromosome, CoreError> {
    let mut running: HashMap<&str, ResourceVec> =
        hosts.iter().map(|h| (h.hostname.as_str(), h.base)).collect();
    let mut chromosome = Vec::with_capacity(flavors.len());

    for (idx, flavor) in flavors.iter().enumerate() {
        let suitable: Vec<&Host> = hosts
            .iter()
            .filter(|h| fits(&h.capacity, &running[h.hostname.as_str()], flavor))
            .copied()
            .collect();

        if suitable.is_empty() {
            return Err(CoreError::no_suitable_host(migrable_order[idx]));
        }

        let chosen = suitable[rng.gen_range(0..suitable.len())];
        let used = running.get_mut(chosen.hostname.as_str()).unwrap();
        *used = used.checked_add(flavor);
        chromosome.push(chosen.hostname.clone());
    }

    Ok(chromosome)
}

/// Mutates `mutation_perc`% of genes, chosen uniformly without replacement.
/// Each mutated gene is reassigned to a suitable host other than its
/// current one, evaluated against the running tally as it's updated gene by
/// gene. A gene with no alternative suitable host is left unchanged — the
/// source has no documented behavior for this case, so we skip rather than
/// error, keeping mutation best-effort the way crossover's rejection is.
fn mutate(chromosome: &mut Chromosome, hosts: &[&Host], flavors: &[ResourceVec], mutation_perc: u32, rng: &mut ThreadRng) {
    let n = chromosome.len();
    if n == 0 {
        return;
    }
    // Owned keys: each mutated position re-inserts a freshly cloned hostname,
    // which a `HashMap<&str, _>` borrowed from `hosts` couldn't outlive.
    let mut running: HashMap<String, ResourceVec> = host_used_tally(chromosome, hosts, flavors)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    let count = ((mutation_perc as f64 / 100.0) * n as f64).round().max(1.0) as usize;
    let count = count.min(n);
    let positions = rand::seq::index::sample(rng, n, count).into_vec();

    for pos in positions {
        let current_host = chromosome[pos].clone();
        let flavor = flavors[pos];

        let used_without_current = running[current_host.as_str()].checked_sub(&flavor).unwrap_or(ResourceVec::ZERO);

        let suitable: Vec<&Host> = hosts
            .iter()
            .filter(|h| h.hostname != current_host)
            .filter(|h| fits(&h.capacity, &running[h.hostname.as_str()], &flavor))
            .copied()
            .collect();

        if suitable.is_empty() {
            continue;
        }

        let chosen = suitable[rng.gen_range(0..suitable.len())];
        running.insert(current_host.clone(), used_without_current);
        let new_used = running.get_mut(chosen.hostname.as_str()).unwrap();
        *new_used = new_used.checked_add(&flavor);
        chromosome[pos] = chosen.hostname.clone();
    }
}

/// Theoretical fitness upper bound `M*` (spec.md 4.D.2): the worst-case
/// smallest host capacity per axis, the worst-case largest base load per
/// axis, and all flavors landing on that single synthetic host, ratio
/// clipped to 1 per axis, scored by the same fitness function.
fn theoretical_max_fitness(hosts: &[&Host], flavors: &[ResourceVec], weights: (f64, f64, f64)) -> f64 {
    let min_cap = hosts.iter().fold(
        ResourceVec::new(u64::MAX, u64::MAX, u64::MAX),
        |acc, h| {
            ResourceVec::new(
                acc.vcpus.min(h.capacity.vcpus),
                acc.ram_mb.min(h.capacity.ram_mb),
                acc.disk_gb.min(h.capacity.disk_gb),
            )
        },
    );
    let max_base = hosts.iter().fold(ResourceVec::ZERO, |acc, h| {
        ResourceVec::new(
            acc.vcpus.max(h.base.vcpus),
            acc.ram_mb.max(h.base.ram_mb),
            acc.disk_gb.max(h.base.disk_gb),
        )
    });
    let flavor_sum = flavors
        .iter()
        .fold(ResourceVec::ZERO, |acc, f| acc.checked_add(f));
    let needed = max_base.checked_add(&flavor_sum);

    let ratio = |need: u64, cap: u64| if cap == 0 { 1.0 } else { (need as f64 / cap as f64).min(1.0) };

    weights.0 * ratio(needed.vcpus, min_cap.vcpus)
        + weights.1 * ratio(needed.ram_mb, min_cap.ram_mb)
        + weights.2 * ratio(needed.disk_gb, min_cap.disk_gb)
}
