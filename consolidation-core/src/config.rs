use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Selects which engine the consolidator drives on each tick. Modeled as an
/// enum plus a factory rather than the source's string-keyed class loading
/// (spec.md section 9, "dynamic engine selection").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    Base,
    Random,
    Ga,
    Holistic,
}

impl FromStr for EngineKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, CoreError> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(EngineKind::Base),
            "random" => Ok(EngineKind::Random),
            "ga" => Ok(EngineKind::Ga),
            "holistic" => Ok(EngineKind::Holistic),
            other => Err(CoreError::unknown_engine(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionAlgorithm {
    Tournament,
    Roulette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverFunction {
    SinglePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessFunction {
    Metrics,
    Random,
}

/// GA hyperparameters, defaults matching spec.md section 6's configuration
/// table exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaConfig {
    pub population_size: usize,
    pub epoch_limit: usize,
    pub prob_crossover: f64,
    pub prob_mutation: f64,
    pub mutation_perc: u32,
    pub elitism_perc: u32,
    pub selection_algorithm: SelectionAlgorithm,
    pub crossover_function: CrossoverFunction,
    pub fitness_function: FitnessFunction,
    pub vcpu_weight: f64,
    pub ram_weight: f64,
    pub disk_weight: f64,
    /// Tournament selection bias.
    pub p: f64,
    /// Tournament pool size as a percentage of the population.
    pub k_perc: u32,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 500,
            epoch_limit: 100,
            prob_crossover: 1.0,
            prob_mutation: 0.8,
            mutation_perc: 10,
            elitism_perc: 0,
            selection_algorithm: SelectionAlgorithm::Roulette,
            crossover_function: CrossoverFunction::SinglePoint,
            fitness_function: FitnessFunction::Metrics,
            vcpu_weight: 0.4,
            ram_weight: 0.4,
            disk_weight: 0.2,
            p: 1.0,
            k_perc: 25,
        }
    }
}

impl GaConfig {
    /// Grounded on `core-engine/src/vendor_data/config.rs`'s
    /// `validate() -> Vec<String>` pattern, collected here into a single
    /// `CoreError::InvalidConfiguration`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut problems = Vec::new();

        if self.population_size == 0 {
            problems.push("population_size must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.prob_crossover) {
            problems.push("prob_crossover must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.prob_mutation) {
            problems.push("prob_mutation must be in [0, 1]".to_string());
        }
        if self.mutation_perc > 100 {
            problems.push("mutation_perc must be <= 100".to_string());
        }
        if self.elitism_perc > 100 {
            problems.push("elitism_perc must be <= 100".to_string());
        }
        if self.k_perc == 0 || self.k_perc > 100 {
            problems.push("k_perc must be in (0, 100]".to_string());
        }
        if !(0.0..=1.0).contains(&self.p) {
            problems.push("p must be in [0, 1]".to_string());
        }
        let weight_sum = self.vcpu_weight + self.ram_weight + self.disk_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            problems.push(format!(
                "vcpu_weight + ram_weight + disk_weight must sum to 1.0, got {weight_sum}"
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::invalid_configuration(problems.join("; ")))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomConfig {
    pub migration_percentage: f64,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            migration_percentage: 1.0,
        }
    }
}

impl RandomConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.migration_percentage) {
            return Err(CoreError::invalid_configuration(
                "migration_percentage must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Top-level consolidator configuration (spec.md section 6). Passed by
/// value into the consolidator and engines at construction time rather than
/// read from a global singleton (spec.md section 9, "global configuration
/// singleton").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatorConfig {
    pub engine: EngineKind,
    pub consolidation_interval_secs: u64,
    pub ga: GaConfig,
    pub random: RandomConfig,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Base,
            consolidation_interval_secs: 10,
            ga: GaConfig::default(),
            random: RandomConfig::default(),
        }
    }
}

impl ConsolidatorConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.ga.validate()?;
        self.random.validate()?;
        if self.consolidation_interval_secs == 0 {
            return Err(CoreError::invalid_configuration(
                "consolidation_interval must be > 0",
            ));
        }
        Ok(())
    }

    /// Factory from the engine-kind enum to a boxed engine instance
    /// (spec.md section 9, "dynamic engine selection").
    pub fn build_engine(&self) -> Box<dyn crate::engine::ConsolidationEngine> {
        match self.engine {
            EngineKind::Base => Box::new(crate::engine::BaseEngine),
            EngineKind::Random => Box::new(crate::engine::random::RandomEngine {
                migration_percentage: self.random.migration_percentage,
            }),
            EngineKind::Holistic => Box::new(crate::engine::holistic::HolisticEngine),
            EngineKind::Ga => Box::new(crate::engine::ga::GaEngine::new(self.ga)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConsolidatorConfig::default().validate().is_ok());
    }

    #[test]
    fn unknown_engine_name_is_rejected() {
        assert!(matches!(
            EngineKind::from_str("quantum"),
            Err(CoreError::UnknownEngine(_))
        ));
    }

    #[test]
    fn engine_kind_parsing_is_case_insensitive() {
        assert_eq!(EngineKind::from_str("HOLISTIC").unwrap(), EngineKind::Holistic);
    }

    #[test]
    fn mismatched_fitness_weights_are_rejected() {
        let mut ga = GaConfig::default();
        ga.vcpu_weight = 0.9;
        assert!(ga.validate().is_err());
    }

    #[test]
    fn zero_population_is_rejected() {
        let mut ga = GaConfig::default();
        ga.population_size = 0;
        assert!(ga.validate().is_err());
    }
}
