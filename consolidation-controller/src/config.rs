use std::str::FromStr;

use consolidation_core::{ConsolidatorConfig, EngineKind, GaConfig, RandomConfig};

use crate::error::ConfigError;

/// Process-wide configuration, loaded once at startup and never hot-reloaded
/// (spec.md section 5, "configuration state"). Passed by value into the
/// control loop rather than read from a global singleton.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub inventory_base_url: String,
    pub compute_base_url: String,
    pub consolidator: ConsolidatorConfig,
}

impl AppConfig {
    /// Loads configuration the way `backend/src/services/auth_service.rs`
    /// does: `std::env::var(...).unwrap_or(...)` layered over the defaults,
    /// validated once before the control loop starts.
    pub fn from_env() -> Result<Self, ConfigError> {
        let engine = std::env::var("CONSOLIDATOR_CLASS")
            .ok()
            .map(|s| EngineKind::from_str(&s))
            .transpose()?
            .unwrap_or(EngineKind::Base);

        let consolidation_interval_secs = std::env::var("CONSOLIDATION_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let migration_percentage = std::env::var("MIGRATION_PERCENTAGE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        let ga = GaConfig {
            population_size: env_parsed("POPULATION_SIZE", 500),
            epoch_limit: env_parsed("EPOCH_LIMIT", 100),
            prob_crossover: env_parsed("PROB_CROSSOVER", 1.0),
            prob_mutation: env_parsed("PROB_MUTATION", 0.8),
            mutation_perc: env_parsed("MUTATION_PERC", 10),
            elitism_perc: env_parsed("ELITISM_PERC", 0),
            ..GaConfig::default()
        };

        let config = AppConfig {
            inventory_base_url: std::env::var("INVENTORY_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8774".to_string()),
            compute_base_url: std::env::var("COMPUTE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8775".to_string()),
            consolidator: ConsolidatorConfig {
                engine,
                consolidation_interval_secs,
                ga,
                random: RandomConfig {
                    migration_percentage,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.consolidator.validate()?;
        if self.inventory_base_url.is_empty() {
            return Err(ConfigError::invalid("inventory_base_url must not be empty"));
        }
        if self.compute_base_url.is_empty() {
            return Err(ConfigError::invalid("compute_base_url must not be empty"));
        }
        Ok(())
    }
}

fn env_parsed<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_app_config_is_valid() {
        let config = AppConfig {
            inventory_base_url: "http://localhost:8774".to_string(),
            compute_base_url: "http://localhost:8775".to_string(),
            consolidator: ConsolidatorConfig::default(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_inventory_url_is_rejected() {
        let config = AppConfig {
            inventory_base_url: String::new(),
            compute_base_url: "http://localhost:8775".to_string(),
            consolidator: ConsolidatorConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}
