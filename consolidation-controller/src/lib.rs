//! The workload consolidation controller service: external-interface
//! traits, HTTP adapters, configuration loading, and the periodic control
//! loop that drives `consolidation-core`'s engines.

pub mod config;
pub mod control_loop;
pub mod error;
pub mod http_compute;
pub mod http_inventory;
pub mod interfaces;
pub mod snapshot_builder;

pub use config::AppConfig;
pub use control_loop::ControlLoop;
pub use error::ControllerError;
pub use http_compute::HttpComputeApi;
pub use http_inventory::HttpInventorySource;
pub use interfaces::{ComputeApi, InventorySource};

#[cfg(test)]
mod tests {
    use super::*;
    use consolidation_core::ConsolidatorConfig;
    use std::sync::Arc;

    #[test]
    fn control_loop_constructs_from_public_adapters_and_default_config() {
        let inventory: Arc<dyn InventorySource> =
            Arc::new(HttpInventorySource::new("http://localhost:8774"));
        let compute: Arc<dyn ComputeApi> = Arc::new(HttpComputeApi::new("http://localhost:8775"));
        let _control_loop = ControlLoop::new(inventory, compute, ConsolidatorConfig::default());
    }
}
