use std::sync::Arc;

use consolidation_controller::{AppConfig, ControlLoop, ComputeApi, HttpComputeApi, HttpInventorySource, InventorySource};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    info!(
        engine = ?config.consolidator.engine,
        interval_secs = config.consolidator.consolidation_interval_secs,
        "starting workload consolidation controller"
    );

    let inventory: Arc<dyn InventorySource> =
        Arc::new(HttpInventorySource::new(config.inventory_base_url.clone()));
    let compute: Arc<dyn ComputeApi> =
        Arc::new(HttpComputeApi::new(config.compute_base_url.clone()));

    ControlLoop::new(inventory, compute, config.consolidator)
        .run()
        .await;

    Ok(())
}
