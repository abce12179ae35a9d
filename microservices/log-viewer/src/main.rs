//! Log Viewer
//!
//! Menu-driven terminal client for the rows the consumer has stored.

use logpipe_core::{PipelineError, Result};
use logpipe_store::{PgEventStore, PoolConfig, StorePool};
use logpipe_telemetry::TelemetryConfig;
use tokio::io::BufReader;
use tracing::info;

mod config;
mod format;
mod menu;
mod viewer;

use config::ViewerConfig;
use viewer::Viewer;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = logpipe_telemetry::init_with(TelemetryConfig::interactive("log-viewer"))
        .map_err(|e| PipelineError::Config(e.to_string()))?;

    let config = ViewerConfig::from_env()?;
    let pool = StorePool::new(PoolConfig::from(&config.database))?;
    pool.ping().await?;
    info!(host = %config.database.host, database = %config.database.database, "Connected");

    let store = PgEventStore::new(pool.clone());
    let mut viewer = Viewer::new(
        &store,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        config.settings,
    );
    let outcome = viewer.run().await;

    pool.close();
    outcome.map_err(PipelineError::from)
}
