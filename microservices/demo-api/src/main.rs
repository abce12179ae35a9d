//! Demo API
//!
//! Small HTTP service for the pipeline to observe: fixed routes with
//! injected latency and random 500s, plus a deterministic `/health`.

use logpipe_core::{HealthStatus, PipelineError, PipelineService, Result, ServiceRuntime};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

mod catalog;
mod chaos;
mod config;
mod error;
mod routes;

use catalog::OrderBook;
use chaos::Chaos;
use config::DemoConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = logpipe_telemetry::init("demo-api")
        .map_err(|e| PipelineError::Config(e.to_string()))?;

    info!("Starting Demo API");

    let service = Arc::new(DemoService::new()?);
    ServiceRuntime::run(service).await
}

pub struct DemoService {
    config: DemoConfig,
    state: routes::AppState,
    start_time: Instant,
}

impl DemoService {
    pub fn new() -> Result<Self> {
        let config = DemoConfig::from_env()?;
        let state = routes::AppState {
            chaos: Arc::new(Chaos::new(config.slow_rate, config.failure_rate)),
            orders: Arc::new(OrderBook::default()),
        };

        Ok(Self {
            config,
            state,
            start_time: Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl PipelineService for DemoService {
    fn service_id(&self) -> &'static str {
        "demo-api"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Demo API");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.config.http_bind,
            slow_rate = self.config.slow_rate,
            failure_rate = self.config.failure_rate,
            "Starting Demo API"
        );

        let app = routes::router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
