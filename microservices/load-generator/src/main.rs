//! Load Generator
//!
//! Fires a random burst of requests at the demo API every interval so the
//! producer has varied traffic to observe.

use logpipe_core::{HealthStatus, PipelineError, PipelineService, Result, ServiceRuntime};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

mod config;
mod plan;
mod runner;

use config::LoadConfig;
use runner::{BurstSummary, Runner};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = logpipe_telemetry::init("load-generator")
        .map_err(|e| PipelineError::Config(e.to_string()))?;

    info!("Starting Load Generator");

    let service = Arc::new(LoadService::new()?);
    ServiceRuntime::run(service).await
}

pub struct LoadService {
    config: LoadConfig,
    runner: Runner,
    totals: Arc<Mutex<BurstSummary>>,
    start_time: Instant,
}

impl LoadService {
    pub fn new() -> Result<Self> {
        let config = LoadConfig::from_env()?;
        let runner = Runner::new(&config.api_url, config.request_timeout)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        Ok(Self {
            config,
            runner,
            totals: Arc::new(Mutex::new(BurstSummary::default())),
            start_time: Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl PipelineService for LoadService {
    fn service_id(&self) -> &'static str {
        "load-generator"
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
        let totals = self.totals.lock().clone();
        info!(
            sent = totals.sent,
            succeeded = totals.succeeded,
            client_errors = totals.client_errors,
            server_errors = totals.server_errors,
            failed = totals.failed,
            "Shutting down Load Generator"
        );
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            api_url = %self.config.api_url,
            min_burst = self.config.min_burst,
            max_burst = self.config.max_burst,
            "Generating load"
        );

        let mut rng = StdRng::from_entropy();
        let mut ticker = interval(self.config.burst_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let targets = plan::plan_burst(&mut rng, self.config.min_burst..=self.config.max_burst);
            let runner = self.runner.clone();
            let totals = self.totals.clone();

            // a burst with slow responses must not push back the next one
            tokio::spawn(async move {
                let summary = runner.fire_burst(targets).await;
                info!(
                    sent = summary.sent,
                    succeeded = summary.succeeded,
                    client_errors = summary.client_errors,
                    server_errors = summary.server_errors,
                    failed = summary.failed,
                    "Burst complete"
                );
                totals.lock().merge(&summary);
            });
        }
    }
}
