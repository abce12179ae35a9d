//! Log Producer
//!
//! Probes the demo API on a fixed schedule and publishes:
//! - one API log event per probe to `api-logs`
//! - one synthetic system metrics sample per period to `system-metrics`

use logpipe_bus::{KafkaAdmin, KafkaPublisher, TopicAdmin};
use logpipe_core::{
    DependencyStatus, HealthStatus, PipelineError, PipelineService, ReadinessStatus, Result,
    RetryPolicy, ServiceRuntime, TokioClock,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

mod config;
mod emitter;
mod http;
mod probe;
mod sampler;
mod scheduler;
mod startup;
mod stats;

use config::ProducerConfig;
use emitter::Emitter;
use probe::{HttpProbe, ServiceProbe};
use stats::ProducerStats;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = logpipe_telemetry::init("log-producer")
        .map_err(|e| PipelineError::Config(e.to_string()))?;

    info!("Starting Log Producer");

    let service = Arc::new(ProducerService::new()?);

    let app = http::router(http::StatusState {
        service: service.clone(),
        stats: service.stats.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&service.config.http_bind).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "Status server stopped");
        }
    });

    ServiceRuntime::run(service).await
}

pub struct ProducerService {
    config: ProducerConfig,
    admin: KafkaAdmin,
    publisher: Arc<KafkaPublisher>,
    probe: Arc<HttpProbe>,
    emitter: Arc<Emitter>,
    stats: ProducerStats,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Set once both schedulers are running
    running: AtomicBool,
    start_time: Instant,
}

impl ProducerService {
    pub fn new() -> Result<Self> {
        let config = ProducerConfig::from_env()?;

        let admin = KafkaAdmin::new(&config.broker)?;
        let publisher = Arc::new(KafkaPublisher::new(&config.broker)?);
        let probe = Arc::new(
            HttpProbe::new(&config.api_url, config.probe_timeout)
                .map_err(|e| PipelineError::Config(e.to_string()))?,
        );
        let stats = ProducerStats::default();
        let emitter = Arc::new(Emitter::new(publisher.clone(), probe.clone(), stats.clone()));

        Ok(Self {
            config,
            admin,
            publisher,
            probe,
            emitter,
            stats,
            tasks: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            start_time: Instant::now(),
        })
    }

    fn start_schedulers(&self) {
        let logs = {
            let emitter = self.emitter.clone();
            scheduler::spawn_every("api-logs", self.config.log_interval, move || {
                let emitter = emitter.clone();
                async move {
                    emitter.probe_and_emit().await;
                }
            })
        };

        let metrics = {
            let emitter = self.emitter.clone();
            scheduler::spawn_every("system-metrics", self.config.metrics_interval, move || {
                let emitter = emitter.clone();
                async move {
                    emitter.emit_metrics_sample().await;
                }
            })
        };

        self.tasks.lock().extend([logs, metrics]);
        self.running.store(true, Ordering::SeqCst);

        info!(
            log_interval_ms = self.config.log_interval.as_millis() as u64,
            metrics_interval_ms = self.config.metrics_interval.as_millis() as u64,
            "Producers running"
        );
    }
}

#[async_trait::async_trait]
impl PipelineService for ProducerService {
    fn service_id(&self) -> &'static str {
        "log-producer"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        let started = Instant::now();
        let broker_ok = self.admin.list_topics().await.is_ok();
        let broker_latency = started.elapsed().as_millis() as u64;

        let started = Instant::now();
        let api_ok = self.probe.health().await.is_ok();
        let api_latency = started.elapsed().as_millis() as u64;

        ReadinessStatus {
            ready: broker_ok && api_ok && self.running.load(Ordering::SeqCst),
            dependencies: vec![
                DependencyStatus {
                    name: "kafka".to_string(),
                    available: broker_ok,
                    latency_ms: Some(broker_latency),
                },
                DependencyStatus {
                    name: "demo-api".to_string(),
                    available: api_ok,
                    latency_ms: Some(api_latency),
                },
            ],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Log Producer");
        self.running.store(false, Ordering::SeqCst);
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }

        let publisher = self.publisher.clone();
        match tokio::task::spawn_blocking(move || publisher.flush(Duration::from_secs(5))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Flush incomplete"),
            Err(e) => warn!(error = %e, "Flush task failed"),
        }
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.config.http_bind,
            api_url = %self.config.api_url,
            brokers = %self.config.broker.brokers,
            "Starting Log Producer"
        );

        let policy = RetryPolicy::fixed(self.config.retry_delay);
        startup::prepare(&self.admin, self.probe.as_ref(), &policy, &TokioClock).await?;

        self.start_schedulers();

        // schedulers run until shutdown aborts them
        std::future::pending::<()>().await;
        Ok(())
    }
}
