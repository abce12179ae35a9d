use log_consumer::{http, run_ingest, startup, ConsumerConfig, ConsumerStats, MessageHandler};
use logpipe_bus::{KafkaAdmin, KafkaSubscriber, TopicAdmin};
use logpipe_core::{
    DependencyStatus, HealthStatus, PipelineError, PipelineService, ReadinessStatus, Result,
    RetryPolicy, ServiceRuntime, TokioClock,
};
use logpipe_store::{init_schema, PgEventStore, PoolConfig, StorePool};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = logpipe_telemetry::init("log-consumer")
        .map_err(|e| PipelineError::Config(e.to_string()))?;

    info!("Starting Log Consumer");

    let service = Arc::new(ConsumerService::new()?);

    let app = http::router(http::StatusState {
        service: service.clone(),
        stats: service.stats.clone(),
        pool: service.pool.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&service.config.http_bind).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "Status server stopped");
        }
    });

    ServiceRuntime::run(service).await
}

pub struct ConsumerService {
    config: ConsumerConfig,
    pool: StorePool,
    admin: KafkaAdmin,
    subscriber: Mutex<Option<Arc<KafkaSubscriber>>>,
    stats: ConsumerStats,
    /// Set once the subscription is live
    subscribed: AtomicBool,
    start_time: Instant,
}

impl ConsumerService {
    pub fn new() -> Result<Self> {
        let config = ConsumerConfig::from_env()?;
        let pool = StorePool::new(PoolConfig::from(&config.database))?;
        let admin = KafkaAdmin::new(&config.broker)?;

        Ok(Self {
            config,
            pool,
            admin,
            subscriber: Mutex::new(None),
            stats: ConsumerStats::default(),
            subscribed: AtomicBool::new(false),
            start_time: Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl PipelineService for ConsumerService {
    fn service_id(&self) -> &'static str {
        "log-consumer"
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
        let db_ok = self.pool.is_healthy().await;
        let db_latency = started.elapsed().as_millis() as u64;

        let started = Instant::now();
        let broker_ok = self.admin.list_topics().await.is_ok();
        let broker_latency = started.elapsed().as_millis() as u64;

        ReadinessStatus {
            ready: db_ok && broker_ok && self.subscribed.load(Ordering::SeqCst),
            dependencies: vec![
                DependencyStatus {
                    name: "postgres".to_string(),
                    available: db_ok,
                    latency_ms: Some(db_latency),
                },
                DependencyStatus {
                    name: "kafka".to_string(),
                    available: broker_ok,
                    latency_ms: Some(broker_latency),
                },
            ],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Log Consumer");
        self.subscribed.store(false, Ordering::SeqCst);

        let subscriber = self.subscriber.lock().take();
        if let Some(subscriber) = subscriber {
            subscriber.close();
        }
        self.pool.close();
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.config.http_bind,
            brokers = %self.config.broker.brokers,
            group_id = %self.config.broker.group_id,
            "Starting Log Consumer"
        );

        let policy = RetryPolicy::fixed(self.config.retry_delay);
        startup::await_dependencies(|| self.pool.ping(), &self.admin, &policy, &TokioClock).await?;

        init_schema(&self.pool).await?;
        info!("Schema ready");

        let subscriber = Arc::new(KafkaSubscriber::subscribe(&self.config.broker)?);
        *self.subscriber.lock() = Some(subscriber.clone());
        self.subscribed.store(true, Ordering::SeqCst);

        let store = Arc::new(PgEventStore::new(self.pool.clone()));
        let handler = MessageHandler::new(store, self.stats.clone());

        run_ingest(subscriber.as_ref(), &handler).await;
        Ok(())
    }
}
