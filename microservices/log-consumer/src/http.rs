//! Status endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use logpipe_core::{HealthStatus, PipelineService, ReadinessStatus};
use logpipe_store::StorePool;
use serde_json::json;
use std::sync::Arc;

use crate::stats::ConsumerStats;

#[derive(Clone)]
pub struct StatusState {
    /// Answers `/health` and `/ready`
    pub service: Arc<dyn PipelineService>,
    pub stats: ConsumerStats,
    pub pool: StorePool,
}

pub fn router(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/stats", get(stats))
        .with_state(state)
}

async fn health(State(state): State<StatusState>) -> Json<HealthStatus> {
    Json(state.service.health().await)
}

async fn ready(State(state): State<StatusState>) -> (StatusCode, Json<ReadinessStatus>) {
    let status = state.service.ready().await;
    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

async fn stats(State(state): State<StatusState>) -> Json<serde_json::Value> {
    let mut body = json!(state.stats.snapshot());
    body["pool"] = json!(state.pool.stats());
    Json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use logpipe_core::{DependencyStatus, Result};
    use logpipe_store::PoolConfig;

    /// Store and broker both down, as before the first connection
    struct Disconnected;

    #[async_trait]
    impl PipelineService for Disconnected {
        fn service_id(&self) -> &'static str {
            "log-consumer"
        }

        async fn health(&self) -> HealthStatus {
            HealthStatus {
                healthy: true,
                service_id: self.service_id().to_string(),
                version: self.version().to_string(),
                uptime_seconds: 0,
            }
        }

        async fn ready(&self) -> ReadinessStatus {
            ReadinessStatus {
                ready: false,
                dependencies: ["postgres", "kafka"]
                    .into_iter()
                    .map(|name| DependencyStatus {
                        name: name.to_string(),
                        available: false,
                        latency_ms: None,
                    })
                    .collect(),
            }
        }

        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }

        async fn start(&self) -> Result<()> {
            Ok(())
        }
    }

    fn state() -> StatusState {
        StatusState {
            service: Arc::new(Disconnected),
            stats: ConsumerStats::default(),
            pool: StorePool::new(PoolConfig::default()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_not_ready_lists_unavailable_dependencies() {
        let (code, Json(body)) = ready(State(state())).await;

        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        let names: Vec<_> = body.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["postgres", "kafka"]);
        assert!(body.dependencies.iter().all(|d| !d.available));
    }

    #[tokio::test]
    async fn test_health_comes_from_service() {
        let Json(body) = health(State(state())).await;

        assert!(body.healthy);
        assert_eq!(body.service_id, "log-consumer");
    }

    #[tokio::test]
    async fn test_stats_reflect_counters() {
        let state = state();
        state.stats.consumed.add(4);
        state.stats.parse_failures.inc();

        let Json(body) = stats(State(state)).await;

        assert_eq!(body["consumed"], 4);
        assert_eq!(body["parse_failures"], 1);
        assert_eq!(body["inserted"], 0);
        assert_eq!(body["pool"]["size"], 0);
    }
}
