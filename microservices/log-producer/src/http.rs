//! Status endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use logpipe_core::{HealthStatus, PipelineService, ReadinessStatus};
use serde_json::json;
use std::sync::Arc;

use crate::stats::ProducerStats;

#[derive(Clone)]
pub struct StatusState {
    /// Answers `/health` and `/ready`
    pub service: Arc<dyn PipelineService>,
    pub stats: ProducerStats,
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
    Json(json!(state.stats.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use logpipe_core::{DependencyStatus, Result};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Reports a broker that is up and a demo API that follows `api_up`
    struct StubService {
        api_up: AtomicBool,
    }

    #[async_trait]
    impl PipelineService for StubService {
        fn service_id(&self) -> &'static str {
            "log-producer"
        }

        async fn health(&self) -> HealthStatus {
            HealthStatus {
                healthy: true,
                service_id: self.service_id().to_string(),
                version: self.version().to_string(),
                uptime_seconds: 12,
            }
        }

        async fn ready(&self) -> ReadinessStatus {
            let api_up = self.api_up.load(Ordering::SeqCst);
            ReadinessStatus {
                ready: api_up,
                dependencies: vec![
                    DependencyStatus { name: "kafka".into(), available: true, latency_ms: Some(3) },
                    DependencyStatus { name: "demo-api".into(), available: api_up, latency_ms: Some(7) },
                ],
            }
        }

        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }

        async fn start(&self) -> Result<()> {
            Ok(())
        }
    }

    fn state() -> (Arc<StubService>, StatusState) {
        let service = Arc::new(StubService { api_up: AtomicBool::new(false) });
        let state = StatusState {
            service: service.clone(),
            stats: ProducerStats::default(),
        };
        (service, state)
    }

    #[tokio::test]
    async fn test_ready_reports_dependency_status() {
        let (service, state) = state();

        let (code, Json(body)) = ready(State(state.clone())).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.dependencies.len(), 2);
        assert!(body.dependencies[0].available);
        assert_eq!(body.dependencies[1].name, "demo-api");
        assert!(!body.dependencies[1].available);

        service.api_up.store(true, Ordering::SeqCst);
        let (code, Json(body)) = ready(State(state)).await;
        assert_eq!(code, StatusCode::OK);
        assert!(body.ready);
    }

    #[tokio::test]
    async fn test_health_comes_from_service() {
        let (_, state) = state();

        let Json(body) = health(State(state)).await;

        assert!(body.healthy);
        assert_eq!(body.service_id, "log-producer");
        assert_eq!(body.uptime_seconds, 12);
    }

    #[tokio::test]
    async fn test_stats_reflect_counters() {
        let (_, state) = state();
        state.stats.events_published.add(3);
        state.stats.probe_failures.inc();

        let Json(body) = stats(State(state)).await;

        assert_eq!(body["events_published"], 3);
        assert_eq!(body["probe_failures"], 1);
        assert_eq!(body["probe_latency_ms"]["count"], 0);
    }
}
