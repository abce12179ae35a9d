//! Probe-and-publish and metrics emission
//!
//! Neither operation returns an error: a failed probe becomes an
//! error-shaped log event, and a failed publish is logged and dropped.

use chrono::Utc;
use logpipe_bus::EventPublisher;
use logpipe_core::{ApiLogEvent, PipelineEvent, SystemMetricEvent};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::probe::ServiceProbe;
use crate::sampler::sample_metrics;
use crate::stats::ProducerStats;

/// Paths sampled by the producer
pub const PROBE_ENDPOINTS: &[&str] = &["/", "/users", "/products", "/orders"];

/// Stand-in response time when the server does not report one
const FILLER_RESPONSE_MS: std::ops::Range<f64> = 10.0..500.0;

pub struct Emitter {
    publisher: Arc<dyn EventPublisher>,
    probe: Arc<dyn ServiceProbe>,
    stats: ProducerStats,
    rng: Mutex<StdRng>,
}

impl Emitter {
    pub fn new(publisher: Arc<dyn EventPublisher>, probe: Arc<dyn ServiceProbe>, stats: ProducerStats) -> Self {
        Self::with_rng(publisher, probe, stats, StdRng::from_entropy())
    }

    pub fn with_rng(
        publisher: Arc<dyn EventPublisher>,
        probe: Arc<dyn ServiceProbe>,
        stats: ProducerStats,
        rng: StdRng,
    ) -> Self {
        Self {
            publisher,
            probe,
            stats,
            rng: Mutex::new(rng),
        }
    }

    /// Probe one random endpoint and publish the resulting log event
    pub async fn probe_and_emit(&self) -> ApiLogEvent {
        let endpoint = {
            let mut rng = self.rng.lock();
            PROBE_ENDPOINTS.choose(&mut *rng).copied().unwrap_or("/")
        };
        let timestamp = Utc::now();

        self.stats.probes_in_flight.inc();
        let started = Instant::now();
        let outcome = self.probe.get(endpoint).await;
        self.stats
            .probe_latency_ms
            .record(started.elapsed().as_secs_f64() * 1000.0);
        self.stats.probes_in_flight.dec();

        let event = match outcome {
            Ok(response) => {
                let response_time = response
                    .server_time_ms
                    .unwrap_or_else(|| self.rng.lock().gen_range(FILLER_RESPONSE_MS).round());
                ApiLogEvent::success(timestamp, endpoint, response.status, response_time)
            }
            Err(failure) => {
                self.stats.probe_failures.inc();
                debug!(endpoint, error = %failure, "Probe failed");
                ApiLogEvent::failure(
                    timestamp,
                    Some(endpoint.to_string()),
                    failure.to_string(),
                    failure.error_code(),
                )
            }
        };

        self.publish(PipelineEvent::ApiLog(event.clone())).await;
        event
    }

    /// Synthesize a metrics sample and publish it
    pub async fn emit_metrics_sample(&self) -> SystemMetricEvent {
        let sample = {
            let mut rng = self.rng.lock();
            sample_metrics(&mut *rng, Utc::now())
        };

        self.publish(PipelineEvent::SystemMetric(sample.clone())).await;
        sample
    }

    async fn publish(&self, event: PipelineEvent) {
        match self.publisher.publish(&event).await {
            Ok(()) => {
                self.stats.events_published.inc();
                debug!(topic = %event.topic(), "Event published");
            }
            Err(e) => {
                self.stats.publish_failures.inc();
                warn!(topic = %event.topic(), error = %e, "Failed to publish event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeFailure, ProbeResponse};
    use async_trait::async_trait;
    use logpipe_bus::MemoryBus;
    use logpipe_core::{ProbeOutcome, Topic};

    struct FixedProbe {
        result: Result<ProbeResponse, ProbeFailure>,
    }

    #[async_trait]
    impl ServiceProbe for FixedProbe {
        async fn get(&self, _path: &str) -> Result<ProbeResponse, ProbeFailure> {
            self.result.clone()
        }
    }

    fn emitter(bus: Arc<MemoryBus>, result: Result<ProbeResponse, ProbeFailure>) -> Emitter {
        Emitter::with_rng(
            bus,
            Arc::new(FixedProbe { result }),
            ProducerStats::default(),
            StdRng::seed_from_u64(42),
        )
    }

    #[tokio::test]
    async fn test_successful_probe_uses_server_time() {
        let bus = Arc::new(MemoryBus::new());
        let emitter = emitter(
            bus.clone(),
            Ok(ProbeResponse { status: 200, server_time_ms: Some(42.0) }),
        );

        let event = emitter.probe_and_emit().await;

        assert_eq!(
            event.outcome(),
            Some(ProbeOutcome::Success { status: 200, response_time: 42.0 })
        );
        assert!(PROBE_ENDPOINTS.contains(&event.endpoint.as_deref().unwrap()));
        assert_eq!(event.method, "GET");

        let pending = bus.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].topic, Topic::ApiLogs.name());
    }

    #[tokio::test]
    async fn test_missing_server_time_uses_filler() {
        let bus = Arc::new(MemoryBus::new());
        let emitter = emitter(bus, Ok(ProbeResponse { status: 201, server_time_ms: None }));

        let event = emitter.probe_and_emit().await;

        let response_time = event.response_time.unwrap();
        assert!(FILLER_RESPONSE_MS.start <= response_time && response_time <= FILLER_RESPONSE_MS.end);
    }

    #[tokio::test]
    async fn test_failed_probe_is_still_published() {
        let bus = Arc::new(MemoryBus::new());
        let emitter = emitter(bus.clone(), Err(ProbeFailure::HttpStatus(500)));

        let event = emitter.probe_and_emit().await;

        assert!(matches!(
            event.outcome(),
            Some(ProbeOutcome::Failure { error_code: "HTTP_500", .. })
        ));
        assert_eq!(bus.pending().len(), 1);
        assert_eq!(emitter.stats.probe_failures.get(), 1);
    }

    #[tokio::test]
    async fn test_every_event_has_exactly_one_shape() {
        let outcomes = [
            Ok(ProbeResponse { status: 200, server_time_ms: None }),
            Ok(ProbeResponse { status: 204, server_time_ms: Some(3.5) }),
            Err(ProbeFailure::Timeout("5s".into())),
            Err(ProbeFailure::ConnectionRefused("refused".into())),
            Err(ProbeFailure::Request("dns".into())),
        ];
        for outcome in outcomes {
            let emitter = emitter(Arc::new(MemoryBus::new()), outcome);
            for _ in 0..20 {
                let event = emitter.probe_and_emit().await;
                assert!(event.outcome().is_some(), "mixed event: {:?}", event);
            }
        }
    }

    #[tokio::test]
    async fn test_publish_failure_is_swallowed() {
        let bus = Arc::new(MemoryBus::new());
        bus.set_available(false);
        let emitter = emitter(bus.clone(), Err(ProbeFailure::ConnectionRefused("down".into())));

        emitter.probe_and_emit().await;
        emitter.emit_metrics_sample().await;

        assert_eq!(emitter.stats.publish_failures.get(), 2);
        assert_eq!(emitter.stats.events_published.get(), 0);
    }

    #[tokio::test]
    async fn test_metrics_sample_published_to_metrics_topic() {
        let bus = Arc::new(MemoryBus::new());
        let emitter = emitter(bus.clone(), Ok(ProbeResponse { status: 200, server_time_ms: None }));

        let sample = emitter.emit_metrics_sample().await;

        assert!(sample.is_within_bounds());
        let pending = bus.pending();
        assert_eq!(pending[0].topic, Topic::SystemMetrics.name());
    }
}
