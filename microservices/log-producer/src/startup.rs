//! Startup gating: broker, topics, then the demo service

use logpipe_bus::{ensure_topics, TopicAdmin};
use logpipe_core::{wait_until_ready, Clock, PipelineError, Result, RetryPolicy};
use tracing::info;

use crate::probe::ServiceProbe;

/// Block until the broker and demo service answer, creating topics in
/// between. Only topic creation can fail once the broker is reachable.
pub async fn prepare<A, P, C>(admin: &A, probe: &P, policy: &RetryPolicy, clock: &C) -> Result<()>
where
    A: TopicAdmin + ?Sized,
    P: ServiceProbe + ?Sized,
    C: Clock + ?Sized,
{
    wait_until_ready("kafka", policy, clock, || admin.list_topics()).await?;

    let created = ensure_topics(admin).await.map_err(PipelineError::from)?;
    info!(created = created.len(), "Topics ready");

    wait_until_ready("demo-api", policy, clock, || probe.health()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeFailure, ProbeResponse};
    use async_trait::async_trait;
    use logpipe_bus::MemoryBus;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Refuses connections for the first `down_for` calls
    struct FlakyProbe {
        calls: AtomicU32,
        down_for: u32,
    }

    #[async_trait]
    impl ServiceProbe for FlakyProbe {
        async fn get(&self, _path: &str) -> std::result::Result<ProbeResponse, ProbeFailure> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.down_for {
                Err(ProbeFailure::ConnectionRefused("not yet".into()))
            } else {
                Ok(ProbeResponse { status: 200, server_time_ms: None })
            }
        }
    }

    struct NoWait;

    #[async_trait]
    impl Clock for NoWait {
        async fn sleep(&self, _duration: Duration) {}
    }

    #[tokio::test]
    async fn test_waits_for_demo_service_then_proceeds() {
        let bus = MemoryBus::new();
        let probe = FlakyProbe { calls: AtomicU32::new(0), down_for: 3 };

        prepare(&bus, &probe, &RetryPolicy::default(), &NoWait).await.unwrap();

        assert_eq!(probe.calls.load(Ordering::SeqCst), 4);
        assert_eq!(bus.topic_names().len(), 2);
    }

    #[tokio::test]
    async fn test_broker_never_ready_with_capped_policy() {
        let bus = MemoryBus::new();
        bus.set_available(false);
        let probe = FlakyProbe { calls: AtomicU32::new(0), down_for: 0 };
        let policy = RetryPolicy::fixed(Duration::from_secs(2)).with_max_attempts(3);

        let result = prepare(&bus, &probe, &policy, &NoWait).await;

        assert!(matches!(result, Err(PipelineError::Unavailable(_))));
        // demo service is never contacted before the broker is up
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }
}
