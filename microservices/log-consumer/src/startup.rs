//! Startup gating on the store and the broker

use logpipe_bus::TopicAdmin;
use logpipe_core::{wait_until_ready, Clock, Result, RetryPolicy};
use std::fmt::Display;
use std::future::Future;

/// Block until the store answers `store_ping`, then until the broker
/// answers a metadata request.
pub async fn await_dependencies<F, Fut, E, A, C>(
    store_ping: F,
    admin: &A,
    policy: &RetryPolicy,
    clock: &C,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: Display,
    A: TopicAdmin + ?Sized,
    C: Clock + ?Sized,
{
    wait_until_ready("postgres", policy, clock, store_ping).await?;
    wait_until_ready("kafka", policy, clock, || admin.list_topics()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use logpipe_bus::MemoryBus;
    use logpipe_core::PipelineError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingClock {
        sleeps: AtomicU32,
    }

    #[async_trait]
    impl Clock for CountingClock {
        async fn sleep(&self, _duration: Duration) {
            self.sleeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_retries_store_until_it_answers() {
        let bus = MemoryBus::new();
        let clock = CountingClock::default();
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        await_dependencies(
            move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("connection refused")
                } else {
                    Ok(())
                }
            },
            &bus,
            &RetryPolicy::default(),
            &clock,
        )
        .await
        .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_broker_with_capped_policy() {
        let bus = MemoryBus::new();
        bus.set_available(false);
        let policy = RetryPolicy::fixed(Duration::from_secs(2)).with_max_attempts(2);

        let result = await_dependencies(
            || async { Ok::<(), String>(()) },
            &bus,
            &policy,
            &CountingClock::default(),
        )
        .await;

        assert!(matches!(result, Err(PipelineError::Unavailable(_))));
    }
}
