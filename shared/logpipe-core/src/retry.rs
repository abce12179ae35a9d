//! Retry-until-ready for startup dependencies

use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};

/// Source of delays, swapped out in tests so no wall-clock time passes
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed backoff between attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(2))
    }
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// Poll `probe` until it succeeds, sleeping `policy.delay` between failures.
///
/// Returns `PipelineError::Unavailable` only when the policy caps attempts.
pub async fn wait_until_ready<C, F, Fut, T, E>(
    dependency: &str,
    policy: &RetryPolicy,
    clock: &C,
    mut probe: F,
) -> Result<T>
where
    C: Clock + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match probe().await {
            Ok(value) => {
                info!(dependency, attempt, "Dependency ready");
                return Ok(value);
            }
            Err(e) => {
                if policy.max_attempts.is_some_and(|max| attempt >= max) {
                    return Err(PipelineError::Unavailable(format!(
                        "{} not ready after {} attempts: {}",
                        dependency, attempt, e
                    )));
                }
                warn!(
                    dependency,
                    attempt,
                    error = %e,
                    retry_in_ms = policy.delay.as_millis() as u64,
                    "Dependency not ready, retrying"
                );
                clock.sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClock {
        sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Clock for RecordingClock {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn test_ready_after_failures() {
        let clock = RecordingClock::default();
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::fixed(Duration::from_secs(2));

        let value = wait_until_ready("kafka", &policy, &clock, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Err("connection refused")
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        let sleeps = clock.sleeps.lock().unwrap();
        assert_eq!(sleeps.len(), 3);
        assert!(sleeps.iter().all(|d| *d == Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_ready_immediately_never_sleeps() {
        let clock = RecordingClock::default();
        let policy = RetryPolicy::default();

        let value = wait_until_ready("postgres", &policy, &clock, || async { Ok::<_, String>("up") })
            .await
            .unwrap();

        assert_eq!(value, "up");
        assert!(clock.sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gives_up_when_capped() {
        let clock = RecordingClock::default();
        let policy = RetryPolicy::fixed(Duration::from_millis(10)).with_max_attempts(4);

        let result: Result<()> =
            wait_until_ready("demo-api", &policy, &clock, || async { Err::<(), _>("refused") }).await;

        assert!(matches!(result, Err(PipelineError::Unavailable(_))));
        // no sleep after the final attempt
        assert_eq!(clock.sleeps.lock().unwrap().len(), 3);
    }
}
