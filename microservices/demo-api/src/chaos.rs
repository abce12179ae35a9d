//! Latency and failure injection
//!
//! Delays are async sleeps, so a slow request never holds up the others.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ApiError;

pub const FAST_DELAY_MS: RangeInclusive<u64> = 10..=100;
pub const SLOW_DELAY_MS: RangeInclusive<u64> = 300..=1000;

pub struct Chaos {
    rng: Mutex<StdRng>,
    slow_rate: f64,
    failure_rate: f64,
    latency: bool,
}

impl Chaos {
    pub fn new(slow_rate: f64, failure_rate: f64) -> Self {
        Self::with_rng(slow_rate, failure_rate, StdRng::from_entropy())
    }

    pub fn with_rng(slow_rate: f64, failure_rate: f64, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            slow_rate,
            failure_rate,
            latency: true,
        }
    }

    /// No delay and no failures
    pub fn calm() -> Self {
        Self {
            latency: false,
            ..Self::with_rng(0.0, 0.0, StdRng::seed_from_u64(0))
        }
    }

    /// Fail every request, without delay
    pub fn failing() -> Self {
        Self {
            latency: false,
            ..Self::with_rng(0.0, 1.0, StdRng::seed_from_u64(0))
        }
    }

    pub fn sample_delay(&self) -> Duration {
        if !self.latency {
            return Duration::ZERO;
        }
        let mut rng = self.rng.lock();
        let range = if rng.gen_bool(self.slow_rate) {
            SLOW_DELAY_MS
        } else {
            FAST_DELAY_MS
        };
        Duration::from_millis(rng.gen_range(range))
    }

    /// Decided independently of the delay
    pub fn roll_failure(&self) -> bool {
        self.rng.lock().gen_bool(self.failure_rate)
    }

    /// Wait out the injected delay, then maybe fail
    pub async fn disturb(&self) -> Result<(), ApiError> {
        let delay = self.sample_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.roll_failure() {
            return Err(ApiError::Injected);
        }
        Ok(())
    }
}
