//! Synthetic host metrics

use chrono::{DateTime, Utc};
use logpipe_core::SystemMetricEvent;
use rand::Rng;

const MAX_ACTIVE_REQUESTS: u32 = 50;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Draw one sample; values are random, no host is inspected
pub fn sample_metrics<R: Rng + ?Sized>(rng: &mut R, timestamp: DateTime<Utc>) -> SystemMetricEvent {
    SystemMetricEvent {
        timestamp,
        cpu: round2(rng.gen_range(0.0..=100.0)),
        memory: round2(rng.gen_range(0.0..=100.0)),
        disk_usage: round2(rng.gen_range(
            SystemMetricEvent::DISK_USAGE_MIN..=SystemMetricEvent::DISK_USAGE_MAX,
        )),
        active_requests: rng.gen_range(0..=MAX_ACTIVE_REQUESTS),
    }
}
