//! Consumer counters exposed on `/stats`

use logpipe_telemetry::{Counter, Histogram, HistogramSummary};
use serde::Serialize;

#[derive(Clone, Default)]
pub struct ConsumerStats {
    pub consumed: Counter,
    pub inserted: Counter,
    pub parse_failures: Counter,
    pub insert_failures: Counter,
    pub unknown_topic: Counter,
    pub receive_errors: Counter,
    pub insert_latency_ms: Histogram,
}

#[derive(Debug, Serialize)]
pub struct ConsumerStatsSnapshot {
    pub consumed: u64,
    pub inserted: u64,
    pub parse_failures: u64,
    pub insert_failures: u64,
    pub unknown_topic: u64,
    pub receive_errors: u64,
    pub insert_latency_ms: HistogramSummary,
}

impl ConsumerStats {
    pub fn snapshot(&self) -> ConsumerStatsSnapshot {
        ConsumerStatsSnapshot {
            consumed: self.consumed.get(),
            inserted: self.inserted.get(),
            parse_failures: self.parse_failures.get(),
            insert_failures: self.insert_failures.get(),
            unknown_topic: self.unknown_topic.get(),
            receive_errors: self.receive_errors.get(),
            insert_latency_ms: self.insert_latency_ms.summary(),
        }
    }
}
