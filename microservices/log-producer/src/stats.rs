//! Producer counters exposed on `/stats`

use logpipe_telemetry::{Counter, Gauge, Histogram, HistogramSummary};
use serde::Serialize;

#[derive(Clone, Default)]
pub struct ProducerStats {
    pub events_published: Counter,
    pub publish_failures: Counter,
    pub probe_failures: Counter,
    pub probes_in_flight: Gauge,
    pub probe_latency_ms: Histogram,
}

#[derive(Debug, Serialize)]
pub struct ProducerStatsSnapshot {
    pub events_published: u64,
    pub publish_failures: u64,
    pub probe_failures: u64,
    pub probes_in_flight: u64,
    pub probe_latency_ms: HistogramSummary,
}

impl ProducerStats {
    pub fn snapshot(&self) -> ProducerStatsSnapshot {
        ProducerStatsSnapshot {
            events_published: self.events_published.get(),
            publish_failures: self.publish_failures.get(),
            probe_failures: self.probe_failures.get(),
            probes_in_flight: self.probes_in_flight.get(),
            probe_latency_ms: self.probe_latency_ms.summary(),
        }
    }
}
