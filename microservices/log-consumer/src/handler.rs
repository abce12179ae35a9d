//! Per-message routing from topic to table
//!
//! Every failure here is confined to the message at hand: it is logged,
//! counted and dropped, and the caller moves on to the next message.

use logpipe_bus::InboundMessage;
use logpipe_core::{PipelineEvent, Topic};
use logpipe_store::EventSink;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::stats::ConsumerStats;

/// What became of one message
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Stored { topic: Topic, id: i32 },
    Malformed,
    UnknownTopic,
    InsertFailed,
}

pub struct MessageHandler {
    sink: Arc<dyn EventSink>,
    stats: ConsumerStats,
}

impl MessageHandler {
    pub fn new(sink: Arc<dyn EventSink>, stats: ConsumerStats) -> Self {
        Self { sink, stats }
    }

    pub fn stats(&self) -> &ConsumerStats {
        &self.stats
    }

    pub async fn handle(&self, message: &InboundMessage) -> Disposition {
        self.stats.consumed.inc();

        let Some(topic) = message.pipeline_topic() else {
            self.stats.unknown_topic.inc();
            warn!(topic = %message.topic, offset = message.offset, "Message on unknown topic dropped");
            return Disposition::UnknownTopic;
        };

        let payload = message.payload.as_deref().unwrap_or_default();
        let event = match PipelineEvent::decode(topic, payload) {
            Ok(event) => event,
            Err(e) => {
                self.stats.parse_failures.inc();
                warn!(
                    topic = %topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Malformed message discarded"
                );
                return Disposition::Malformed;
            }
        };

        let started = Instant::now();
        let inserted = match &event {
            PipelineEvent::ApiLog(log) => self.sink.insert_api_log(log).await,
            PipelineEvent::SystemMetric(sample) => self.sink.insert_system_metric(sample).await,
        };

        match inserted {
            Ok(id) => {
                self.stats
                    .insert_latency_ms
                    .record(started.elapsed().as_secs_f64() * 1000.0);
                self.stats.inserted.inc();
                debug!(topic = %topic, offset = message.offset, id, "Event stored");
                Disposition::Stored { topic, id }
            }
            Err(e) => {
                self.stats.insert_failures.inc();
                warn!(topic = %topic, offset = message.offset, error = %e, "Insert failed, event dropped");
                Disposition::InsertFailed
            }
        }
    }
}
