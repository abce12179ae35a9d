//! Event publishing

use async_trait::async_trait;
use logpipe_core::{BrokerConfig, PipelineEvent};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{producer_config, Result};

/// Publishes encoded events onto their topic
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Resolves once the broker acknowledges the message
    async fn publish(&self, event: &PipelineEvent) -> Result<()>;
}

/// Kafka producer
#[derive(Clone)]
pub struct KafkaPublisher {
    producer: FutureProducer,
}

impl KafkaPublisher {
    pub fn new(broker: &BrokerConfig) -> Result<Self> {
        let producer: FutureProducer = producer_config(broker).create()?;
        Ok(Self { producer })
    }

    /// Wait for in-flight deliveries before exit
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer.flush(timeout)?;
        Ok(())
    }
}

/// Message key: the event kind, so one kind always lands on one partition
fn message_key(event: &PipelineEvent) -> &'static str {
    match event {
        PipelineEvent::ApiLog(_) => "api-log",
        PipelineEvent::SystemMetric(_) => "system-metric",
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    #[instrument(skip(self, event), fields(topic = %event.topic()))]
    async fn publish(&self, event: &PipelineEvent) -> Result<()> {
        let payload = event.encode()?;
        let topic = event.topic();
        let record = FutureRecord::to(topic.name())
            .key(message_key(event))
            .payload(&payload);

        let (partition, offset) = self
            .producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| e)?;

        debug!(partition, offset, "Event delivered");
        Ok(())
    }
}
