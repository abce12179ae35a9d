//! Consumer-group subscription over both pipeline topics

use async_trait::async_trait;
use logpipe_core::{BrokerConfig, Topic};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::{consumer_config, Result};

/// A message detached from the client's buffers
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: Option<Vec<u8>>,
}

impl InboundMessage {
    /// `None` for a topic outside the pipeline's fixed set
    pub fn pipeline_topic(&self) -> Option<Topic> {
        Topic::from_name(&self.topic)
    }
}

/// Ordered stream of inbound messages
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// `None` once the source is closed
    async fn next_message(&self) -> Option<Result<InboundMessage>>;
}

/// Kafka consumer subscribed to every pipeline topic
pub struct KafkaSubscriber {
    consumer: StreamConsumer,
    closed: AtomicBool,
}

impl KafkaSubscriber {
    /// Join the consumer group and subscribe to both topics
    pub fn subscribe(broker: &BrokerConfig) -> Result<Self> {
        let consumer: StreamConsumer = consumer_config(broker).create()?;
        let topics: Vec<&str> = Topic::ALL.iter().map(|t| t.name()).collect();
        consumer.subscribe(&topics)?;

        info!(
            group_id = %broker.group_id,
            topics = ?topics,
            "Subscribed to topics"
        );

        Ok(Self {
            consumer,
            closed: AtomicBool::new(false),
        })
    }

    /// Leave the group; later `next_message` calls return `None`
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.consumer.unsubscribe();
            info!("Unsubscribed from topics");
        }
    }
}

#[async_trait]
impl MessageSource for KafkaSubscriber {
    async fn next_message(&self) -> Option<Result<InboundMessage>> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }

        let message = match self.consumer.recv().await {
            Ok(m) => m,
            Err(e) => return Some(Err(e.into())),
        };

        Some(Ok(InboundMessage {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            payload: message.payload().map(|p| p.to_vec()),
        }))
    }
}
