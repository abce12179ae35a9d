//! Bus Error Types

use rdkafka::error::KafkaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BusError>;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to create topic {topic}: {reason}")]
    TopicCreation { topic: String, reason: String },

    #[error("Broker unavailable: {0}")]
    Unavailable(String),
}

impl From<BusError> for logpipe_core::PipelineError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Serialization(e) => logpipe_core::PipelineError::Serialization(e),
            other => logpipe_core::PipelineError::Broker(other.to_string()),
        }
    }
}
