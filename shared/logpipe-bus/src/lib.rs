//! logpipe Bus
//!
//! Kafka plumbing for the pipeline: idempotent topic setup, event
//! publishing and the subscription the consumer drains. Every broker
//! handle sits behind a trait so services can run against [`MemoryBus`].

mod config;
mod error;
mod memory;
mod publisher;
mod subscriber;
mod topics;

pub use config::{admin_config, consumer_config, producer_config};
pub use error::{BusError, Result};
pub use memory::MemoryBus;
pub use publisher::{EventPublisher, KafkaPublisher};
pub use subscriber::{InboundMessage, KafkaSubscriber, MessageSource};
pub use topics::{ensure_topics, KafkaAdmin, TopicAdmin, TopicSpec};
