//! Idempotent topic setup

use async_trait::async_trait;
use logpipe_core::{BrokerConfig, Topic};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::RDKafkaErrorCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{admin_config, BusError, Result};

/// Partition and replication layout for a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicSpec {
    pub partitions: i32,
    pub replication: i32,
}

impl Default for TopicSpec {
    /// Single-broker layout
    fn default() -> Self {
        Self {
            partitions: 1,
            replication: 1,
        }
    }
}

/// Broker administration used at startup
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    /// Fails while the broker is unreachable
    async fn list_topics(&self) -> Result<Vec<String>>;

    /// Creating a topic that already exists is not an error
    async fn create_topic(&self, topic: Topic, spec: TopicSpec) -> Result<()>;
}

/// Create whichever of the pipeline topics are missing.
///
/// Returns the topics that were created by this call.
pub async fn ensure_topics<A: TopicAdmin + ?Sized>(admin: &A) -> Result<Vec<Topic>> {
    let existing = admin.list_topics().await?;
    let missing: Vec<Topic> = Topic::ALL
        .into_iter()
        .filter(|t| !existing.iter().any(|name| name == t.name()))
        .collect();

    for topic in &missing {
        admin.create_topic(*topic, TopicSpec::default()).await?;
        info!(topic = %topic, "Created topic");
    }

    if missing.is_empty() {
        debug!("All topics already exist");
    }

    Ok(missing)
}

/// Kafka admin client
#[derive(Clone)]
pub struct KafkaAdmin {
    client: Arc<AdminClient<DefaultClientContext>>,
    timeout: Duration,
}

impl KafkaAdmin {
    /// Creating the client does not contact the broker
    pub fn new(broker: &BrokerConfig) -> Result<Self> {
        let client: AdminClient<DefaultClientContext> = admin_config(broker).create()?;
        Ok(Self {
            client: Arc::new(client),
            timeout: Duration::from_secs(5),
        })
    }

    /// Succeeds once the broker answers a metadata request
    pub async fn ping(&self) -> Result<()> {
        self.list_topics().await.map(|_| ())
    }
}

#[async_trait]
impl TopicAdmin for KafkaAdmin {
    async fn list_topics(&self) -> Result<Vec<String>> {
        let client = self.client.clone();
        let timeout = self.timeout;
        // metadata fetch blocks the calling thread
        let metadata = tokio::task::spawn_blocking(move || client.inner().fetch_metadata(None, timeout))
            .await
            .map_err(|e| BusError::Unavailable(e.to_string()))??;

        Ok(metadata
            .topics()
            .iter()
            .map(|t| t.name().to_string())
            .collect())
    }

    async fn create_topic(&self, topic: Topic, spec: TopicSpec) -> Result<()> {
        let new_topic = NewTopic::new(
            topic.name(),
            spec.partitions,
            TopicReplication::Fixed(spec.replication),
        );
        let options = AdminOptions::new().operation_timeout(Some(self.timeout));

        let results = self.client.create_topics(&[new_topic], &options).await?;
        for result in results {
            match result {
                Ok(_) => {}
                Err((_, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    debug!(topic = %topic, "Topic created concurrently");
                }
                Err((name, code)) => {
                    return Err(BusError::TopicCreation {
                        topic: name,
                        reason: code.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
