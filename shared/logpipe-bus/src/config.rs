//! librdkafka client settings for each role

use logpipe_core::BrokerConfig;
use rdkafka::config::ClientConfig;

pub fn admin_config(broker: &BrokerConfig) -> ClientConfig {
    let mut config = ClientConfig::new();
    config.set("bootstrap.servers", &broker.brokers);
    config
}

pub fn producer_config(broker: &BrokerConfig) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", &broker.brokers)
        .set("message.timeout.ms", "5000");
    config
}

/// Fresh groups replay each topic from the earliest retained offset.
pub fn consumer_config(broker: &BrokerConfig) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", &broker.brokers)
        .set("group.id", &broker.group_id)
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "true")
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", "6000");
    config
}
