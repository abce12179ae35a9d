//! Log Consumer Configuration

use logpipe_core::{env_or, env_parse, BrokerConfig, DatabaseConfig, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub http_bind: String,
    pub broker: BrokerConfig,
    pub database: DatabaseConfig,
    pub retry_delay: Duration,
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_bind: env_or("HTTP_BIND", "0.0.0.0:8082"),
            broker: BrokerConfig::from_env(),
            database: DatabaseConfig::from_env()?,
            retry_delay: Duration::from_millis(env_parse("RETRY_DELAY_MS", 2000)?),
        })
    }
}
