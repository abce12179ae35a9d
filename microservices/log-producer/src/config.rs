//! Log Producer Configuration

use logpipe_core::{env_or, env_parse, BrokerConfig, PipelineError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub http_bind: String,
    pub api_url: String,
    pub broker: BrokerConfig,
    pub log_interval: Duration,
    pub metrics_interval: Duration,
    pub retry_delay: Duration,
    pub probe_timeout: Duration,
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            http_bind: env_or("HTTP_BIND", "0.0.0.0:8081"),
            api_url: env_or("API_URL", "http://localhost:3000"),
            broker: BrokerConfig::from_env(),
            log_interval: Duration::from_millis(env_parse("LOG_INTERVAL_MS", 1000)?),
            metrics_interval: Duration::from_millis(env_parse("METRICS_INTERVAL_MS", 5000)?),
            retry_delay: Duration::from_millis(env_parse("RETRY_DELAY_MS", 2000)?),
            probe_timeout: Duration::from_millis(env_parse("PROBE_TIMEOUT_MS", 5000)?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Scheduler periods must be non-zero
    fn validate(&self) -> Result<()> {
        for (name, period) in [
            ("LOG_INTERVAL_MS", self.log_interval),
            ("METRICS_INTERVAL_MS", self.metrics_interval),
        ] {
            if period.is_zero() {
                return Err(PipelineError::Config(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProducerConfig {
        ProducerConfig {
            http_bind: "127.0.0.1:0".to_string(),
            api_url: "http://localhost:3000".to_string(),
            broker: BrokerConfig::default(),
            log_interval: Duration::from_millis(1000),
            metrics_interval: Duration::from_millis(5000),
            retry_delay: Duration::from_millis(2000),
            probe_timeout: Duration::from_millis(5000),
        }
    }

    #[test]
    fn test_defaults_pass_validation() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let zero_logs = ProducerConfig { log_interval: Duration::ZERO, ..config() };
        let err = zero_logs.validate().unwrap_err();
        assert!(matches!(&err, PipelineError::Config(msg) if msg.contains("LOG_INTERVAL_MS")));

        let zero_metrics = ProducerConfig { metrics_interval: Duration::ZERO, ..config() };
        let err = zero_metrics.validate().unwrap_err();
        assert!(matches!(&err, PipelineError::Config(msg) if msg.contains("METRICS_INTERVAL_MS")));
    }
}
