//! Load Generator Configuration

use logpipe_core::{env_or, env_parse, PipelineError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub api_url: String,
    pub burst_interval: Duration,
    pub min_burst: usize,
    pub max_burst: usize,
    pub request_timeout: Duration,
}

impl LoadConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api_url: env_or("API_URL", "http://localhost:3000"),
            burst_interval: Duration::from_millis(env_parse("BURST_INTERVAL_MS", 1000)?),
            min_burst: env_parse("MIN_BURST", 1)?,
            max_burst: env_parse("MAX_BURST", 5)?,
            request_timeout: Duration::from_millis(env_parse("REQUEST_TIMEOUT_MS", 5000)?),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.burst_interval.is_zero() {
            return Err(PipelineError::Config(
                "BURST_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }
        if self.min_burst == 0 || self.min_burst > self.max_burst {
            return Err(PipelineError::Config(format!(
                "burst size range {}..={} is empty",
                self.min_burst, self.max_burst
            )));
        }
        Ok(())
    }
}
