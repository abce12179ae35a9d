//! Demo API Configuration

use logpipe_core::{env_or, env_parse, PipelineError, Result};

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub http_bind: String,
    /// Share of requests given the long delay
    pub slow_rate: f64,
    /// Share of requests answered with an injected 500
    pub failure_rate: f64,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            http_bind: env_or("HTTP_BIND", "0.0.0.0:3000"),
            slow_rate: env_parse("SLOW_RATE", 0.1)?,
            failure_rate: env_parse("FAILURE_RATE", 0.05)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, rate) in [("SLOW_RATE", self.slow_rate), ("FAILURE_RATE", self.failure_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PipelineError::Config(format!("{} must be within [0, 1], got {}", name, rate)));
            }
        }
        Ok(())
    }
}
