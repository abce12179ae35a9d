//! Log Viewer Configuration

use logpipe_core::{env_parse, DatabaseConfig, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub database: DatabaseConfig,
    pub settings: ViewerSettings,
}

/// Knobs the interactive loop reads
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub log_limit: i64,
    pub metrics_limit: i64,
    pub tail_interval: Duration,
    pub tail_duration: Duration,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            log_limit: 20,
            metrics_limit: 10,
            tail_interval: Duration::from_secs(2),
            tail_duration: Duration::from_secs(30),
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = ViewerSettings::default();
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            settings: ViewerSettings {
                log_limit: env_parse("VIEWER_LOG_LIMIT", defaults.log_limit)?,
                metrics_limit: env_parse("VIEWER_METRICS_LIMIT", defaults.metrics_limit)?,
                tail_interval: Duration::from_secs(env_parse("TAIL_INTERVAL_SECS", 2)?),
                tail_duration: Duration::from_secs(env_parse("TAIL_DURATION_SECS", 30)?),
            },
        })
    }
}
