//! Telemetry Configuration

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub log_level: String,
    pub json_logs: bool,
    /// Write to stderr, leaving stdout to an interactive program
    pub stderr: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "logpipe".to_string(),
            log_level: "info".to_string(),
            json_logs: true,
            stderr: false,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
            json_logs: std::env::var("JSON_LOGS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            stderr: false,
        }
    }

    /// Quiet preset for terminal programs: warnings only, to stderr
    pub fn interactive(service_name: &str) -> Self {
        Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            json_logs: false,
            stderr: true,
            ..Self::from_env(service_name)
        }
    }

    /// Filter used when `RUST_LOG` is unset. `LOG_LEVEL` accepts a bare
    /// level or full `EnvFilter` directives.
    pub fn default_directives(&self) -> String {
        self.log_level.clone()
    }
}
