//! logpipe Core - Shared event schema and service infrastructure
//!
//! This crate provides:
//! - The event schema shared by producer and consumer (API logs, system metrics)
//! - The fixed topic enumeration
//! - Standard service trait and runtime for the long-running processes
//! - Error handling utilities
//! - Configuration management
//! - Retry-until-ready startup helper

pub mod config;
pub mod error;
pub mod events;
pub mod retry;
pub mod service;

pub use config::{env_or, env_parse, BrokerConfig, DatabaseConfig};
pub use error::{PipelineError, Result};
pub use events::{ApiLogEvent, PipelineEvent, ProbeOutcome, SystemMetricEvent, Topic};
pub use retry::{wait_until_ready, Clock, RetryPolicy, TokioClock};
pub use service::{DependencyStatus, HealthStatus, PipelineService, ReadinessStatus, ServiceRuntime};
