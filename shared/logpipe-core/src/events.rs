//! Event schema shared by the producer and the consumer
//!
//! Both event kinds travel as self-describing JSON objects with camelCase
//! field names. Rows in the store are one-to-one with events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of topics the pipeline publishes to and consumes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    ApiLogs,
    SystemMetrics,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::ApiLogs, Topic::SystemMetrics];

    /// Broker-side topic name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApiLogs => "api-logs",
            Self::SystemMetrics => "system-metrics",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// One probe of the demo service, successful or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLogEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// Borrowed view of which half of an [`ApiLogEvent`] is populated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome<'a> {
    Success { status: u16, response_time: f64 },
    Failure { error: &'a str, error_code: &'a str },
}

impl ApiLogEvent {
    pub fn success(
        timestamp: DateTime<Utc>,
        endpoint: impl Into<String>,
        status: u16,
        response_time_ms: f64,
    ) -> Self {
        Self {
            timestamp,
            endpoint: Some(endpoint.into()),
            status: Some(status),
            response_time: Some(response_time_ms),
            method: default_method(),
            error: None,
            error_code: None,
        }
    }

    pub fn failure(
        timestamp: DateTime<Utc>,
        endpoint: Option<String>,
        error: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            endpoint,
            status: None,
            response_time: None,
            method: default_method(),
            error: Some(error.into()),
            error_code: Some(error_code.into()),
        }
    }

    /// `None` when the event mixes or omits both halves.
    pub fn outcome(&self) -> Option<ProbeOutcome<'_>> {
        match (
            self.status,
            self.response_time,
            self.error.as_deref(),
            self.error_code.as_deref(),
        ) {
            (Some(status), Some(response_time), None, None) => {
                Some(ProbeOutcome::Success { status, response_time })
            }
            (None, None, Some(error), Some(error_code)) => {
                Some(ProbeOutcome::Failure { error, error_code })
            }
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Synthetic host metrics sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetricEvent {
    pub timestamp: DateTime<Utc>,
    /// Percent, 0-100
    pub cpu: f64,
    /// Percent, 0-100
    pub memory: f64,
    /// Percent, 50-80
    pub disk_usage: f64,
    pub active_requests: u32,
}

impl SystemMetricEvent {
    pub const DISK_USAGE_MIN: f64 = 50.0;
    pub const DISK_USAGE_MAX: f64 = 80.0;

    pub fn is_within_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.cpu)
            && (0.0..=100.0).contains(&self.memory)
            && (Self::DISK_USAGE_MIN..=Self::DISK_USAGE_MAX).contains(&self.disk_usage)
    }
}

/// A decoded message, tagged by the topic it belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    ApiLog(ApiLogEvent),
    SystemMetric(SystemMetricEvent),
}

impl PipelineEvent {
    /// Parse a message body according to the shape its topic carries
    pub fn decode(topic: Topic, payload: &[u8]) -> Result<Self, serde_json::Error> {
        match topic {
            Topic::ApiLogs => serde_json::from_slice(payload).map(Self::ApiLog),
            Topic::SystemMetrics => serde_json::from_slice(payload).map(Self::SystemMetric),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::ApiLog(event) => serde_json::to_vec(event),
            Self::SystemMetric(event) => serde_json::to_vec(event),
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Self::ApiLog(_) => Topic::ApiLogs,
            Self::SystemMetric(_) => Topic::SystemMetrics,
        }
    }
}

impl From<ApiLogEvent> for PipelineEvent {
    fn from(event: ApiLogEvent) -> Self {
        Self::ApiLog(event)
    }
}

impl From<SystemMetricEvent> for PipelineEvent {
    fn from(event: SystemMetricEvent) -> Self {
        Self::SystemMetric(event)
    }
}
