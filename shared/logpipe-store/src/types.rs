//! Row types returned by read queries

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;

use crate::Result;

/// One row of `api_logs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiLogRow {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub endpoint: Option<String>,
    pub status: Option<i32>,
    pub response_time: Option<f64>,
    pub method: Option<String>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl ApiLogRow {
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let timestamp: NaiveDateTime = row.try_get("timestamp")?;
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: timestamp.and_utc(),
            endpoint: row.try_get("endpoint")?,
            status: row.try_get("status")?,
            response_time: row.try_get("response_time")?,
            method: row.try_get("method")?,
            error: row.try_get("error")?,
            error_code: row.try_get("error_code")?,
        })
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.status.is_some_and(|s| s >= 400)
    }
}

/// One row of `system_metrics`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemMetricRow {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub disk_usage: Option<f64>,
    pub active_requests: Option<i32>,
}

impl SystemMetricRow {
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let timestamp: NaiveDateTime = row.try_get("timestamp")?;
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: timestamp.and_utc(),
            cpu: row.try_get("cpu")?,
            memory: row.try_get("memory")?,
            disk_usage: row.try_get("disk_usage")?,
            active_requests: row.try_get("active_requests")?,
        })
    }
}
