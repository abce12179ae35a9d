//! Insert path (consumer) and read path (viewer) over PostgreSQL

use async_trait::async_trait;
use logpipe_core::{ApiLogEvent, SystemMetricEvent};
use tokio_postgres::types::ToSql;
use tracing::{debug, instrument};

use crate::{ApiLogRow, LogQuery, Result, StoreError, StorePool, SystemMetricRow};

/// Write side: one row per event, append-only
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Returns the assigned row id
    async fn insert_api_log(&self, event: &ApiLogEvent) -> Result<i32>;

    /// Returns the assigned row id
    async fn insert_system_metric(&self, event: &SystemMetricEvent) -> Result<i32>;
}

/// Read side used by the viewer; never mutates
#[async_trait]
pub trait LogReader: Send + Sync {
    async fn api_logs(&self, query: &LogQuery) -> Result<Vec<ApiLogRow>>;

    /// Newest samples first
    async fn recent_metrics(&self, limit: i64) -> Result<Vec<SystemMetricRow>>;

    /// Highest `api_logs.id`, 0 when the table is empty
    async fn max_api_log_id(&self) -> Result<i32>;
}

/// PostgreSQL-backed implementation of both sides
#[derive(Clone)]
pub struct PgEventStore {
    pool: StorePool,
}

impl PgEventStore {
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &StorePool {
        &self.pool
    }
}

fn status_column(status: Option<u16>) -> Option<i32> {
    status.map(i32::from)
}

fn active_requests_column(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| StoreError::OutOfRange {
        column: "active_requests",
        value: value.to_string(),
    })
}

#[async_trait]
impl EventSink for PgEventStore {
    #[instrument(skip(self, event), fields(endpoint = ?event.endpoint))]
    async fn insert_api_log(&self, event: &ApiLogEvent) -> Result<i32> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "INSERT INTO api_logs (timestamp, endpoint, status, response_time, method, error, error_code) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                &[
                    &event.timestamp.naive_utc(),
                    &event.endpoint,
                    &status_column(event.status),
                    &event.response_time,
                    &event.method,
                    &event.error,
                    &event.error_code,
                ],
            )
            .await?;
        let id: i32 = row.try_get(0)?;
        debug!(id, "Inserted api log");
        Ok(id)
    }

    #[instrument(skip(self, event))]
    async fn insert_system_metric(&self, event: &SystemMetricEvent) -> Result<i32> {
        let active_requests = active_requests_column(event.active_requests)?;
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "INSERT INTO system_metrics (timestamp, cpu, memory, disk_usage, active_requests) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
                &[
                    &event.timestamp.naive_utc(),
                    &event.cpu,
                    &event.memory,
                    &event.disk_usage,
                    &active_requests,
                ],
            )
            .await?;
        let id: i32 = row.try_get(0)?;
        debug!(id, "Inserted system metric");
        Ok(id)
    }
}

#[async_trait]
impl LogReader for PgEventStore {
    #[instrument(skip(self))]
    async fn api_logs(&self, query: &LogQuery) -> Result<Vec<ApiLogRow>> {
        let conn = self.pool.get().await?;
        let params = query.params();
        let param_refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = conn.query(&query.sql(), &param_refs).await?;
        rows.iter().map(ApiLogRow::from_row).collect()
    }

    async fn recent_metrics(&self, limit: i64) -> Result<Vec<SystemMetricRow>> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT id, timestamp, cpu, memory, disk_usage, active_requests \
                 FROM system_metrics ORDER BY timestamp DESC, id DESC LIMIT $1",
                &[&limit],
            )
            .await?;
        rows.iter().map(SystemMetricRow::from_row).collect()
    }

    async fn max_api_log_id(&self) -> Result<i32> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one("SELECT COALESCE(MAX(id), 0) FROM api_logs", &[])
            .await?;
        Ok(row.try_get(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_column() {
        assert_eq!(status_column(Some(404)), Some(404));
        assert_eq!(status_column(None), None);
    }

    #[test]
    fn test_active_requests_overflow() {
        assert_eq!(active_requests_column(7).unwrap(), 7);
        assert!(matches!(
            active_requests_column(u32::MAX),
            Err(StoreError::OutOfRange { column: "active_requests", .. })
        ));
    }
}
