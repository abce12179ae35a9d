//! In-memory store with the same semantics as the PostgreSQL one.
//!
//! Used by service tests in place of a live database.

use async_trait::async_trait;
use logpipe_core::{ApiLogEvent, SystemMetricEvent};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{ApiLogRow, EventSink, LogQuery, LogReader, Result, StoreError, SystemMetricRow};

#[derive(Default)]
pub struct MemoryStore {
    api_logs: RwLock<Vec<ApiLogRow>>,
    system_metrics: RwLock<Vec<SystemMetricRow>>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail, as an unreachable database would
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn api_log_rows(&self) -> Vec<ApiLogRow> {
        self.api_logs.read().clone()
    }

    pub fn system_metric_rows(&self) -> Vec<SystemMetricRow> {
        self.system_metrics.read().clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventSink for MemoryStore {
    async fn insert_api_log(&self, event: &ApiLogEvent) -> Result<i32> {
        self.check_writable()?;
        let mut rows = self.api_logs.write();
        let id = rows.len() as i32 + 1;
        rows.push(ApiLogRow {
            id,
            timestamp: event.timestamp,
            endpoint: event.endpoint.clone(),
            status: event.status.map(i32::from),
            response_time: event.response_time,
            method: Some(event.method.clone()),
            error: event.error.clone(),
            error_code: event.error_code.clone(),
        });
        Ok(id)
    }

    async fn insert_system_metric(&self, event: &SystemMetricEvent) -> Result<i32> {
        self.check_writable()?;
        let active_requests =
            i32::try_from(event.active_requests).map_err(|_| StoreError::OutOfRange {
                column: "active_requests",
                value: event.active_requests.to_string(),
            })?;
        let mut rows = self.system_metrics.write();
        let id = rows.len() as i32 + 1;
        rows.push(SystemMetricRow {
            id,
            timestamp: event.timestamp,
            cpu: Some(event.cpu),
            memory: Some(event.memory),
            disk_usage: Some(event.disk_usage),
            active_requests: Some(active_requests),
        });
        Ok(id)
    }
}

#[async_trait]
impl LogReader for MemoryStore {
    async fn api_logs(&self, query: &LogQuery) -> Result<Vec<ApiLogRow>> {
        let mut rows: Vec<ApiLogRow> = self
            .api_logs
            .read()
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();

        if query.is_ascending() {
            rows.sort_by_key(|row| row.id);
        } else {
            rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        }
        rows.truncate(query.limit().max(0) as usize);
        Ok(rows)
    }

    async fn recent_metrics(&self, limit: i64) -> Result<Vec<SystemMetricRow>> {
        let mut rows = self.system_metrics.read().clone();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn max_api_log_id(&self) -> Result<i32> {
        Ok(self.api_logs.read().iter().map(|r| r.id).max().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn log_with_latency(offset_secs: i64, endpoint: &str, status: u16, latency: f64) -> ApiLogEvent {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::seconds(offset_secs);
        ApiLogEvent::success(ts, endpoint, status, latency)
    }

    #[tokio::test]
    async fn test_slow_responses_only_returns_rows_over_threshold() {
        let store = MemoryStore::new();
        store.insert_api_log(&log_with_latency(0, "/users", 200, 150.0)).await.unwrap();
        store.insert_api_log(&log_with_latency(1, "/orders", 200, 250.0)).await.unwrap();

        let rows = store.api_logs(&LogQuery::slow_responses(50)).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].response_time, Some(250.0));
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert_api_log(&log_with_latency(i, "/", 200, 10.0)).await.unwrap();
        }

        let rows = store.api_logs(&LogQuery::Recent { limit: 3 }).await.unwrap();

        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn test_tail_returns_only_new_rows_in_order() {
        let store = MemoryStore::new();
        for i in 0..4 {
            store.insert_api_log(&log_with_latency(i, "/products", 200, 10.0)).await.unwrap();
        }
        let last_seen = 2;

        let rows = store
            .api_logs(&LogQuery::After { last_id: last_seen, limit: 100 })
            .await
            .unwrap();

        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(store.max_api_log_id().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_error_filter() {
        let store = MemoryStore::new();
        let ts = Utc::now();
        store.insert_api_log(&log_with_latency(0, "/users", 200, 10.0)).await.unwrap();
        store
            .insert_api_log(&ApiLogEvent::failure(ts, Some("/error".into()), "HTTP 500", "HTTP_500"))
            .await
            .unwrap();

        let rows = store.api_logs(&LogQuery::Errors { limit: 10 }).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].error_code.as_deref(), Some("HTTP_500"));
    }

    #[tokio::test]
    async fn test_rejected_writes_leave_no_rows() {
        let store = MemoryStore::new();
        store.reject_writes(true);

        let result = store.insert_api_log(&log_with_latency(0, "/", 200, 1.0)).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.api_log_rows().is_empty());
    }
}
