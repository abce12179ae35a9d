//! Parameterized read queries over `api_logs`

use tokio_postgres::types::ToSql;

use crate::ApiLogRow;

const API_LOG_COLUMNS: &str =
    "id, timestamp, endpoint, status, response_time, method, error, error_code";

/// Read-only queries the viewer can issue against `api_logs`
#[derive(Debug, Clone, PartialEq)]
pub enum LogQuery {
    /// Newest rows first
    Recent { limit: i64 },
    /// Endpoint contains the given fragment
    ByEndpoint { endpoint: String, limit: i64 },
    ByStatus { status: i32, limit: i64 },
    /// Response time strictly above the threshold
    SlowResponses { threshold_ms: f64, limit: i64 },
    /// Failed probes and any 4xx/5xx rows
    Errors { limit: i64 },
    /// Rows with id greater than `last_id`, oldest first; drives tail mode
    After { last_id: i32, limit: i64 },
}

impl LogQuery {
    pub const SLOW_THRESHOLD_MS: f64 = 200.0;

    pub fn slow_responses(limit: i64) -> Self {
        Self::SlowResponses {
            threshold_ms: Self::SLOW_THRESHOLD_MS,
            limit,
        }
    }

    pub fn limit(&self) -> i64 {
        match self {
            Self::Recent { limit }
            | Self::ByEndpoint { limit, .. }
            | Self::ByStatus { limit, .. }
            | Self::SlowResponses { limit, .. }
            | Self::Errors { limit }
            | Self::After { limit, .. } => *limit,
        }
    }

    pub fn sql(&self) -> String {
        let filter = match self {
            Self::Recent { .. } => None,
            Self::ByEndpoint { .. } => Some(r"WHERE endpoint LIKE $1 ESCAPE '\'"),
            Self::ByStatus { .. } => Some("WHERE status = $1"),
            Self::SlowResponses { .. } => Some("WHERE response_time > $1"),
            Self::Errors { .. } => Some("WHERE error IS NOT NULL OR status >= 400"),
            Self::After { .. } => Some("WHERE id > $1"),
        };
        let (order, limit_param) = match self {
            Self::After { .. } => ("ORDER BY id ASC", "$2"),
            Self::Recent { .. } | Self::Errors { .. } => ("ORDER BY timestamp DESC, id DESC", "$1"),
            _ => ("ORDER BY timestamp DESC, id DESC", "$2"),
        };

        let mut clauses = vec![format!("SELECT {} FROM api_logs", API_LOG_COLUMNS)];
        clauses.extend(filter.map(str::to_string));
        clauses.push(order.to_string());
        clauses.push(format!("LIMIT {}", limit_param));
        clauses.join(" ")
    }

    pub fn params(&self) -> Vec<Box<dyn ToSql + Sync + Send>> {
        match self {
            Self::Recent { limit } | Self::Errors { limit } => vec![Box::new(*limit)],
            Self::ByEndpoint { endpoint, limit } => {
                vec![Box::new(format!("%{}%", escape_like(endpoint))), Box::new(*limit)]
            }
            Self::ByStatus { status, limit } => vec![Box::new(*status), Box::new(*limit)],
            Self::SlowResponses { threshold_ms, limit } => {
                vec![Box::new(*threshold_ms), Box::new(*limit)]
            }
            Self::After { last_id, limit } => vec![Box::new(*last_id), Box::new(*limit)],
        }
    }

    /// In-process evaluation of the WHERE clause, mirroring `sql()`
    pub fn matches(&self, row: &ApiLogRow) -> bool {
        match self {
            Self::Recent { .. } => true,
            Self::ByEndpoint { endpoint, .. } => row
                .endpoint
                .as_deref()
                .is_some_and(|e| e.contains(endpoint.as_str())),
            Self::ByStatus { status, .. } => row.status == Some(*status),
            Self::SlowResponses { threshold_ms, .. } => {
                row.response_time.is_some_and(|t| t > *threshold_ms)
            }
            Self::Errors { .. } => row.is_error(),
            Self::After { last_id, .. } => row.id > *last_id,
        }
    }

    /// `true` when results come back oldest first
    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::After { .. })
    }
}

/// Escape LIKE wildcards so the fragment matches literally
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_responses_sql() {
        let query = LogQuery::slow_responses(20);
        assert_eq!(
            query.sql(),
            "SELECT id, timestamp, endpoint, status, response_time, method, error, error_code \
             FROM api_logs WHERE response_time > $1 ORDER BY timestamp DESC, id DESC LIMIT $2"
        );
        assert_eq!(query.params().len(), 2);
    }

    #[test]
    fn test_recent_has_single_param() {
        let query = LogQuery::Recent { limit: 10 };
        assert_eq!(
            query.sql(),
            "SELECT id, timestamp, endpoint, status, response_time, method, error, error_code \
             FROM api_logs ORDER BY timestamp DESC, id DESC LIMIT $1"
        );
        assert_eq!(query.params().len(), 1);
    }

    #[test]
    fn test_tail_orders_by_id() {
        let query = LogQuery::After { last_id: 41, limit: 100 };
        assert!(query.sql().contains("WHERE id > $1 ORDER BY id ASC LIMIT $2"));
        assert!(query.is_ascending());
    }

    #[test]
    fn test_endpoint_fragment_is_escaped() {
        assert_eq!(escape_like("/u_ers"), r"/u\_ers");
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("/users"), "/users");

        let query = LogQuery::ByEndpoint { endpoint: "/u_ers".into(), limit: 5 };
        assert!(query.sql().contains(r"WHERE endpoint LIKE $1 ESCAPE '\' ORDER BY"));
    }

    #[test]
    fn test_endpoint_match_is_literal() {
        let row = |endpoint: &str| ApiLogRow {
            id: 1,
            timestamp: chrono::Utc::now(),
            endpoint: Some(endpoint.to_string()),
            status: Some(200),
            response_time: Some(10.0),
            method: Some("GET".to_string()),
            error: None,
            error_code: None,
        };
        let query = LogQuery::ByEndpoint { endpoint: "/u_ers".into(), limit: 5 };

        assert!(!query.matches(&row("/users")));
        assert!(query.matches(&row("/u_ers/7")));
    }

    #[test]
    fn test_placeholder_count_matches_params() {
        let queries = [
            LogQuery::Recent { limit: 1 },
            LogQuery::ByEndpoint { endpoint: "/users".into(), limit: 1 },
            LogQuery::ByStatus { status: 500, limit: 1 },
            LogQuery::slow_responses(1),
            LogQuery::Errors { limit: 1 },
            LogQuery::After { last_id: 0, limit: 1 },
        ];
        for query in queries {
            let sql = query.sql();
            let placeholders = (1..=3).filter(|i| sql.contains(&format!("${}", i))).count();
            assert_eq!(placeholders, query.params().len(), "{}", sql);
        }
    }
}
