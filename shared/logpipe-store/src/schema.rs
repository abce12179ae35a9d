//! Table and index definitions
//!
//! Every statement is guarded with `IF NOT EXISTS`, so running the whole
//! set against an initialized database is a no-op.

use tracing::info;

use crate::{Result, StorePool};

pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS api_logs (
        id SERIAL PRIMARY KEY,
        timestamp TIMESTAMP NOT NULL,
        endpoint VARCHAR(255),
        status INTEGER,
        response_time FLOAT,
        method VARCHAR(10),
        error TEXT,
        error_code VARCHAR(50)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS system_metrics (
        id SERIAL PRIMARY KEY,
        timestamp TIMESTAMP NOT NULL,
        cpu FLOAT,
        memory FLOAT,
        disk_usage FLOAT,
        active_requests INTEGER
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_api_logs_timestamp ON api_logs (timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_api_logs_endpoint ON api_logs (endpoint)",
    "CREATE INDEX IF NOT EXISTS idx_api_logs_status ON api_logs (status)",
    "CREATE INDEX IF NOT EXISTS idx_system_metrics_timestamp ON system_metrics (timestamp)",
];

/// Create both tables and their indexes if missing
pub async fn init_schema(pool: &StorePool) -> Result<()> {
    let conn = pool.get().await?;
    for statement in SCHEMA_STATEMENTS {
        conn.batch_execute(statement).await?;
    }
    info!(statements = SCHEMA_STATEMENTS.len(), "Schema initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_statements_are_idempotent() {
        for statement in SCHEMA_STATEMENTS {
            assert!(statement.contains("IF NOT EXISTS"), "not idempotent: {}", statement);
        }
    }

    #[test]
    fn test_expected_indexes() {
        let indexes: Vec<&str> = SCHEMA_STATEMENTS
            .iter()
            .filter(|s| s.starts_with("CREATE INDEX"))
            .copied()
            .collect();

        assert_eq!(indexes.len(), 4);
        assert!(indexes.iter().any(|s| s.contains("api_logs (timestamp)")));
        assert!(indexes.iter().any(|s| s.contains("api_logs (endpoint)")));
        assert!(indexes.iter().any(|s| s.contains("api_logs (status)")));
        assert!(indexes.iter().any(|s| s.contains("system_metrics (timestamp)")));
    }
}
