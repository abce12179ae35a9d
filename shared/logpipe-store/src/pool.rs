//! Connection Pool for PostgreSQL

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use logpipe_core::DatabaseConfig;
use tokio_postgres::NoTls;
use tracing::{debug, info};

use crate::{Result, StoreError};

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url(),
            max_size: config.pool_size,
        }
    }
}

/// Shared PostgreSQL connection pool
#[derive(Clone)]
pub struct StorePool {
    pool: Pool,
}

impl StorePool {
    /// Build the pool. No connection is opened until first use.
    pub fn new(config: PoolConfig) -> Result<Self> {
        info!(max_size = config.max_size, "Creating PostgreSQL connection pool");

        let pg_config: tokio_postgres::Config = config
            .url
            .parse()
            .map_err(|e| StoreError::Configuration(format!("Invalid URL: {}", e)))?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = Manager::from_config(pg_config, NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.max_size)
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        debug!("PostgreSQL pool created");

        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    /// Round-trip a trivial query; used to gate startup on the store
    pub async fn ping(&self) -> Result<()> {
        let conn = self.get().await?;
        conn.simple_query("SELECT 1").await?;
        Ok(())
    }

    pub async fn is_healthy(&self) -> bool {
        self.ping().await.is_ok()
    }

    /// Close the pool; outstanding objects are dropped when returned
    pub fn close(&self) {
        self.pool.close();
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            size: status.size,
            available: status.available as usize,
            waiting: status.waiting,
        }
    }
}

/// Pool statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct PoolStats {
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_from_database_config() {
        let db = DatabaseConfig {
            host: "db".to_string(),
            port: 6543,
            pool_size: 3,
            ..DatabaseConfig::default()
        };
        let config = PoolConfig::from(&db);
        assert_eq!(config.url, "postgres://postgres:postgres@db:6543/logs");
        assert_eq!(config.max_size, 3);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = StorePool::new(PoolConfig {
            url: "not a url at all ::".to_string(),
            max_size: 1,
        });
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_pool_builds_without_connecting() {
        let pool = StorePool::new(PoolConfig::default()).unwrap();
        assert_eq!(pool.stats().size, 0);
    }
}
