//! logpipe Store
//!
//! PostgreSQL persistence for pipeline events: connection pooling, schema
//! setup, the consumer's insert path and the viewer's read queries.

mod error;
mod memory;
mod pool;
mod query;
mod repository;
mod schema;
mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use pool::{PoolConfig, PoolStats, StorePool};
pub use query::LogQuery;
pub use repository::{EventSink, LogReader, PgEventStore};
pub use schema::{init_schema, SCHEMA_STATEMENTS};
pub use types::{ApiLogRow, SystemMetricRow};
