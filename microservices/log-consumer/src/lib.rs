//! Log Consumer
//!
//! Drains the `api-logs` and `system-metrics` topics into their tables.
//! The binary wires Kafka and PostgreSQL into the pieces exported here.

pub mod config;
pub mod handler;
pub mod http;
pub mod ingest;
pub mod startup;
pub mod stats;

pub use config::ConsumerConfig;
pub use handler::{Disposition, MessageHandler};
pub use ingest::run_ingest;
pub use stats::ConsumerStats;
