//! Store Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Value out of range for column {column}: {value}")]
    OutOfRange { column: &'static str, value: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for logpipe_core::PipelineError {
    fn from(err: StoreError) -> Self {
        logpipe_core::PipelineError::Database(err.to_string())
    }
}
