use std::path::PathBuf;

use crate::event_sourcing::core::CodecError;

// ============================================================================
// Store Errors
// ============================================================================
//
// Every failure is returned to the caller; nothing is retried here.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot reach the database: {0}")]
    Connectivity(#[source] sqlx::Error),

    #[error("failed to create schema: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log file {} is not a JSON array of envelopes: {source}", .path.display())]
    CorruptLog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to serialize log: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("row {id} in {table} has an unreadable payload: {source}")]
    Decode {
        table: &'static str,
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("transaction failed: {0}")]
    Transaction(#[source] sqlx::Error),

    #[error("failed to prepare statement: {0}")]
    Prepare(#[source] sqlx::Error),

    #[error("insert #{index} into {table} failed, batch rolled back: {source}")]
    Insert {
        table: &'static str,
        index: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("store is closed")]
    Closed,
}
