// ============================================================================
// Event Sourcing Store - Generic Persistence Layer
// ============================================================================
//
// This module contains GENERIC persistence infrastructure for event sourcing.
// Both backends work with ANY command/event record kind.
//
// - FileStore:     one JSON file per log, whole-file replace
// - PostgresStore: one row per record, one transaction per batch
//
// ============================================================================

pub mod contract;
pub mod error;
pub mod file_store;
pub mod postgres_store;

pub use contract::{LogKind, Store};
pub use error::StoreError;
pub use file_store::FileStore;
pub use postgres_store::PostgresStore;
