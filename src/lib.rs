//! Durable command and event logs for an event-sourced auction site.
//!
//! Two interchangeable backends implement the [`Store`] contract:
//!
//! - [`FileStore`]: one JSON file per log, replaced wholesale on every write.
//! - [`PostgresStore`]: one row per record, one transaction per batch.
//!
//! Records of either kind are persisted as tagged envelopes through an
//! explicit [`Codec`] registry, so several variants share one file or table
//! and come back as the right concrete type.

pub mod config;
pub mod domain;
pub mod event_sourcing;
pub mod metrics;

pub use event_sourcing::{
    Codec, CodecError, Envelope, FileStore, LogKind, PostgresStore, Record, Store, StoreError,
};
