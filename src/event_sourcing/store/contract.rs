use async_trait::async_trait;

use super::error::StoreError;
use crate::event_sourcing::core::Record;

// ============================================================================
// Store Contract
// ============================================================================
//
// The only persistence surface the application sees: full-history read and
// ordered batch write for each of the two logs. No filtering, no deletes.
//
// ============================================================================

/// Persistence for one command log and one event log.
///
/// Reads return records in write order. An empty vector means the log has
/// never been written.
#[async_trait]
pub trait Store: Send + Sync {
    type Command: Record;
    type Event: Record;

    async fn read_commands(&self) -> Result<Vec<Self::Command>, StoreError>;

    async fn write_commands(&self, commands: &[Self::Command]) -> Result<(), StoreError>;

    async fn read_events(&self) -> Result<Vec<Self::Event>, StoreError>;

    async fn write_events(&self, events: &[Self::Event]) -> Result<(), StoreError>;
}

/// Which of the two logs an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Commands,
    Events,
}

impl LogKind {
    pub const ALL: [LogKind; 2] = [LogKind::Commands, LogKind::Events];

    /// Table name in the relational backend, also used as a log label.
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Commands => "commands",
            LogKind::Events => "events",
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
