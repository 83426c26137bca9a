use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::contract::Store;
use super::error::StoreError;
use crate::event_sourcing::core::{Codec, Envelope, Record};

// ============================================================================
// File-Backed Log
// ============================================================================
//
// One JSON file per log holding an array of tagged envelopes. The whole file
// is read and the whole file is replaced; there is no append primitive, so
// callers read, extend and write back the full history.
//
// Concurrent writers race (last writer wins) and must be serialized by the
// caller.
//
// ============================================================================

/// Read every record from the log at `path`.
///
/// A missing or empty file is an empty log.
pub async fn read_all<R: Record>(path: &Path, codec: &Codec<R>) -> Result<Vec<R>, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No log file yet, returning empty log");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let envelopes: Vec<Value> =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::CorruptLog {
            path: path.to_path_buf(),
            source,
        })?;

    let records = envelopes
        .into_iter()
        .map(|value| codec.decode_envelope(Envelope::from_value(value)?))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(path = %path.display(), count = records.len(), "Read file log");
    Ok(records)
}

/// Replace the log at `path` with exactly `records`.
///
/// The new content is written to a sibling temporary file, synced, then
/// renamed over the target.
pub async fn write_all<R: Record>(
    path: &Path,
    records: &[R],
    codec: &Codec<R>,
) -> Result<(), StoreError> {
    let envelopes = records
        .iter()
        .map(|record| codec.encode_envelope(record))
        .collect::<Result<Vec<_>, _>>()?;
    let bytes = serde_json::to_vec_pretty(&envelopes).map_err(StoreError::Encode)?;

    let io_error = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let temp = temp_path(path);
    if let Err(source) = write_synced(&temp, &bytes).await {
        let _ = fs::remove_file(&temp).await;
        return Err(io_error(source));
    }
    if let Err(source) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(io_error(source));
    }

    tracing::info!(path = %path.display(), count = records.len(), "Wrote file log");
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// `events.json` -> `events.json.<uuid>.tmp`, in the same directory.
///
/// Each writer gets its own file, so overlapping writes never share an inode.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("log"));
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    path.with_file_name(name)
}

// ============================================================================
// FileStore
// ============================================================================

/// Store backed by two JSON files, one per log.
#[derive(Debug)]
pub struct FileStore<C: Record, E: Record> {
    commands_path: PathBuf,
    events_path: PathBuf,
    command_codec: Codec<C>,
    event_codec: Codec<E>,
}

impl<C: Record, E: Record> FileStore<C, E> {
    pub fn new(
        commands_path: impl Into<PathBuf>,
        events_path: impl Into<PathBuf>,
        command_codec: Codec<C>,
        event_codec: Codec<E>,
    ) -> Self {
        Self {
            commands_path: commands_path.into(),
            events_path: events_path.into(),
            command_codec,
            event_codec,
        }
    }

    pub fn commands_path(&self) -> &Path {
        &self.commands_path
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    /// Read the command log, extend it with `commands`, write it back.
    pub async fn append_commands(&self, commands: &[C]) -> Result<(), StoreError> {
        let mut history = self.read_commands().await?;
        history.extend_from_slice(commands);
        self.write_commands(&history).await
    }

    /// Read the event log, extend it with `events`, write it back.
    pub async fn append_events(&self, events: &[E]) -> Result<(), StoreError> {
        let mut history = self.read_events().await?;
        history.extend_from_slice(events);
        self.write_events(&history).await
    }
}

#[async_trait]
impl<C: Record, E: Record> Store for FileStore<C, E> {
    type Command = C;
    type Event = E;

    async fn read_commands(&self) -> Result<Vec<C>, StoreError> {
        read_all(&self.commands_path, &self.command_codec).await
    }

    async fn write_commands(&self, commands: &[C]) -> Result<(), StoreError> {
        write_all(&self.commands_path, commands, &self.command_codec).await
    }

    async fn read_events(&self) -> Result<Vec<E>, StoreError> {
        read_all(&self.events_path, &self.event_codec).await
    }

    async fn write_events(&self, events: &[E]) -> Result<(), StoreError> {
        write_all(&self.events_path, events, &self.event_codec).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
