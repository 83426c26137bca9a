use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Executor, Postgres, Row, Statement, Transaction};

use super::contract::{LogKind, Store};
use super::error::StoreError;
use crate::config::PostgresConfig;
use crate::event_sourcing::core::codec::not_an_object;
use crate::event_sourcing::core::{Codec, Envelope, Record};

// ============================================================================
// Relational-Backed Log - PostgreSQL
// ============================================================================
//
// One row per record. The tag lives in its own column, the payload (tag
// removed) in a JSONB column. Rows are read back ordered by the logical
// timestamp, with the serial id breaking ties in write order.
//
// Each write is one transaction: every row of the batch commits or none does,
// so callers append only the new records.
//
// ============================================================================

// TIMESTAMPTZ keeps microseconds; records closer than 1µs order by id.
fn create_table_sql(kind: LogKind) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {table} (
            id BIGSERIAL PRIMARY KEY,
            "type" VARCHAR(50) NOT NULL,
            "timestamp" TIMESTAMPTZ NOT NULL,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
        table = kind.as_str()
    )
}

fn create_index_sql(kind: LogKind) -> String {
    format!(
        r#"CREATE INDEX IF NOT EXISTS {table}_order_idx ON {table} ("timestamp", id)"#,
        table = kind.as_str()
    )
}

fn select_sql(kind: LogKind) -> String {
    format!(
        r#"SELECT id, "type", data::text AS data FROM {} ORDER BY "timestamp" ASC, id ASC"#,
        kind.as_str()
    )
}

fn insert_sql(kind: LogKind) -> String {
    format!(
        r#"INSERT INTO {} ("type", "timestamp", data) VALUES ($1, $2, $3::jsonb)"#,
        kind.as_str()
    )
}

/// A record flattened into the three columns the backend writes.
#[derive(Debug)]
struct RowValues {
    tag: String,
    timestamp: DateTime<Utc>,
    data: String,
}

/// Store backed by the `commands` and `events` tables of one database.
pub struct PostgresStore<C: Record, E: Record> {
    pool: PgPool,
    command_codec: Codec<C>,
    event_codec: Codec<E>,
}

impl<C: Record, E: Record> PostgresStore<C, E> {
    /// Connect, verify the connection and make sure the schema exists.
    pub async fn connect(
        config: &PostgresConfig,
        command_codec: Codec<C>,
        event_codec: Codec<E>,
    ) -> Result<Self, StoreError> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.dbname,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(config.connect_options())
            .await
            .map_err(StoreError::Connectivity)?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(StoreError::Connectivity)?;

        Self::from_pool(pool, command_codec, event_codec).await
    }

    /// Wrap a pool the application already owns; creates the schema if absent.
    pub async fn from_pool(
        pool: PgPool,
        command_codec: Codec<C>,
        event_codec: Codec<E>,
    ) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            command_codec,
            event_codec,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create both log tables if they do not exist. Safe to repeat.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.check_open()?;

        for kind in LogKind::ALL {
            for sql in [create_table_sql(kind), create_index_sql(kind)] {
                sqlx::query(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(StoreError::Schema)?;
            }
        }

        tracing::debug!("Log tables ready");
        Ok(())
    }

    /// Close the pool. Every later operation fails with [`StoreError::Closed`].
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    async fn read_log<R: Record>(&self, kind: LogKind, codec: &Codec<R>) -> Result<Vec<R>, StoreError> {
        self.check_open()?;

        let sql = select_sql(kind);
        let mut rows = sqlx::query(&sql).fetch(&self.pool);
        let mut records = Vec::new();

        while let Some(row) = rows.try_next().await.map_err(StoreError::Query)? {
            let id: i64 = row.try_get("id").map_err(StoreError::Query)?;
            let tag: String = row.try_get("type").map_err(StoreError::Query)?;
            let data: String = row.try_get("data").map_err(StoreError::Query)?;

            let payload: Value = serde_json::from_str(&data).map_err(|source| StoreError::Decode {
                table: kind.as_str(),
                id,
                source,
            })?;
            if !payload.is_object() {
                return Err(StoreError::Decode {
                    table: kind.as_str(),
                    id,
                    source: not_an_object(&payload),
                });
            }

            records.push(codec.decode_envelope(Envelope::join(tag, payload)?)?);
        }

        tracing::debug!(table = kind.as_str(), count = records.len(), "Read log from PostgreSQL");
        Ok(records)
    }

    async fn write_log<R: Record>(
        &self,
        kind: LogKind,
        codec: &Codec<R>,
        records: &[R],
    ) -> Result<(), StoreError> {
        self.check_open()?;

        if records.is_empty() {
            return Ok(());
        }

        let rows = records
            .iter()
            .map(|record| -> Result<RowValues, StoreError> {
                let envelope = codec.encode_envelope(record)?;
                let data = serde_json::to_string(&envelope.payload).map_err(StoreError::Encode)?;
                Ok(RowValues {
                    tag: envelope.tag,
                    timestamp: record.timestamp(),
                    data,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await.map_err(StoreError::Transaction)?;

        if let Err(error) = insert_batch(&mut tx, kind, &rows).await {
            tracing::warn!(
                table = kind.as_str(),
                batch_size = rows.len(),
                error = %error,
                "Insert failed, rolling back batch"
            );
            if let Err(rollback_error) = tx.rollback().await {
                tracing::error!(
                    table = kind.as_str(),
                    error = %rollback_error,
                    "Rollback failed, connection discarded"
                );
            }
            return Err(error);
        }

        tx.commit().await.map_err(StoreError::Transaction)?;

        tracing::info!(
            table = kind.as_str(),
            count = rows.len(),
            "✅ Appended batch to PostgreSQL log"
        );
        Ok(())
    }
}

/// Insert `rows` in order inside `tx` using one prepared statement.
async fn insert_batch(
    tx: &mut Transaction<'_, Postgres>,
    kind: LogKind,
    rows: &[RowValues],
) -> Result<(), StoreError> {
    let sql = insert_sql(kind);
    let statement = (&mut **tx).prepare(&sql).await.map_err(StoreError::Prepare)?;

    for (index, row) in rows.iter().enumerate() {
        statement
            .query()
            .bind(&row.tag)
            .bind(row.timestamp)
            .bind(&row.data)
            .execute(&mut **tx)
            .await
            .map_err(|source| StoreError::Insert {
                table: kind.as_str(),
                index,
                source,
            })?;
    }

    Ok(())
}

#[async_trait]
impl<C: Record, E: Record> Store for PostgresStore<C, E> {
    type Command = C;
    type Event = E;

    async fn read_commands(&self) -> Result<Vec<C>, StoreError> {
        self.read_log(LogKind::Commands, &self.command_codec).await
    }

    async fn write_commands(&self, commands: &[C]) -> Result<(), StoreError> {
        self.write_log(LogKind::Commands, &self.command_codec, commands).await
    }

    async fn read_events(&self) -> Result<Vec<E>, StoreError> {
        self.read_log(LogKind::Events, &self.event_codec).await
    }

    async fn write_events(&self, events: &[E]) -> Result<(), StoreError> {
        self.write_log(LogKind::Events, &self.event_codec, events).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Statement text and the closed-store path are checked here without a
// database. Round trips, ordering and rollback run against a live server in
// tests/postgres_store.rs.
//
// ============================================================================
