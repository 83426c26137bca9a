use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::{Operation, StoreMetrics};
use crate::event_sourcing::store::{LogKind, Store, StoreError};

/// Store decorator that records Prometheus metrics for every operation.
pub struct InstrumentedStore<S> {
    inner: S,
    metrics: Arc<StoreMetrics>,
}

impl<S: Store> InstrumentedStore<S> {
    pub fn new(inner: S, metrics: Arc<StoreMetrics>) -> Self {
        Self { inner, metrics }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    fn observe<T>(
        &self,
        log: LogKind,
        operation: Operation,
        started: Instant,
        records: usize,
        result: Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let elapsed = started.elapsed();
        match &result {
            Ok(_) => self.metrics.record_success(log, operation, records, elapsed),
            Err(error) => {
                tracing::warn!(
                    log = log.as_str(),
                    operation = operation.as_str(),
                    error = %error,
                    "Store operation failed"
                );
                self.metrics.record_failure(log, operation, elapsed);
            }
        }
        result
    }
}

#[async_trait]
impl<S: Store> Store for InstrumentedStore<S> {
    type Command = S::Command;
    type Event = S::Event;

    async fn read_commands(&self) -> Result<Vec<Self::Command>, StoreError> {
        let started = Instant::now();
        let result = self.inner.read_commands().await;
        let count = result.as_ref().map_or(0, Vec::len);
        self.observe(LogKind::Commands, Operation::Read, started, count, result)
    }

    async fn write_commands(&self, commands: &[Self::Command]) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = self.inner.write_commands(commands).await;
        self.observe(LogKind::Commands, Operation::Write, started, commands.len(), result)
    }

    async fn read_events(&self) -> Result<Vec<Self::Event>, StoreError> {
        let started = Instant::now();
        let result = self.inner.read_events().await;
        let count = result.as_ref().map_or(0, Vec::len);
        self.observe(LogKind::Events, Operation::Read, started, count, result)
    }

    async fn write_events(&self, events: &[Self::Event]) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = self.inner.write_events(events).await;
        self.observe(LogKind::Events, Operation::Write, started, events.len(), result)
    }
}
