mod instrumented;

use std::time::Duration;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use crate::event_sourcing::store::LogKind;

pub use instrumented::InstrumentedStore;

// ============================================================================
// Metrics Module - Prometheus metrics for the store
// ============================================================================
//
// Provides metrics for:
// - Records read and written per log
// - Failed store operations per log
// - Store operation latency
//
// The registry is owned here; exposing it (scrape endpoint, push gateway) is
// left to the application.
// ============================================================================

/// Store operation, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }
}

/// Metrics registry for store operations
pub struct StoreMetrics {
    registry: Registry,

    pub records_total: IntCounterVec,
    pub failures_total: IntCounterVec,
    pub operation_duration: HistogramVec,
}

impl StoreMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let records_total = IntCounterVec::new(
            Opts::new("store_records_total", "Total records read from or written to a log"),
            &["log", "operation"],
        )?;
        registry.register(Box::new(records_total.clone()))?;

        let failures_total = IntCounterVec::new(
            Opts::new("store_failures_total", "Total failed store operations"),
            &["log", "operation"],
        )?;
        registry.register(Box::new(failures_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("store_operation_duration_seconds", "Store operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["log", "operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            records_total,
            failures_total,
            operation_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a successful operation over `records` records
    pub fn record_success(&self, log: LogKind, operation: Operation, records: usize, elapsed: Duration) {
        let labels = [log.as_str(), operation.as_str()];
        self.records_total
            .with_label_values(&labels)
            .inc_by(records as u64);
        self.operation_duration
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }

    /// Helper to record a failed operation
    pub fn record_failure(&self, log: LogKind, operation: Operation, elapsed: Duration) {
        let labels = [log.as_str(), operation.as_str()];
        self.failures_total.with_label_values(&labels).inc();
        self.operation_duration
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }
}
