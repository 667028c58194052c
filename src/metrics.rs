//! Per-translator operation counters.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslatorMetrics {
    /// Completed load operations (including empty no-ops)
    loads: AtomicUsize,

    /// Completed save operations (including ones with nothing to write)
    saves: AtomicUsize,

    /// Completed delete operations
    deletes: AtomicUsize,

    /// Records returned by the repository across all loads
    records_fetched: AtomicUsize,

    /// Records handed to the repository across all saves
    records_written: AtomicUsize,

    /// Operations that failed in the repository
    failures: AtomicUsize,
}

impl TranslatorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_load(&self, records_fetched: usize) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.records_fetched
            .fetch_add(records_fetched, Ordering::Relaxed);
    }

    pub fn record_save(&self, records_written: usize) {
        self.saves.fetch_add(1, Ordering::Relaxed);
        self.records_written
            .fetch_add(records_written, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::Relaxed)
    }

    pub fn records_fetched(&self) -> usize {
        self.records_fetched.load(Ordering::Relaxed)
    }

    pub fn records_written(&self) -> usize {
        self.records_written.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let loads = self.loads();
        let saves = self.saves();
        let deletes = self.deletes();
        let failures = self.failures();

        let attempts = loads + saves + deletes + failures;
        let success_rate = if attempts > 0 {
            ((attempts - failures) as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            loads,
            saves,
            deletes,
            records_fetched: self.records_fetched(),
            records_written: self.records_written(),
            failures,
            success_rate,
        }
    }
}

/// Snapshot of a translator's counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub loads: usize,
    pub saves: usize,
    pub deletes: usize,
    pub records_fetched: usize,
    pub records_written: usize,
    pub failures: usize,

    /// Successful operations as a percentage (0-100)
    pub success_rate: f64,
}
