use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fetcher::FetchSummary;
use parking_lot::RwLock;

/// Fetch metrics tracker
#[derive(Clone)]
pub struct FetchMetrics {
    inner: Arc<FetchMetricsInner>,
}

struct FetchMetricsInner {
    /// Fetches currently in flight
    active_fetches: AtomicU64,

    /// Total fetches started (lifetime)
    total_fetches: AtomicU64,

    /// Total fetches that returned an error
    failed_fetches: AtomicU64,

    /// Files read successfully across all fetches
    files_read: AtomicU64,

    /// Files skipped because they could not be read
    files_skipped: AtomicU64,

    /// Records returned to clients
    records_returned: AtomicU64,

    /// Failed fetches per error code
    failures_by_code: RwLock<HashMap<&'static str, u64>>,
}

/// Marks one in-flight fetch; the active count drops when this is dropped,
/// including when the request future is abandoned mid-way.
pub struct FetchGuard {
    metrics: FetchMetrics,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        let _ = self.metrics.inner.active_fetches.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |current| current.checked_sub(1),
        );
    }
}

impl FetchMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FetchMetricsInner {
                active_fetches: AtomicU64::new(0),
                total_fetches: AtomicU64::new(0),
                failed_fetches: AtomicU64::new(0),
                files_read: AtomicU64::new(0),
                files_skipped: AtomicU64::new(0),
                records_returned: AtomicU64::new(0),
                failures_by_code: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Called when a fetch request starts
    pub fn fetch_started(&self) -> FetchGuard {
        self.inner.active_fetches.fetch_add(1, Ordering::Relaxed);
        self.inner.total_fetches.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            active = self.inner.active_fetches.load(Ordering::Relaxed),
            "Fetch started"
        );

        FetchGuard {
            metrics: self.clone(),
        }
    }

    /// Called when a fetch completes successfully
    pub fn fetch_succeeded(&self, summary: &FetchSummary) {
        self.inner.files_read.fetch_add(summary.files_read as u64, Ordering::Relaxed);
        self.inner.files_skipped.fetch_add(summary.files_skipped as u64, Ordering::Relaxed);
        self.inner.records_returned.fetch_add(summary.records as u64, Ordering::Relaxed);
    }

    /// Called when a fetch returns an error
    pub fn fetch_failed(&self, code: &'static str) {
        self.inner.failed_fetches.fetch_add(1, Ordering::Relaxed);
        *self.inner.failures_by_code.write().entry(code).or_insert(0) += 1;
    }

    pub fn active_count(&self) -> u64 {
        self.inner.active_fetches.load(Ordering::Relaxed)
    }

    pub fn total_count(&self) -> u64 {
        self.inner.total_fetches.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.inner.failed_fetches.load(Ordering::Relaxed)
    }

    pub fn files_read(&self) -> u64 {
        self.inner.files_read.load(Ordering::Relaxed)
    }

    pub fn files_skipped(&self) -> u64 {
        self.inner.files_skipped.load(Ordering::Relaxed)
    }

    pub fn records_returned(&self) -> u64 {
        self.inner.records_returned.load(Ordering::Relaxed)
    }

    pub fn failures_by_code(&self) -> HashMap<&'static str, u64> {
        self.inner.failures_by_code.read().clone()
    }

    /// Log current metrics summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_fetches = self.total_count(),
            failed_fetches = self.failed_count(),
            files_read = self.files_read(),
            files_skipped = self.files_skipped(),
            records_returned = self.records_returned(),
            "Fetch metrics summary"
        );
    }
}

impl Default for FetchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
