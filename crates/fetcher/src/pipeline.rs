//! Pipeline — resolve, load, and extract across every file of a request.

use std::pin::pin;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::LogStore;
use crate::conf::FetchOptions;
use crate::error::{FetchError, FetchResult};
use crate::extract::FieldExtractor;
use crate::model::{FetchRequest, FieldRecord};
use crate::pattern::PatternCatalog;
use crate::source::{resolve, ResolvedSources};

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub files_resolved: usize,
    pub files_read: usize,
    pub files_skipped: usize,
    pub entries: usize,
    pub records: usize,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub records: Vec<FieldRecord>,
    pub summary: FetchSummary,
}

/// Stateless orchestrator. Every call to [`run`](Self::run) builds its own
/// working set; the pipeline itself only holds shared, read-only parts.
#[derive(Clone)]
pub struct ExtractionPipeline {
    store: Arc<dyn LogStore>,
    catalog: Arc<PatternCatalog>,
    options: FetchOptions,
}

impl ExtractionPipeline {
    pub fn new(store: Arc<dyn LogStore>, catalog: Arc<PatternCatalog>, options: FetchOptions) -> Self {
        Self {
            store,
            catalog,
            options,
        }
    }

    /// Run the pipeline and return the aggregated records.
    pub async fn run(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> FetchResult<Vec<FieldRecord>> {
        self.run_report(request, cancel).await.map(|report| report.records)
    }

    /// Run the pipeline, returning records together with run counters.
    ///
    /// A file that fails to read is skipped; the rest are still processed.
    /// Cancellation discards everything gathered so far.
    pub async fn run_report(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> FetchResult<FetchReport> {
        request.validate_kinds()?;

        let mut sources = self.resolve_sources(request).await?;
        if let Some(max) = self.options.max_files {
            if sources.len() > max {
                debug!(resolved = sources.len(), max, "Capping resolved files");
                sources = sources.limit(max);
            }
        }

        let extractor = FieldExtractor::new(Arc::clone(&self.catalog), &request.requested_field_kinds);
        let mut summary = FetchSummary {
            files_resolved: sources.len(),
            ..Default::default()
        };
        let mut records = Vec::new();

        let mut files = pin!(sources.files(
            self.store.as_ref(),
            cancel,
            self.options.read_concurrency,
        ));

        while let Some(loaded) = files.next().await {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            match loaded {
                Ok(file) => {
                    let extracted = extractor.extract(&file.content, &file.name);
                    let entries = extracted.len() / extractor.kinds_per_entry();
                    debug!(file = %file.name, entries, records = extracted.len(), "Extracted fields");

                    summary.files_read += 1;
                    summary.entries += entries;
                    records.extend(extracted);
                }
                Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                Err(e) => {
                    warn!("Skipping log file: {}", e);
                    summary.files_skipped += 1;
                }
            }
        }

        summary.records = records.len();
        info!(
            files_resolved = summary.files_resolved,
            files_read = summary.files_read,
            files_skipped = summary.files_skipped,
            entries = summary.entries,
            records = summary.records,
            "Fetch completed"
        );

        Ok(FetchReport { records, summary })
    }

    /// Directory probing and listing block, so they run on the blocking pool.
    async fn resolve_sources(&self, request: &FetchRequest) -> FetchResult<ResolvedSources> {
        let store = Arc::clone(&self.store);
        let request = request.clone();

        match tokio::task::spawn_blocking(move || resolve(store.as_ref(), &request)).await {
            Ok(resolved) => resolved,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(FetchError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FakeStore, LocalStore};
    use crate::model::FieldKind;
    use std::time::Duration;

    const APP_LOG: &str = "2024-01-01 10:00:00.1234 INFO [com.app.Main] message one";

    fn pipeline(store: Arc<dyn LogStore>) -> ExtractionPipeline {
        ExtractionPipeline::new(
            store,
            Arc::new(PatternCatalog::new().unwrap()),
            FetchOptions::default(),
        )
    }

    fn request(dir: Option<&str>, explicit: &[&str]) -> FetchRequest {
        FetchRequest {
            directory_path: dir.map(str::to_string),
            explicit_file_paths: explicit.iter().map(|p| p.to_string()).collect(),
            requested_field_kinds: FieldKind::ALL.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_scenario_single_app_log() {
        let store = Arc::new(FakeStore::new().with_file("/logs/app.log", APP_LOG));
        let records = pipeline(store)
            .run(&request(Some("/logs"), &[]), &CancellationToken::new())
            .await
            .unwrap();

        let got: Vec<(FieldKind, &str)> = records.iter().map(|r| (r.kind, r.value.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (FieldKind::Timestamp, "2024-01-01 10:00:00.1234"),
                (FieldKind::LogLevel, "INFO"),
                (FieldKind::ClassName, "[com.app.Main]"),
                (FieldKind::ThreadId, "2"),
            ]
        );
        assert!(records.iter().all(|r| r.entry_index == 0 && r.source_name == "app.log"));
    }

    #[tokio::test]
    async fn test_no_source_reports_invalid_and_touches_nothing() {
        let store = Arc::new(FakeStore::new().with_file("/logs/app.log", APP_LOG));
        let err = pipeline(store.clone())
            .run(&request(None, &[]), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ConfigurationInvalid(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_kinds_rejected_before_resolving() {
        let store = Arc::new(FakeStore::new().with_file("/logs/app.log", APP_LOG));
        let mut req = request(Some("/logs"), &[]);
        req.requested_field_kinds.clear();

        let err = pipeline(store.clone())
            .run(&req, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ConfigurationInvalid(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_directory_propagates() {
        let store = Arc::new(FakeStore::new());
        let err = pipeline(store)
            .run(&request(Some("/absent"), &[]), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_files_concatenated_in_resolver_order() {
        let store = Arc::new(
            FakeStore::new()
                .with_file("/logs/z.log", "2024-01-01 10:00:00.0001 WARN [Z] z")
                .with_file("/logs/a.log", "2024-01-01 10:00:00.0002 INFO [A] a\n2024-01-01 10:00:00.0003 INFO [A] b"),
        );
        let records = pipeline(store)
            .run(&request(Some("/logs"), &[]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(records.len(), 12);
        let sources: Vec<(&str, usize)> = records
            .iter()
            .filter(|r| r.kind == FieldKind::Timestamp)
            .map(|r| (r.source_name.as_str(), r.entry_index))
            .collect();
        assert_eq!(sources, vec![("z.log", 0), ("a.log", 0), ("a.log", 1)]);
    }

    #[tokio::test]
    async fn test_output_follows_resolver_order_when_reads_finish_out_of_order() {
        let store = Arc::new(
            FakeStore::new()
                .with_file("/logs/a.log", "2024-01-01 10:00:00.0001 INFO [A] a")
                .with_file("/logs/b.log", "2024-01-01 10:00:00.0002 INFO [B] b")
                .with_file("/logs/c.log", "2024-01-01 10:00:00.0003 INFO [C] c")
                .with_file_delay("/logs/a.log", Duration::from_millis(80))
                .with_file_delay("/logs/c.log", Duration::from_millis(20)),
        );
        let pipeline = ExtractionPipeline::new(
            store.clone(),
            Arc::new(PatternCatalog::new().unwrap()),
            FetchOptions {
                read_concurrency: 3,
                ..Default::default()
            },
        );

        let records = pipeline
            .run(&request(Some("/logs"), &[]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            store.completion_order().await,
            vec![
                std::path::PathBuf::from("/logs/b.log"),
                std::path::PathBuf::from("/logs/c.log"),
                std::path::PathBuf::from("/logs/a.log"),
            ]
        );
        let sources: Vec<&str> = records
            .iter()
            .filter(|r| r.kind == FieldKind::Timestamp)
            .map(|r| r.source_name.as_str())
            .collect();
        assert_eq!(sources, vec!["a.log", "b.log", "c.log"]);
    }

    #[tokio::test]
    async fn test_slow_listing_does_not_block_the_runtime() {
        let store = Arc::new(
            FakeStore::new()
                .with_file("/logs/a.log", APP_LOG)
                .with_list_delay(Duration::from_millis(300)),
        );
        let pipeline = pipeline(store);
        let req = request(Some("/logs"), &[]);
        let cancel = CancellationToken::new();

        let finished_first = tokio::select! {
            biased;
            _ = pipeline.run(&req, &cancel) => true,
            _ = tokio::time::sleep(Duration::from_millis(20)) => false,
        };
        assert!(!finished_first);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_skipped() {
        let store = Arc::new(
            FakeStore::new()
                .with_file("/logs/a.log", APP_LOG)
                .with_unreadable("/logs/b.log")
                .with_file("/logs/c.log", APP_LOG),
        );
        let report = pipeline(store)
            .run_report(&request(Some("/logs"), &[]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.records.len(), 8);
        assert_eq!(report.summary.files_resolved, 3);
        assert_eq!(report.summary.files_read, 2);
        assert_eq!(report.summary.files_skipped, 1);
        assert_eq!(report.summary.entries, 2);
        let names: Vec<&str> = report.records.iter().map(|r| r.source_name.as_str()).collect();
        assert!(!names.contains(&"b.log"));
    }

    #[tokio::test]
    async fn test_file_without_timestamps_contributes_nothing() {
        let store = Arc::new(
            FakeStore::new()
                .with_file("/logs/plain.log", "INFO [Main] no timestamps 42")
                .with_file("/logs/app.log", APP_LOG),
        );
        let report = pipeline(store)
            .run_report(&request(Some("/logs"), &[]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.records.len(), 4);
        assert_eq!(report.summary.files_read, 2);
        assert!(report.records.iter().all(|r| r.source_name == "app.log"));
    }

    #[tokio::test]
    async fn test_max_files_caps_work() {
        let store = Arc::new(
            FakeStore::new()
                .with_file("/logs/a.log", APP_LOG)
                .with_file("/logs/b.log", APP_LOG),
        );
        let pipeline = ExtractionPipeline::new(
            store.clone(),
            Arc::new(PatternCatalog::new().unwrap()),
            FetchOptions {
                max_files: Some(1),
                ..Default::default()
            },
        );
        let records = pipeline
            .run(&request(Some("/logs"), &[]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_no_records() {
        let store = Arc::new(
            FakeStore::new()
                .with_file("/logs/a.log", APP_LOG)
                .with_read_delay(Duration::from_secs(30)),
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = pipeline(store)
            .run(&request(Some("/logs"), &[]), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
    }

    #[tokio::test]
    async fn test_runs_are_idempotent_on_real_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("app.log"),
            "2024-01-01 10:00:00.1234 INFO [com.app.Main] one\n2024-01-01 10:00:01.5678 ERROR [com.app.Db] two\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "2024-01-01 10:00:00.1234 INFO").unwrap();
        let dir_str = dir.path().to_str().unwrap();

        let pipeline = pipeline(Arc::new(LocalStore::new()));
        let req = request(Some(dir_str), &[]);
        let first = pipeline.run(&req, &CancellationToken::new()).await.unwrap();
        let second = pipeline.run(&req, &CancellationToken::new()).await.unwrap();

        assert_eq!(first.len(), 8);
        assert_eq!(first, second);
        assert_eq!(first[5].value, "ERROR");
        assert_eq!(first[6].value, "[com.app.Db]");
    }

    #[tokio::test]
    async fn test_explicit_path_filter_on_real_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("keep.log"), APP_LOG).unwrap();
        std::fs::write(dir.path().join("drop.log"), APP_LOG).unwrap();
        let dir_str = dir.path().to_str().unwrap();
        let keep = dir.path().join("keep.log");
        let missing = dir.path().join("missing.log");

        let records = pipeline(Arc::new(LocalStore::new()))
            .run(
                &request(Some(dir_str), &[keep.to_str().unwrap(), missing.to_str().unwrap()]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.source_name == "keep.log"));
    }
}
