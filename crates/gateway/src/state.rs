use std::sync::Arc;

use anyhow::Context;
use fetcher::client::{LocalStore, LogStore};
use fetcher::pattern::PatternCatalog;
use fetcher::ExtractionPipeline;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::GatewayConfig;
use crate::metrics::FetchMetrics;

/// Shared application state (thread-safe)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub pipeline: ExtractionPipeline,
    pub metrics: FetchMetrics,
    /// Cancelled on shutdown. Each fetch runs under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// State reading from the local filesystem
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        Self::with_store(config, Arc::new(LocalStore::new()))
    }

    pub fn with_store(config: GatewayConfig, store: Arc<dyn LogStore>) -> anyhow::Result<Self> {
        let catalog = PatternCatalog::new().context("Failed to compile field patterns")?;
        let pipeline = ExtractionPipeline::new(store, Arc::new(catalog), config.fetch.clone());

        info!(
            read_concurrency = config.fetch.read_concurrency,
            max_files = ?config.fetch.max_files,
            "✓ Extraction pipeline ready"
        );

        Ok(Self {
            config: Arc::new(config),
            pipeline,
            metrics: FetchMetrics::new(),
            shutdown: CancellationToken::new(),
        })
    }
}
