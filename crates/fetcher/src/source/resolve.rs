//! Resolve — turn a [`FetchRequest`] into the ordered list of files to read.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures_util::stream::{self, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::LogStore;
use crate::error::{FetchError, FetchResult};
use crate::model::FetchRequest;
use crate::source::load::{load_log_file, LogFile};

/// Only files whose name ends with this literal are considered.
pub const LOG_EXTENSION: &str = ".log";

/// Files chosen for one fetch, in resolver order.
///
/// Holds paths only. [`ResolvedSources::files`] can be called any number of
/// times, each call yielding a fresh finite stream over the same paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSources {
    paths: Vec<PathBuf>,
}

impl ResolvedSources {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Keep only the first `max` files.
    pub fn limit(mut self, max: usize) -> Self {
        self.paths.truncate(max);
        self
    }

    /// Lazily load every file in resolver order.
    ///
    /// Up to `concurrency` reads run at once; items are still yielded in
    /// resolver order. Once `cancel` fires, pending loads resolve to
    /// [`FetchError::Cancelled`].
    pub fn files<'a>(
        &'a self,
        store: &'a dyn LogStore,
        cancel: &'a CancellationToken,
        concurrency: usize,
    ) -> impl Stream<Item = FetchResult<LogFile>> + Send + 'a {
        stream::iter(self.paths.iter())
            .map(move |path| load_log_file(store, path, cancel))
            .buffered(concurrency.max(1))
    }
}

/// Resolve the files named by `request`.
///
/// Fails with [`FetchError::ConfigurationInvalid`] before touching the store
/// when neither a directory nor explicit paths are given.
pub fn resolve(store: &dyn LogStore, request: &FetchRequest) -> FetchResult<ResolvedSources> {
    let explicit: Vec<PathBuf> = request
        .explicit_file_paths
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .collect();

    let Some(dir) = request.directory() else {
        if explicit.is_empty() {
            return Err(FetchError::ConfigurationInvalid(
                "either directoryPath or explicitFilePaths must be provided".to_string(),
            ));
        }
        return Ok(ResolvedSources::new(resolve_explicit(store, explicit)));
    };

    let dir = Path::new(dir);
    if !store.is_dir(dir) {
        return Err(FetchError::SourceNotFound(dir.to_path_buf()));
    }

    let candidates = store
        .list_files(dir)
        .map_err(|source| FetchError::ListFailure {
            path: dir.to_path_buf(),
            source,
        })?
        .into_iter()
        .filter(|path| has_log_extension(path));

    // Any explicit entry, blank or not, turns the scan into an intersection.
    let paths: Vec<PathBuf> = if request.explicit_file_paths.is_empty() {
        candidates.collect()
    } else {
        let wanted: HashSet<&Path> = explicit.iter().map(PathBuf::as_path).collect();
        candidates
            .filter(|path| wanted.contains(path.as_path()))
            .collect()
    };

    debug!(dir = %dir.display(), files = paths.len(), "Resolved log directory");
    Ok(ResolvedSources::new(paths))
}

/// No directory: the explicit paths are the candidates, in the given order.
fn resolve_explicit(store: &dyn LogStore, explicit: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    explicit
        .into_iter()
        .filter(|path| has_log_extension(path) && store.is_file(path))
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn has_log_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(LOG_EXTENSION))
}
