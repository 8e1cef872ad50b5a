//! Fake — test double for filesystem access.
//!
//! Provides a deterministic [`FakeStore`] that implements [`LogStore`]
//! using in-memory state. Every call is counted so tests can assert that
//! a code path never touched the store.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::client::store::{LogStore, StoreFuture};

/// A canned file for the fake store.
#[derive(Clone, Debug)]
struct FakeFile {
    path: PathBuf,
    content: Vec<u8>,
}

/// An in-memory store for deterministic testing.
///
/// Files are listed in insertion order. Builder methods pre-populate the
/// store before it is handed to the code under test.
#[derive(Default)]
pub struct FakeStore {
    dirs: HashSet<PathBuf>,
    files: Vec<FakeFile>,
    unreadable: HashSet<PathBuf>,
    read_delay: Option<Duration>,
    file_delays: HashMap<PathBuf, Duration>,
    list_delay: Option<Duration>,
    calls: AtomicUsize,
    reads: AtomicUsize,
    completed: Mutex<Vec<PathBuf>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an (empty) directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.insert(dir.into());
        self
    }

    /// Register a file; its parent directory is registered too.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
        self.files.push(FakeFile {
            path,
            content: content.into(),
        });
        self
    }

    /// Register a file that is listed but fails every read.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.unreadable.insert(path.clone());
        self.with_file(path, Vec::new())
    }

    /// Delay every read, for exercising cancellation.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Delay reads of one file, overriding [`with_read_delay`](Self::with_read_delay).
    pub fn with_file_delay(mut self, path: impl Into<PathBuf>, delay: Duration) -> Self {
        self.file_delays.insert(path.into(), delay);
        self
    }

    /// Block the calling thread for `delay` on every listing, like a slow mount.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Total number of store calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of reads that completed (successfully or not).
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Paths in the order their reads finished.
    pub async fn completion_order(&self) -> Vec<PathBuf> {
        self.completed.lock().await.clone()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn file(&self, path: &Path) -> Option<&FakeFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

impl LogStore for FakeStore {
    fn is_dir(&self, path: &Path) -> bool {
        self.touch();
        self.dirs.contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.touch();
        self.file(path).is_some()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.touch();
        if let Some(delay) = self.list_delay {
            std::thread::sleep(delay);
        }
        if !self.dirs.contains(dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        Ok(self
            .files
            .iter()
            .filter(|f| f.path.parent() == Some(dir))
            .map(|f| f.path.clone())
            .collect())
    }

    fn read<'a>(&'a self, path: &'a Path) -> StoreFuture<'a, io::Result<Vec<u8>>> {
        self.touch();
        Box::pin(async move {
            if let Some(delay) = self.file_delays.get(path).copied().or(self.read_delay) {
                tokio::time::sleep(delay).await;
            }
            self.reads.fetch_add(1, Ordering::Relaxed);
            self.completed.lock().await.push(path.to_path_buf());

            if self.unreadable.contains(path) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
            }
            self.file(path)
                .map(|f| f.content.clone())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        })
    }
}
