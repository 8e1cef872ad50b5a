//! Live — [`LogStore`] backed by the local filesystem.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::client::store::{LogStore, StoreFuture};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }
}

impl LogStore for LocalStore {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            // Follow symlinks so a linked log file still counts as a file.
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn read<'a>(&'a self, path: &'a Path) -> StoreFuture<'a, io::Result<Vec<u8>>> {
        Box::pin(tokio::fs::read(path))
    }
}
