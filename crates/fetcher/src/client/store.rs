//! Store trait — abstract interface for the filesystem operations the
//! resolver and loader need.
//!
//! `live.rs` provides the real implementation.
//! `fake.rs` provides a test double.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// Boxed future returned by async store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read-only view of the place log files live.
///
/// Implementations must be `Send + Sync` so they can be shared behind `Arc`.
pub trait LogStore: Send + Sync {
    /// Whether `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir`, in enumeration order.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whole-file read.
    fn read<'a>(&'a self, path: &'a Path) -> StoreFuture<'a, io::Result<Vec<u8>>>;
}
