//! Load — whole-file reads into [`LogFile`]s.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::client::LogStore;
use crate::error::{FetchError, FetchResult};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A log file held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    /// Base file name, used as the record source name.
    pub name: String,
    pub content: String,
}

/// Read `path` through `store`, giving up as soon as `cancel` fires.
pub async fn load_log_file(
    store: &dyn LogStore,
    path: &Path,
    cancel: &CancellationToken,
) -> FetchResult<LogFile> {
    let bytes = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        read = store.read(path) => read.map_err(|source| FetchError::ReadFailure {
            path: path.to_path_buf(),
            source,
        })?,
    };

    Ok(LogFile {
        path: path.to_path_buf(),
        name: display_name(path),
        content: decode(bytes),
    })
}

/// Base file name of `path`, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// UTF-8 with lossy replacement; a leading byte-order mark is dropped.
fn decode(mut bytes: Vec<u8>) -> String {
    if bytes.starts_with(&UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
