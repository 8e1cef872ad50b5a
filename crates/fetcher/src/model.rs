//! Model — request payload, field kinds, and extracted records.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, FetchResult};

/// The closed set of fields that can be pulled out of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Entry anchor. Older clients call this `Date`.
    #[serde(alias = "Date")]
    Timestamp,
    LogLevel,
    ClassName,
    ThreadId,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Timestamp,
        FieldKind::LogLevel,
        FieldKind::ClassName,
        FieldKind::ThreadId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Timestamp => "Timestamp",
            FieldKind::LogLevel => "LogLevel",
            FieldKind::ClassName => "ClassName",
            FieldKind::ThreadId => "ThreadId",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for a fetch: where to look and which fields to pull.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchRequest {
    /// Directory scanned (non-recursively) for `.log` files.
    pub directory_path: Option<String>,
    /// When non-empty, only these paths are kept from the scan.
    #[serde(alias = "filePaths")]
    pub explicit_file_paths: Vec<String>,
    #[serde(alias = "regexFormats")]
    pub requested_field_kinds: Vec<FieldKind>,
}

impl FetchRequest {
    /// The configured directory, or `None` when missing or blank.
    pub fn directory(&self) -> Option<&str> {
        self.directory_path
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
    }

    /// Requested kinds must be non-empty and free of duplicates.
    pub fn validate_kinds(&self) -> FetchResult<()> {
        if self.requested_field_kinds.is_empty() {
            return Err(FetchError::ConfigurationInvalid(
                "requestedFieldKinds must name at least one field kind".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for kind in &self.requested_field_kinds {
            if !seen.insert(*kind) {
                return Err(FetchError::ConfigurationInvalid(format!(
                    "requestedFieldKinds lists {} more than once",
                    kind
                )));
            }
        }

        Ok(())
    }
}

/// One extracted field of one log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub kind: FieldKind,
    /// Matched text, empty when nothing matched inside the entry's window.
    pub value: String,
    /// Base file name of the source.
    pub source_name: String,
    /// Zero-based entry position within the source file.
    pub entry_index: usize,
}
