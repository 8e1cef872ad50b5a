use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Log directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to list directory {}: {source}", path.display())]
    ListFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Invalid pattern: {0}")]
    Pattern(String),
}

// Convenience type alias
pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::ConfigurationInvalid(_) => "CONFIGURATION_INVALID",
            FetchError::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            FetchError::ListFailure { .. } => "LIST_FAILURE",
            FetchError::ReadFailure { .. } => "READ_FAILURE",
            FetchError::Cancelled => "CANCELLED",
            FetchError::Pattern(_) => "PATTERN_ERROR",
        }
    }
}
