//! Conf — tuning knobs for the extraction pipeline.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// How many file reads may be in flight at once. Output order is
    /// unaffected.
    pub read_concurrency: usize,
    /// Stop after this many resolved files.
    pub max_files: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            read_concurrency: 4,
            max_files: None,
        }
    }
}

impl FetchOptions {
    /// Validate option values
    pub fn validate(&self) -> Result<(), String> {
        if self.read_concurrency == 0 {
            return Err("fetch.read_concurrency must be > 0".to_string());
        }
        if self.max_files == Some(0) {
            return Err("fetch.max_files must be > 0 when set".to_string());
        }
        Ok(())
    }
}
