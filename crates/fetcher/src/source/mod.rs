//! Source module — deciding which files to read and reading them.

pub mod resolve;
pub mod load;

pub use load::{load_log_file, LogFile};
pub use resolve::{resolve, ResolvedSources, LOG_EXTENSION};
