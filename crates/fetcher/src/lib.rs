// Module structure for the log field fetcher.

// Core infrastructure
pub mod client;
pub mod conf;
pub mod error;
pub mod model;
pub mod pattern;

// Pipeline stages
pub mod source;
pub mod extract;
pub mod pipeline;

pub use conf::FetchOptions;
pub use error::{FetchError, FetchResult};
pub use model::{FetchRequest, FieldKind, FieldRecord};
pub use pipeline::{ExtractionPipeline, FetchReport, FetchSummary};
