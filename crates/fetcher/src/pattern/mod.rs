//! Pattern module — the fixed rule set used to recognise log fields.

pub mod catalog;

pub use catalog::{PatternCatalog, Rules};
