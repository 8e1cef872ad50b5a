//! Extract — split one file's text into entries and pull fields from each.
//!
//! Every Timestamp match anchors an entry. The remaining requested kinds
//! are searched in the window running from that timestamp's first byte to
//! the end of the file, so a field can be found past the next entry's
//! timestamp when its own entry lacks it.

use std::sync::Arc;

use crate::model::{FieldKind, FieldRecord};
use crate::pattern::PatternCatalog;

pub struct FieldExtractor {
    catalog: Arc<PatternCatalog>,
    /// Requested kinds other than the anchor, in request order.
    fields: Vec<FieldKind>,
}

impl FieldExtractor {
    pub fn new(catalog: Arc<PatternCatalog>, requested: &[FieldKind]) -> Self {
        let fields = requested
            .iter()
            .copied()
            .filter(|kind| *kind != FieldKind::Timestamp)
            .collect();
        Self { catalog, fields }
    }

    /// Records produced per entry.
    pub fn kinds_per_entry(&self) -> usize {
        1 + self.fields.len()
    }

    /// Extract records for every entry in `content`.
    ///
    /// Output is grouped by entry index ascending; within an entry the
    /// Timestamp record comes first, then the other kinds in request order.
    pub fn extract(&self, content: &str, source_name: &str) -> Vec<FieldRecord> {
        let anchors = self.catalog.all(FieldKind::Timestamp, content);
        let mut records = Vec::with_capacity(anchors.len() * self.kinds_per_entry());

        for (entry_index, anchor) in anchors.into_iter().enumerate() {
            let timestamp = content.get(anchor.clone()).unwrap_or_default();
            records.push(FieldRecord {
                kind: FieldKind::Timestamp,
                value: timestamp.to_string(),
                source_name: source_name.to_string(),
                entry_index,
            });

            let window = content.get(anchor.start..).unwrap_or_default();
            for &kind in &self.fields {
                let value = self
                    .catalog
                    .first(kind, window)
                    .and_then(|span| window.get(span))
                    .unwrap_or_default();
                records.push(FieldRecord {
                    kind,
                    value: value.to_string(),
                    source_name: source_name.to_string(),
                    entry_index,
                });
            }
        }

        records
    }
}
