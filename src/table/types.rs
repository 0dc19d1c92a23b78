use crate::item::Item;
use crate::transport::AttributeMap;

/// Merged result of a query or scan call: one page, or every page when the
/// builder was set to load all.
///
/// Across pages and segments, counts and consumed capacity sum and items
/// concatenate; the cursor is the last one seen, meaningful only for
/// non-exhaustive single-builder use.
#[must_use = "query results should be used or the fetched data is lost"]
#[derive(Debug, Clone, Default)]
pub struct OutputItems {
    /// Materialized entities.
    pub items: Vec<Item>,
    /// Total item count reported by the store.
    pub count: i32,
    /// Total items examined before filtering.
    pub scanned_count: i32,
    /// Summed capacity units, when the store reported any.
    pub consumed_capacity: Option<f64>,
    /// Continuation cursor of the last page seen; present when more
    /// results exist.
    pub last_evaluated_key: Option<AttributeMap>,
}

impl OutputItems {
    /// Whether a continuation cursor was returned, i.e. more results exist
    /// beyond this output.
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}
