//! Ordering of validated uploads.
//!
//! The order list is a permutation of the item keys by construction at the
//! API boundary; this module applies it without re-validating, sorting or
//! deduplicating.

use std::collections::HashMap;

/// Return items in the given order.
///
/// Names absent from the map are skipped; the boundary that stores an order
/// guarantees they do not occur.
pub fn sequence_items<'a, T>(
    items: &'a HashMap<String, T>,
    order: &'a [String],
) -> Vec<(&'a str, &'a T)> {
    order
        .iter()
        .filter_map(|name| items.get(name).map(|item| (name.as_str(), item)))
        .collect()
}
