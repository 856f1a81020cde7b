//! Structured filters over item metadata
//!
//! All populated filter fields are AND-combined. A field that is absent or
//! empty places no constraint. There is no OR/NOT composition across fields.

use sift_core::{Filters, SearchableItem};

/// Check one item against the filters
pub fn matches(item: &SearchableItem, filters: &Filters) -> bool {
    if let Some(types) = filters.types.as_ref().filter(|t| !t.is_empty()) {
        if !types.contains(&item.item_type) {
            return false;
        }
    }

    if let Some(categories) = filters.categories.as_ref().filter(|c| !c.is_empty()) {
        match &item.category {
            Some(category) if categories.contains(category) => {}
            _ => return false,
        }
    }

    if let Some(tags) = filters.tags.as_ref().filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| item.tags.contains(t)) {
            return false;
        }
    }

    if let Some(range) = &filters.date_range {
        if !range.contains(&item.last_modified) {
            return false;
        }
    }

    true
}

/// Items satisfying every filter, in input order
///
/// The input is not modified.
pub fn apply<'a, I>(items: I, filters: &Filters) -> Vec<&'a SearchableItem>
where
    I: IntoIterator<Item = &'a SearchableItem>,
{
    items
        .into_iter()
        .filter(|item| matches(item, filters))
        .collect()
}
