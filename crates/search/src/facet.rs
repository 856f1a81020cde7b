//! Facet aggregation
//!
//! Facets are counted over whatever item set the caller passes in. The
//! engine passes the filtered candidates before pagination, so facet counts
//! describe the whole result set and not just the current page.

use sift_core::{FacetField, FacetValue, SearchableItem};
use std::collections::{BTreeMap, HashMap};

/// Count field values across `items`
///
/// Each requested field gets a list ordered by count descending, then value
/// ascending. Items without a category do not contribute to the category
/// facet. The tag facet is cut to the `max_tag_values` most frequent tags.
pub fn aggregate<'a, I>(
    items: I,
    fields: &[FacetField],
    max_tag_values: usize,
) -> BTreeMap<FacetField, Vec<FacetValue>>
where
    I: IntoIterator<Item = &'a SearchableItem>,
{
    let mut counts: BTreeMap<FacetField, HashMap<&'a str, usize>> =
        fields.iter().map(|f| (*f, HashMap::new())).collect();

    for item in items {
        for (field, values) in counts.iter_mut() {
            match field {
                FacetField::Type => {
                    *values.entry(item.item_type.as_str()).or_insert(0) += 1;
                }
                FacetField::Category => {
                    if let Some(category) = &item.category {
                        *values.entry(category.as_str()).or_insert(0) += 1;
                    }
                }
                FacetField::Tags => {
                    for tag in &item.tags {
                        *values.entry(tag.as_str()).or_insert(0) += 1;
                    }
                }
            }
        }
    }

    counts
        .into_iter()
        .map(|(field, values)| {
            let mut list: Vec<FacetValue> = values
                .into_iter()
                .map(|(value, count)| FacetValue::new(value, count))
                .collect();
            list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            if field == FacetField::Tags {
                list.truncate(max_tag_values);
            }
            (field, list)
        })
        .collect()
}
