//! Core search types
//!
//! This module defines the request/response contract of the search core:
//! - Query: free text plus filters, sort, pagination and facet selection
//! - Filters: AND-combined structured constraints on item metadata
//! - SearchResult: one ranked item with highlights and snippet
//! - SearchResponse: a page of results plus totals, facets and suggestions
//!
//! `Query` serializes with a fixed field order and only ordered collections,
//! which makes its JSON form usable as a canonical cache key.

use crate::item::{ItemType, SearchableItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Filters
// ============================================================================

/// Inclusive bounds on `SearchableItem::last_modified`
///
/// A missing bound is open on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest accepted timestamp (inclusive)
    pub start: Option<DateTime<Utc>>,
    /// Latest accepted timestamp (inclusive)
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Create a closed range
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Check whether a timestamp falls within the range
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| *ts >= s) && self.end.map_or(true, |e| *ts <= e)
    }
}

/// Structured constraints applied to candidates
///
/// Every populated field must hold (AND). A field that is `None` or empty
/// places no constraint on the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Accept only these item types
    pub types: Option<Vec<ItemType>>,
    /// Accept only these categories
    pub categories: Option<Vec<String>>,
    /// Accept items carrying at least one of these tags
    pub tags: Option<Vec<String>>,
    /// Accept items modified inside this range
    pub date_range: Option<DateRange>,
}

impl Filters {
    /// Builder: restrict item types
    pub fn with_types(mut self, types: Vec<ItemType>) -> Self {
        self.types = Some(types);
        self
    }

    /// Builder: restrict categories
    pub fn with_categories<S: Into<String>>(mut self, categories: Vec<S>) -> Self {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: require any of these tags
    pub fn with_tags<S: Into<String>>(mut self, tags: Vec<S>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: restrict modification time
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// True when no field constrains anything
    pub fn is_empty(&self) -> bool {
        self.types.as_ref().map_or(true, Vec::is_empty)
            && self.categories.as_ref().map_or(true, Vec::is_empty)
            && self.tags.as_ref().map_or(true, Vec::is_empty)
            && self.date_range.is_none()
    }

    /// Equivalent filters in canonical form
    ///
    /// Lists are sorted and deduplicated, and constraints that constrain
    /// nothing (empty lists, open date ranges) become `None`. Two filter sets
    /// that select the same items for the same reason compare equal.
    pub fn canonical(&self) -> Filters {
        Filters {
            types: canonical_list(&self.types),
            categories: canonical_list(&self.categories),
            tags: canonical_list(&self.tags),
            date_range: self
                .date_range
                .filter(|r| r.start.is_some() || r.end.is_some()),
        }
    }
}

fn canonical_list<T: Ord + Clone>(list: &Option<Vec<T>>) -> Option<Vec<T>> {
    let mut list = list.clone().filter(|l| !l.is_empty())?;
    list.sort();
    list.dedup();
    Some(list)
}

// ============================================================================
// Sort / Pagination / Facets
// ============================================================================

/// Field results are ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Relevance score (default)
    #[default]
    Relevance,
    /// `last_modified`
    Date,
    /// Title, case-insensitive
    Title,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending (default)
    #[default]
    Desc,
}

/// Ordering applied after scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Sort key
    pub by: SortBy,
    /// Sort direction
    pub direction: SortDirection,
}

impl Sort {
    /// Create a sort specification
    pub fn new(by: SortBy, direction: SortDirection) -> Self {
        Sort { by, direction }
    }
}

/// Window over the ranked results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of ranked results to skip
    pub offset: usize,
    /// Maximum results to return
    pub limit: usize,
}

impl Pagination {
    /// Create a pagination window
    pub fn new(offset: usize, limit: usize) -> Self {
        Pagination { offset, limit }
    }
}

/// Fields facets can be computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetField {
    /// `item_type`
    Type,
    /// `category`
    Category,
    /// `tags` (top-N by frequency)
    Tags,
}

impl FacetField {
    /// All facet fields
    pub fn all() -> Vec<FacetField> {
        vec![FacetField::Type, FacetField::Category, FacetField::Tags]
    }
}

/// One value/count pair of a facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    /// Field value
    pub value: String,
    /// Number of items carrying it
    pub count: usize,
}

impl FacetValue {
    /// Create a facet value
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        FacetValue {
            value: value.into(),
            count,
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// A search request
///
/// # Examples
///
/// ```
/// use sift_core::{Filters, ItemType, Pagination, Query};
///
/// let query = Query::new("rust search")
///     .with_filters(Filters::default().with_types(vec![ItemType::Project]))
///     .with_pagination(Pagination::new(0, 5));
///
/// assert_eq!(query.text, "rust search");
/// assert_eq!(query.pagination.unwrap().limit, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Free text
    pub text: String,
    /// Structured constraints
    pub filters: Filters,
    /// Ordering (relevance when absent)
    pub sort: Option<Sort>,
    /// Result window (configured default limit when absent)
    pub pagination: Option<Pagination>,
    /// Facets to compute (all when absent)
    pub facet_fields: Option<Vec<FacetField>>,
}

impl Query {
    /// Create a query with no filters
    pub fn new(text: impl Into<String>) -> Self {
        Query {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Builder: set filters
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Builder: set sort order
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Builder: set pagination
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Builder: set facet fields
    pub fn with_facets(mut self, fields: Vec<FacetField>) -> Self {
        self.facet_fields = Some(fields);
        self
    }

    /// Equivalent query in canonical form
    ///
    /// Filters go through `Filters::canonical` and facet fields are sorted
    /// and deduplicated. The text is kept verbatim since it is echoed back
    /// in the response.
    pub fn canonical(&self) -> Query {
        Query {
            text: self.text.clone(),
            filters: self.filters.canonical(),
            sort: self.sort,
            pagination: self.pagination,
            facet_fields: self.facet_fields.clone().map(|mut fields| {
                fields.sort();
                fields.dedup();
                fields
            }),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Item field a query term was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    /// `title`
    Title,
    /// `description`
    Description,
    /// `content`
    Content,
    /// `tags`
    Tags,
    /// `category`
    Category,
}

/// A single ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched item
    pub item: SearchableItem,
    /// Relevance score (always > 0)
    pub score: f64,
    /// Distinct query terms found as whole words
    pub highlights: Vec<String>,
    /// Fields containing at least one query term
    pub matched_fields: Vec<MatchedField>,
    /// Best-matching sentence, possibly truncated
    pub snippet: String,
}

/// Insight produced by an external enhancer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiInsights {
    /// Short summary of the result set
    pub summary: String,
    /// Topics related to the query
    pub related_topics: Vec<String>,
    /// Follow-up recommendations
    pub recommendations: Vec<String>,
}

/// Response to a search
///
/// `total` counts every filtered and scored candidate; `results` holds only
/// the requested page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The requested page of results
    pub results: Vec<SearchResult>,
    /// Number of results before pagination
    pub total: usize,
    /// Original query text
    pub query: String,
    /// Wall time spent (microseconds)
    pub processing_time_micros: u64,
    /// Query suggestions
    pub suggestions: Vec<String>,
    /// Facet breakdowns over the filtered candidates
    pub facets: BTreeMap<FacetField, Vec<FacetValue>>,
    /// Enhancer output, when one was configured and answered in time
    pub ai_insights: Option<AiInsights>,
}

impl SearchResponse {
    /// An empty response for `query`
    ///
    /// Returned for empty queries and whenever the pipeline fails.
    pub fn empty(query: impl Into<String>) -> Self {
        SearchResponse {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Builder: set processing time
    pub fn with_processing_time(mut self, micros: u64) -> Self {
        self.processing_time_micros = micros;
        self
    }
}
