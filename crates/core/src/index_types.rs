//! Index build reporting types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item the indexer refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedItem {
    /// Position in the submitted batch
    pub position: usize,
    /// The item's id as submitted (may be empty)
    pub id: String,
    /// Why it was rejected
    pub reason: String,
}

/// Outcome of an indexing call
///
/// Rejections are warnings: every other item was indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Items now searchable
    pub indexed: usize,
    /// Items skipped
    pub rejected: Vec<RejectedItem>,
}

impl IndexReport {
    /// True if nothing was rejected
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Ids of the rejected items
    pub fn rejected_ids(&self) -> Vec<&str> {
        self.rejected.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Summary of the live index generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Generation number (increments on every rebuild)
    pub generation: u64,
    /// Indexed items
    pub items: usize,
    /// Distinct tokens in the inverted index
    pub terms: usize,
    /// Distinct n-grams in the fuzzy index
    pub ngrams: usize,
    /// When the generation was built
    pub last_updated: DateTime<Utc>,
}
