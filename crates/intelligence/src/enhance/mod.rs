//! Result enhancement for search responses
//!
//! This module provides the `Enhancer` trait for an external semantic
//! provider that can suggest queries, summarize a result page, and propose a
//! new order for it. Enhancement is strictly best-effort: it runs after the
//! base response is complete, inside a time box, and anything it returns is
//! merged only if it arrives in time.
//!
//! # Architecture
//!
//! ```text
//! base pipeline → page of results
//!     → enhance_with_timeout (worker thread, bounded wait, capped workers)
//!         → suggest + analyze + rerank
//!     → merge if Ok, drop otherwise
//! ```

pub mod error;
pub mod runner;

pub use error::EnhanceError;
pub use runner::{enhance_with_timeout, InFlightLimit};

use sift_core::AiInsights;

/// Input handed to an enhancer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementRequest {
    /// Original query text
    pub query: String,
    /// Titles of the returned page, in rank order
    pub candidate_titles: Vec<String>,
}

impl EnhancementRequest {
    /// Create a request
    pub fn new(query: impl Into<String>, candidate_titles: Vec<String>) -> Self {
        EnhancementRequest {
            query: query.into(),
            candidate_titles,
        }
    }
}

/// Everything an enhancer produced for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enhancement {
    /// Summary and related topics
    pub insights: AiInsights,
    /// Extra query suggestions
    pub suggestions: Vec<String>,
    /// Proposed order of the page as indices into `candidate_titles`
    pub order: Option<Vec<usize>>,
}

/// Trait for external enhancement providers.
///
/// The trait is object-safe for use as `Arc<dyn Enhancer>`. Implementations
/// may block (network calls); the caller bounds them with a timeout.
pub trait Enhancer: Send + Sync {
    /// Suggest related queries for `text`.
    fn suggest(&self, text: &str) -> Result<Vec<String>, EnhanceError>;

    /// Summarize a result page.
    fn analyze(&self, query: &str, candidate_titles: &[String]) -> Result<AiInsights, EnhanceError>;

    /// Propose a new order for the page.
    ///
    /// Returns indices into `candidate_titles`. `None` keeps the order.
    fn rerank(
        &self,
        _query: &str,
        _candidate_titles: &[String],
    ) -> Result<Option<Vec<usize>>, EnhanceError> {
        Ok(None)
    }

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Check that `order` is a permutation of `0..len`
///
/// Proposed orders that fail this check are ignored.
pub fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in order {
        if i >= len || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}
