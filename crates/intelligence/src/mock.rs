//! Mock enhancer for deterministic testing

use crate::enhance::{EnhanceError, Enhancer};
use sift_core::AiInsights;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Answer,
    Fail,
    Panic,
}

/// Mock enhancer with hand-crafted answers.
///
/// Can be configured to fail, panic, answer slowly, or reverse the page,
/// enabling tests of the best-effort enhancement path without a provider.
#[derive(Debug)]
pub struct MockEnhancer {
    behavior: Behavior,
    delay: Option<Duration>,
    reverse: bool,
    calls: AtomicUsize,
}

impl Default for MockEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnhancer {
    /// An enhancer that answers immediately
    pub fn new() -> Self {
        MockEnhancer {
            behavior: Behavior::Answer,
            delay: None,
            reverse: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// An enhancer whose every call returns `EnhanceError::Provider`
    pub fn failing() -> Self {
        MockEnhancer {
            behavior: Behavior::Fail,
            ..Self::new()
        }
    }

    /// An enhancer that panics inside `analyze`
    pub fn panicking() -> Self {
        MockEnhancer {
            behavior: Behavior::Panic,
            ..Self::new()
        }
    }

    /// Builder: sleep before answering `analyze`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Builder: propose the reverse of the page order
    pub fn reversing(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Number of `analyze` calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), EnhanceError> {
        match self.behavior {
            Behavior::Answer => Ok(()),
            Behavior::Fail => Err(EnhanceError::Provider("mock failure".to_string())),
            Behavior::Panic => panic!("mock enhancer panicked"),
        }
    }
}

impl Enhancer for MockEnhancer {
    fn suggest(&self, text: &str) -> Result<Vec<String>, EnhanceError> {
        self.check()?;
        Ok(vec![format!("{} tutorial", text), format!("{} examples", text)])
    }

    fn analyze(&self, query: &str, candidate_titles: &[String]) -> Result<AiInsights, EnhanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.check()?;
        Ok(AiInsights {
            summary: format!("{} results about {}", candidate_titles.len(), query),
            related_topics: vec![format!("{} basics", query)],
            recommendations: candidate_titles.iter().take(1).cloned().collect(),
        })
    }

    fn rerank(
        &self,
        _query: &str,
        candidate_titles: &[String],
    ) -> Result<Option<Vec<usize>>, EnhanceError> {
        self.check()?;
        if self.reverse {
            Ok(Some((0..candidate_titles.len()).rev().collect()))
        } else {
            Ok(None)
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
