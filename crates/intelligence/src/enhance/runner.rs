//! Time-boxed enhancer invocation
//!
//! The enhancer runs on a detached worker thread. The caller waits at most
//! `timeout` for the answer; a late answer is dropped when the worker
//! finishes and finds the receiver gone.
//!
//! A worker abandoned on timeout keeps running until the provider returns.
//! `InFlightLimit` caps how many such workers may exist at once: each worker
//! holds a permit until it exits, and a call made while the limit is reached
//! fails fast with `EnhanceError::Unavailable` instead of spawning.

use super::{EnhanceError, Enhancement, EnhancementRequest, Enhancer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ============================================================================
// In-flight limit
// ============================================================================

/// Shared cap on running enhancer workers
///
/// Clones share the same counter.
#[derive(Debug, Clone)]
pub struct InFlightLimit {
    max: usize,
    running: Arc<AtomicUsize>,
}

impl InFlightLimit {
    /// Allow at most `max` workers at once (at least one)
    pub fn new(max: usize) -> Self {
        InFlightLimit {
            max: max.max(1),
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Configured maximum
    pub fn max(&self) -> usize {
        self.max
    }

    /// Workers currently running, including abandoned ones
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    fn try_acquire(&self) -> Option<Permit> {
        self.running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max).then_some(n + 1)
            })
            .ok()
            .map(|_| Permit {
                running: Arc::clone(&self.running),
            })
    }
}

/// Released when the worker holding it exits, on return or unwind
struct Permit {
    running: Arc<AtomicUsize>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Run all enhancer calls for `request`, waiting at most `timeout`.
///
/// A worker that panics or returns an error yields `Err`; so does a worker
/// that has not answered when the timeout elapses. When `limit` workers are
/// already running, no worker is started and `Unavailable` is returned.
pub fn enhance_with_timeout(
    enhancer: Arc<dyn Enhancer>,
    request: EnhancementRequest,
    timeout: Duration,
    limit: &InFlightLimit,
) -> Result<Enhancement, EnhanceError> {
    let permit = limit.try_acquire().ok_or_else(|| {
        EnhanceError::Unavailable(format!("{} enhancer workers still running", limit.max()))
    })?;
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("sift-enhance".to_string())
        .spawn(move || {
            let _permit = permit;
            let result = run_enhancer(enhancer.as_ref(), &request);
            // Receiver is gone when the caller already timed out.
            let _ = tx.send(result);
        })
        .map_err(|e| EnhanceError::Unavailable(e.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(EnhanceError::Timeout),
        Err(RecvTimeoutError::Disconnected) => Err(EnhanceError::Provider(
            "enhancer worker exited without answering".to_string(),
        )),
    }
}

fn run_enhancer(
    enhancer: &dyn Enhancer,
    request: &EnhancementRequest,
) -> Result<Enhancement, EnhanceError> {
    let insights = enhancer.analyze(&request.query, &request.candidate_titles)?;
    let suggestions = enhancer.suggest(&request.query)?;
    let order = enhancer.rerank(&request.query, &request.candidate_titles)?;

    tracing::debug!(
        target: "sift::intelligence",
        enhancer = enhancer.name(),
        suggestions = suggestions.len(),
        reordered = order.is_some(),
        "Enhancement completed"
    );

    Ok(Enhancement {
        insights,
        suggestions,
        order,
    })
}
