//! Error types for enhancement

use std::fmt;

/// Errors an enhancer can report
///
/// None of these ever reach a search caller: the coordinator logs them and
/// returns the base response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhanceError {
    /// Transport failed (network unreachable, connection refused, etc.)
    Network(String),
    /// Provider answered with something that could not be interpreted
    Parse(String),
    /// No answer within the time box
    Timeout,
    /// Provider reported an error
    Provider(String),
    /// Enhancement could not be started
    Unavailable(String),
}

impl fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhanceError::Network(msg) => write!(f, "network error: {}", msg),
            EnhanceError::Parse(msg) => write!(f, "parse error: {}", msg),
            EnhanceError::Timeout => write!(f, "enhancement timed out"),
            EnhanceError::Provider(msg) => write!(f, "provider error: {}", msg),
            EnhanceError::Unavailable(msg) => write!(f, "enhancer unavailable: {}", msg),
        }
    }
}

impl std::error::Error for EnhanceError {}
