//! Intelligence layer for sift
//!
//! Optional, best-effort operations layered on top of keyword search.
//! The search core works fully without anything in this crate configured.
//!
//! This crate provides:
//! - Enhancer trait for pluggable semantic providers
//! - EnhanceError for provider failures
//! - enhance_with_timeout for time-boxed invocation, with InFlightLimit
//!   capping the worker threads left running by abandoned calls
//! - MockEnhancer for tests
//!
//! # Usage
//!
//! ```ignore
//! use sift_intelligence::{enhance_with_timeout, EnhancementRequest, InFlightLimit};
//!
//! let limit = InFlightLimit::new(4);
//! let request = EnhancementRequest::new("rust", titles);
//! let enhancement = enhance_with_timeout(enhancer, request, timeout, &limit)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod enhance;
pub mod mock;

// Re-export commonly used types
pub use enhance::{
    enhance_with_timeout, is_permutation, EnhanceError, Enhancement, EnhancementRequest, Enhancer,
    InFlightLimit,
};
pub use mock::MockEnhancer;
