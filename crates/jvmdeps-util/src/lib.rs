//! Shared utilities for jvmdeps.
//!
//! This crate provides cross-cutting concerns used by all other jvmdeps crates:
//! the fatal error type, the collect-all result combinator, filesystem helpers,
//! content hashing, and progress reporting.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
