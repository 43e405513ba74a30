//! Domain layer for the index rewriter
//!
//! CDD Principle: Domain Model - Pure logic for ordered, rule-based text rewriting
//! - Contains the document, per-rule outcomes and the run report
//! - Independent of file systems, terminals and configuration formats

pub mod rewrite;

// Re-export main domain types for convenience
pub use rewrite::*;
