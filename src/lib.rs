//! Index Rewriter - Ordered, regex-driven in-place rewriting of a single file
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Rules are declarative data, applied strictly in order, each to the previous output
//! - Files are read whole and replaced atomically, never patched in place
//! - Every run reports per-rule match counts, so rules that stopped matching are visible
//!
//! Rewrites mutate files without locking. Concurrent runs against the same path
//! race with each other and must be serialized by the caller.

pub mod config;
pub mod domain;
pub mod patterns;
pub mod report;
pub mod rewriter;

// Re-export main types for convenient access
pub use domain::rewrite::{
    Document, RewriteError, RewriteReport, RewriteResult, RewriteSummary, RuleKind, RuleOutcome,
};

pub use config::{ConfigBuilder, RewriteConfig, RewriteRule};

pub use patterns::RuleEngine;

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use rewriter::storage::{load, save};
pub use rewriter::{RewriteOptions, Rewriter};

use std::path::Path;

/// Apply `rules` to `document` in declared order
pub fn apply(
    document: Document,
    rules: &[RewriteRule],
) -> RewriteResult<(Document, Vec<RuleOutcome>)> {
    let engine = RuleEngine::from_rules(rules)?;
    Ok(engine.apply(document))
}

/// Load `path`, apply `rules` in order and save the result back
pub fn run<P: AsRef<Path>>(path: P, rules: &[RewriteRule]) -> RewriteResult<RewriteReport> {
    let config = ConfigBuilder::new()
        .target(path.as_ref())
        .add_rules(rules.iter().cloned())
        .build()?;

    Rewriter::new(config)?.run_target(&RewriteOptions::default())
}
