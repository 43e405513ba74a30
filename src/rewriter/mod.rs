//! Rewrite orchestration: load, apply, save
//!
//! CDD Principle: Domain Services - The Rewriter coordinates one complete rewrite
//! - Loads the whole document, applies every rule in order, saves the result atomically
//! - Reports per-rule outcomes so rules that silently stopped matching are visible
//! - Holds no state between runs; each run starts from what is on disk

pub mod storage;

use crate::config::RewriteConfig;
use crate::domain::{Document, RewriteError, RewriteReport, RewriteResult, RuleOutcome};
use crate::patterns::RuleEngine;
use std::path::Path;
use std::time::Instant;

/// Options for customizing a rewrite run
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// Compute the report without saving
    pub dry_run: bool,
    /// Fail before writing if any rule matched nothing
    pub fail_on_unmatched: bool,
}

/// Applies a validated rule set to files
pub struct Rewriter {
    /// Configuration the engine was built from
    config: RewriteConfig,
    /// Compiled rules in application order
    engine: RuleEngine,
    /// Fingerprint recorded in every report
    fingerprint: String,
}

impl Rewriter {
    /// Create a rewriter, validating and compiling the configured rules
    pub fn new(config: RewriteConfig) -> RewriteResult<Self> {
        config.validate()?;
        let engine = RuleEngine::from_rules(&config.rules)?;
        let fingerprint = config.fingerprint();

        tracing::debug!(
            "Rewriter ready with {} enabled rule(s), fingerprint {}",
            engine.len(),
            fingerprint
        );

        Ok(Self { config, engine, fingerprint })
    }

    /// Create a rewriter with the built-in rules
    pub fn with_defaults() -> RewriteResult<Self> {
        Self::new(RewriteConfig::default())
    }

    /// Create a rewriter loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> RewriteResult<Self> {
        Self::new(RewriteConfig::load_from_file(path)?)
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// The configured target file
    pub fn target(&self) -> &Path {
        &self.config.target
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> RewriteResult<Document> {
        storage::load(path)
    }

    /// Apply every enabled rule in declared order
    pub fn apply(&self, document: Document) -> (Document, Vec<RuleOutcome>) {
        self.engine.apply(document)
    }

    pub fn save<P: AsRef<Path>>(&self, document: &Document, path: P) -> RewriteResult<()> {
        storage::save(document, path)
    }

    /// Load, apply and save `path`, returning what changed.
    ///
    /// The file is rewritten in place without locking: running two rewrites
    /// against the same path at once is a race, and callers must serialize them.
    pub fn run<P: AsRef<Path>>(
        &self,
        path: P,
        options: &RewriteOptions,
    ) -> RewriteResult<RewriteReport> {
        let start_time = Instant::now();
        let path = path.as_ref();

        let document = self.load(path)?;
        let bytes_before = document.len();
        let original = document.text().to_owned();

        let (rewritten, outcomes) = self.apply(document);

        let mut report = RewriteReport::new(path);
        for outcome in outcomes {
            if outcome.is_noop() {
                tracing::debug!("Rule '{}' matched nothing in {}", outcome.rule_id, path.display());
            }
            report.add_outcome(outcome);
        }
        report.set_content_change(bytes_before, rewritten.len(), rewritten.text() != original);
        report.set_config_fingerprint(self.fingerprint.clone());

        if options.fail_on_unmatched && report.has_unmatched() {
            let rules = report.unmatched_rules().map(|o| o.rule_id.clone()).collect();
            return Err(RewriteError::unmatched(rules));
        }

        if options.dry_run {
            tracing::info!("Dry run: not writing {}", path.display());
        } else if report.summary.changed {
            self.save(&rewritten, path)?;
            report.mark_written();
            tracing::info!("Rewrote {}", path.display());
        } else {
            tracing::debug!("{} unchanged, skipping write", path.display());
        }

        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        Ok(report)
    }

    /// Run against the configured target
    pub fn run_target(&self, options: &RewriteOptions) -> RewriteResult<RewriteReport> {
        self.run(&self.config.target, options)
    }
}
