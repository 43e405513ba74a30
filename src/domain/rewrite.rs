//! Core domain models for rule-driven document rewriting
//!
//! Architecture: Rich Domain Models - Documents and reports carry behavior, not just data
//! - A Document owns the text being rewritten and remembers where it came from
//! - RewriteReport acts as an aggregate root over the per-rule outcomes of one run
//! - Errors name the failing stage so a missing input never looks like a failed save

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// The full textual content of one file at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    text: String,
}

impl Document {
    /// Create a document for the given path and content
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }

    /// Path the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current raw text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the document, returning its text
    pub fn into_text(self) -> String {
        self.text
    }

    /// Supersede the content while keeping the origin path
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self { path: self.path, text: text.into() }
    }

    /// Length of the content in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// File name for display, falling back to the full path
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

/// What a rule does to the text it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Matched text is swapped for new text
    Replace,
    /// Matched text is deleted
    Remove,
}

impl RuleKind {
    /// An empty replacement deletes; anything else replaces
    pub fn from_replacement(replacement: &str) -> Self {
        if replacement.is_empty() {
            Self::Remove
        } else {
            Self::Replace
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }
}

/// Result of applying a single rule to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Identifier of the rule that was applied
    pub rule_id: String,
    /// Whether the rule replaces or removes text
    pub kind: RuleKind,
    /// Number of non-overlapping occurrences substituted
    pub matches: usize,
}

impl RuleOutcome {
    pub fn new(rule_id: impl Into<String>, kind: RuleKind, matches: usize) -> Self {
        Self { rule_id: rule_id.into(), kind, matches }
    }

    /// A rule that matched nothing left the document untouched
    pub fn is_noop(&self) -> bool {
        self.matches == 0
    }
}

/// Summary statistics for one rewrite run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewriteSummary {
    /// Occurrences substituted by replace rules
    pub replacements: usize,
    /// Occurrences deleted by remove rules
    pub removals: usize,
    /// Rules whose pattern matched zero times
    pub unmatched_rules: usize,
    /// Document size before the rules ran
    pub bytes_before: usize,
    /// Document size after the rules ran
    pub bytes_after: usize,
    /// Whether the rewritten text differs from the input
    pub changed: bool,
    /// Whether the rewritten text was saved back to disk
    pub written: bool,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when the rewrite was performed
    pub rewritten_at: DateTime<Utc>,
}

/// Complete record of a rewrite run, in rule order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteReport {
    /// File that was rewritten
    pub target: PathBuf,
    /// One outcome per applied rule, in declared order
    pub outcomes: Vec<RuleOutcome>,
    /// Summary statistics
    pub summary: RewriteSummary,
    /// Fingerprint of the rule set used for this run
    pub config_fingerprint: Option<String>,
}

impl RewriteReport {
    /// Create an empty report for the given target
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            outcomes: Vec::new(),
            summary: RewriteSummary { rewritten_at: Utc::now(), ..Default::default() },
            config_fingerprint: None,
        }
    }

    /// Record a rule outcome, keeping the summary counts in step
    pub fn add_outcome(&mut self, outcome: RuleOutcome) {
        if outcome.is_noop() {
            self.summary.unmatched_rules += 1;
        } else {
            match outcome.kind {
                RuleKind::Replace => self.summary.replacements += outcome.matches,
                RuleKind::Remove => self.summary.removals += outcome.matches,
            }
        }
        self.outcomes.push(outcome);
    }

    /// Record the size of the document before and after the rules ran
    pub fn set_content_change(&mut self, bytes_before: usize, bytes_after: usize, changed: bool) {
        self.summary.bytes_before = bytes_before;
        self.summary.bytes_after = bytes_after;
        self.summary.changed = changed;
    }

    pub fn mark_written(&mut self) {
        self.summary.written = true;
    }

    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    /// Rules that matched zero times
    pub fn unmatched_rules(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.is_noop())
    }

    pub fn has_unmatched(&self) -> bool {
        self.summary.unmatched_rules > 0
    }

    /// Total occurrences substituted across all rules
    pub fn total_matches(&self) -> usize {
        self.summary.replacements + self.summary.removals
    }

    /// Short human-readable confirmation of what the run did
    pub fn confirmation(&self) -> String {
        let name = display_name(&self.target);
        let counts = format!(
            "{} replacement{}, {} removal{}",
            self.summary.replacements,
            plural(self.summary.replacements),
            self.summary.removals,
            plural(self.summary.removals)
        );

        if !self.summary.changed {
            format!("No changes to {name}: {counts}")
        } else if self.summary.written {
            format!("Rewrote {name}: {counts}")
        } else {
            format!("Would rewrite {name}: {counts} (dry run, nothing written)")
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Error types that can occur while rewriting
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Input path does not exist; nothing was written
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Input exists but could not be read as text
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output could not be saved; the original file is left as it was
    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The report could not be written to its output stream
    #[error("Failed to write report: {source}")]
    Output {
        #[source]
        source: io::Error,
    },

    /// A rule's pattern failed to compile
    #[error("Pattern error in rule '{rule_id}': {message}")]
    Pattern { rule_id: String, message: String },

    /// Configuration file could not be loaded, parsed or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Strict mode: one or more rules matched nothing
    #[error("{} rule{} matched nothing: {}", .rules.len(), plural(.rules.len()), .rules.join(", "))]
    Unmatched { rules: Vec<String> },
}

impl RewriteError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read { path: path.into(), source }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write { path: path.into(), source }
    }

    pub fn output(source: io::Error) -> Self {
        Self::Output { source }
    }

    /// Create a pattern error
    pub fn pattern(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern { rule_id: rule_id.into(), message: message.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn unmatched(rules: Vec<String>) -> Self {
        Self::Unmatched { rules }
    }

    /// Whether the input file was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;
