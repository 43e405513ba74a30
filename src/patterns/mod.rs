//! Rule engine for ordered, whole-document substitutions
//!
//! Architectural Principle: Service Layer - The engine owns compiled rules and applies them
//! - Rules are compiled once, up front, with dot-matches-newline and multi-line anchors
//! - Each rule runs a single global pass over the output of the rule before it
//! - Application never fails: a rule that matches nothing is reported, not raised

use crate::config::RewriteRule;
use crate::domain::{Document, RewriteError, RewriteResult, RuleKind, RuleOutcome};
use regex::{Captures, Regex, RegexBuilder};
use std::borrow::Cow;

/// Compile a rule pattern with the flags every rule is matched under
pub fn build_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).multi_line(true).dot_matches_new_line(true).build()
}

/// Applies compiled rules to documents in declared order
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
}

/// A compiled rule with its replacement
#[derive(Debug)]
struct CompiledRule {
    rule_id: String,
    regex: Regex,
    replacement: String,
    literal: bool,
    kind: RuleKind,
}

impl CompiledRule {
    fn render(&self, caps: &Captures<'_>) -> String {
        if self.literal {
            self.replacement.clone()
        } else {
            let mut expanded = String::with_capacity(self.replacement.len());
            caps.expand(&self.replacement, &mut expanded);
            expanded
        }
    }
}

impl RuleEngine {
    /// Create an engine with no rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Compile every enabled rule, preserving order
    pub fn from_rules<'a, I>(rules: I) -> RewriteResult<Self>
    where
        I: IntoIterator<Item = &'a RewriteRule>,
    {
        let mut engine = Self::new();
        for rule in rules {
            if rule.enabled {
                engine.add_rule(rule)?;
            } else {
                tracing::debug!("Skipping disabled rule '{}'", rule.id);
            }
        }
        Ok(engine)
    }

    /// Append a rule after the ones already loaded
    pub fn add_rule(&mut self, rule: &RewriteRule) -> RewriteResult<()> {
        tracing::debug!(
            "Compiling rule '{}' ({}) with pattern '{}'",
            rule.id,
            rule.kind().as_str(),
            rule.pattern
        );

        let regex =
            build_regex(&rule.pattern).map_err(|e| RewriteError::pattern(&rule.id, e.to_string()))?;

        self.rules.push(CompiledRule {
            rule_id: rule.id.clone(),
            regex,
            replacement: rule.replacement.clone(),
            literal: rule.literal,
            kind: rule.kind(),
        });

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule ids in application order
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.rule_id.as_str())
    }

    /// Apply every rule in order, each to the previous rule's output
    pub fn apply(&self, document: Document) -> (Document, Vec<RuleOutcome>) {
        let mut outcomes = Vec::with_capacity(self.rules.len());
        let mut text = document.text().to_owned();

        for rule in &self.rules {
            let mut matches = 0usize;
            let rewritten = match rule.regex.replace_all(&text, |caps: &Captures<'_>| {
                matches += 1;
                rule.render(caps)
            }) {
                Cow::Owned(rewritten) => Some(rewritten),
                Cow::Borrowed(_) => None,
            };

            if let Some(rewritten) = rewritten {
                text = rewritten;
            }

            tracing::debug!("Rule '{}' matched {} time(s)", rule.rule_id, matches);
            outcomes.push(RuleOutcome::new(rule.rule_id.clone(), rule.kind, matches));
        }

        (document.with_text(text), outcomes)
    }
}
