//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - RewriteReport (domain) is converted to terminal text or JSON
//! - Each formatter encapsulates the rules for its specific output format

use crate::domain::{RewriteError, RewriteReport, RewriteResult, RuleKind};
use colored::Colorize;
use std::fmt::Write as _;
use std::io::Write;

/// Supported output formats for rewrite reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors
    Human,
    /// JSON format for programmatic consumption
    Json,
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to list every rule with its match count
    pub show_outcomes: bool,
    /// Whether to warn about rules that matched nothing
    pub show_unmatched: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_outcomes: false, show_unmatched: true }
    }
}

/// Main report formatter that dispatches to specific formatters
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a rewrite report in the specified format
    pub fn format_report(
        &self,
        report: &RewriteReport,
        format: OutputFormat,
    ) -> RewriteResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(report)),
            OutputFormat::Json => self.format_json(report),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &RewriteReport,
        format: OutputFormat,
        mut writer: W,
    ) -> RewriteResult<()> {
        let formatted = self.format_report(report, format)?;
        writer
            .write_all(formatted.as_bytes())
            .map_err(RewriteError::output)?;
        Ok(())
    }

    fn format_human(&self, report: &RewriteReport) -> String {
        let mut output = String::new();

        let confirmation = report.confirmation();
        let headline = if !report.summary.changed {
            self.paint(&confirmation, |s| s.yellow())
        } else {
            self.paint(&confirmation, |s| s.green())
        };
        let _ = writeln!(output, "{headline}");

        if self.options.show_outcomes && !report.outcomes.is_empty() {
            output.push('\n');
            let width = report.outcomes.iter().map(|o| o.rule_id.len()).max().unwrap_or(0);
            for outcome in &report.outcomes {
                let kind = match outcome.kind {
                    RuleKind::Replace => self.paint(outcome.kind.as_str(), |s| s.cyan()),
                    RuleKind::Remove => self.paint(outcome.kind.as_str(), |s| s.magenta()),
                };
                let _ = writeln!(
                    output,
                    "  {:<width$}  {:<7}  {}",
                    outcome.rule_id,
                    kind,
                    outcome.matches,
                    width = width
                );
            }
        }

        if self.options.show_unmatched && report.has_unmatched() {
            output.push('\n');
            for outcome in report.unmatched_rules() {
                let line = format!("warning: rule '{}' matched nothing", outcome.rule_id);
                let _ = writeln!(output, "{}", self.paint(&line, |s| s.yellow()));
            }
        }

        output
    }

    fn format_json(&self, report: &RewriteReport) -> RewriteResult<String> {
        serde_json::to_string_pretty(report)
            .map_err(|e| RewriteError::config(format!("JSON serialization failed: {e}")))
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> colored::ColoredString) -> String {
        if self.options.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RuleOutcome;

    fn sample_report() -> RewriteReport {
        let mut report = RewriteReport::new("client/pages/Index.tsx");
        report.add_outcome(RuleOutcome::new("remove_custom_checkbox_import", RuleKind::Remove, 1));
        report.add_outcome(RuleOutcome::new("traffic_checkbox", RuleKind::Replace, 1));
        report.add_outcome(RuleOutcome::new("remove_zoom_slider", RuleKind::Remove, 0));
        report.set_content_change(2048, 1900, true);
        report.mark_written();
        report
    }

    fn plain() -> ReportFormatter {
        ReportFormatter::new(ReportOptions { use_colors: false, ..Default::default() })
    }

    #[test]
    fn test_human_format() {
        let output = plain().format_report(&sample_report(), OutputFormat::Human).unwrap();

        assert!(output.starts_with("Rewrote Index.tsx: 1 replacement, 1 removal\n"));
        assert!(output.contains("warning: rule 'remove_zoom_slider' matched nothing"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_human_format_with_outcomes() {
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            show_outcomes: true,
            show_unmatched: false,
        });
        let output = formatter.format_report(&sample_report(), OutputFormat::Human).unwrap();

        assert!(output.contains("traffic_checkbox"));
        assert!(output.contains("replace"));
        assert!(!output.contains("warning:"));
    }

    #[test]
    fn test_json_format() {
        let output = plain().format_report(&sample_report(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["target"], "client/pages/Index.tsx");
        assert_eq!(parsed["outcomes"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["outcomes"][0]["kind"], "remove");
        assert_eq!(parsed["summary"]["unmatched_rules"], 1);
        assert_eq!(parsed["summary"]["written"], true);
    }

    #[test]
    fn test_write_report() {
        let mut buffer = Vec::new();
        plain().write_report(&sample_report(), OutputFormat::Human, &mut buffer).unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("Rewrote Index.tsx"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_report_failure_is_output_error() {
        let err = plain()
            .write_report(&sample_report(), OutputFormat::Human, BrokenPipe)
            .unwrap_err();

        assert!(matches!(err, RewriteError::Output { .. }));
        assert!(err.to_string().starts_with("Failed to write report"));
        assert!(!err.to_string().contains("Index.tsx"));
    }
}
