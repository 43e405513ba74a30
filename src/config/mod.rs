//! Configuration loading and management for the index rewriter
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to an ordered list of rewrite rules
//! - The built-in Index.tsx rules live here as data, not as control flow
//! - Validation compiles every pattern with the same flags the engine uses

use crate::domain::{RewriteError, RewriteResult, RuleKind};
use crate::patterns::build_regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration versions this build understands
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// File rewritten when no target is configured
pub const DEFAULT_TARGET: &str = "client/pages/Index.tsx";

/// Config file names probed in the working directory, in order
pub const DEFAULT_CONFIG_FILES: &[&str] =
    &["index_rewriter.yaml", "index_rewriter.yml", ".index_rewriter.yaml"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Configuration format version
    pub version: String,
    /// File the rules are applied to
    #[serde(default = "default_target")]
    pub target: PathBuf,
    /// Rules, applied strictly in this order
    #[serde(default)]
    pub rules: Vec<RewriteRule>,
}

/// A single pattern to replacement rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct RewriteRule {
    /// Unique identifier for this rule
    pub id: String,
    /// Human-readable summary of the edit
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Regex matched with dot-matches-newline and multi-line anchors
    pub pattern: String,
    /// Replacement template; empty deletes the match
    #[serde(default)]
    pub replacement: String,
    /// Whether this rule is applied
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Insert the replacement verbatim instead of expanding `$group` references
    #[serde(default)]
    pub literal: bool,
}

impl RewriteRule {
    /// Create an enabled rule whose replacement may reference capture groups
    pub fn new(
        id: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            pattern: pattern.into(),
            replacement: replacement.into(),
            enabled: true,
            literal: false,
        }
    }

    /// Create a rule that deletes every match
    pub fn removal(id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(id, pattern, "")
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Treat the replacement as plain text
    pub fn verbatim(mut self) -> Self {
        self.literal = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn kind(&self) -> RuleKind {
        RuleKind::from_replacement(&self.replacement)
    }
}

impl RewriteConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RewriteResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            RewriteError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            RewriteError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> RewriteResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| RewriteError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found in `dir`, or the built-in defaults
    pub fn discover<P: AsRef<Path>>(dir: P) -> RewriteResult<Self> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                tracing::debug!("Using configuration from {}", candidate.display());
                return Self::load_from_file(candidate);
            }
        }

        tracing::debug!("No configuration file found, using built-in rules");
        Ok(Self::with_defaults())
    }

    /// Default configuration: the Index.tsx checkbox and slider rules
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            target: default_target(),
            rules: Self::default_rules(),
        }
    }

    /// Built-in rules, in application order
    fn default_rules() -> Vec<RewriteRule> {
        let mut rules = vec![RewriteRule::removal(
            "remove_custom_checkbox_import",
            r#"import \{ CustomCheckbox \} from "@/components/ui/custom-checkbox";\n"#,
        )
        .with_description("Drop the CustomCheckbox import")
        .verbatim()];

        for (id, field) in CHECKBOX_FIELDS {
            rules.push(
                RewriteRule::new(*id, checkbox_pattern(field), checkbox_replacement(field))
                    .with_description(format!(
                        "Swap the {field} CustomCheckbox for a native checkbox input"
                    ))
                    .verbatim(),
            );
        }

        rules.push(
            RewriteRule::removal("remove_zoom_slider", build_zoom_slider_pattern())
                .with_description("Delete the zoom level slider block")
                .verbatim(),
        );

        rules
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> RewriteResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(RewriteError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        if self.target.as_os_str().is_empty() {
            return Err(RewriteError::config("Target path must not be empty"));
        }

        let mut seen = HashSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.id.trim().is_empty() {
                return Err(RewriteError::config(format!("Rule #{} has an empty id", index + 1)));
            }

            if !seen.insert(rule.id.as_str()) {
                return Err(RewriteError::config(format!("Duplicate rule ID '{}'", rule.id)));
            }

            build_regex(&rule.pattern).map_err(|e| {
                RewriteError::config(format!("Invalid regex pattern in rule '{}': {}", rule.id, e))
            })?;
        }

        Ok(())
    }

    /// Enabled rules in declared order
    pub fn enabled_rules(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter().filter(|rule| rule.enabled)
    }

    /// Look up a rule by id
    pub fn rule(&self, id: &str) -> Option<&RewriteRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn to_yaml(&self) -> RewriteResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| RewriteError::config(format!("Failed to serialize config: {e}")))
    }

    /// Fingerprint of the rule set; rule order is significant
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.version.as_bytes());
        for rule in &self.rules {
            hasher.update([0u8]);
            hasher.update(rule.id.as_bytes());
            hasher.update([0u8]);
            hasher.update(rule.pattern.as_bytes());
            hasher.update([0u8]);
            hasher.update(rule.replacement.as_bytes());
            hasher.update([u8::from(rule.enabled), u8::from(rule.literal)]);
        }

        let digest = hasher.finalize();
        format!("{digest:x}")[..16].to_string()
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_true() -> bool {
    true
}

fn default_target() -> PathBuf {
    PathBuf::from(DEFAULT_TARGET)
}

/// Checkbox rules: rule id and the `routeSettings` field each one toggles
const CHECKBOX_FIELDS: &[(&str, &str)] = &[
    ("traffic_checkbox", "showTraffic"),
    ("safe_zones_checkbox", "showSafeZones"),
    ("emergency_services_checkbox", "showEmergencyServices"),
    ("debug_checkbox", "showDebug"),
];

const CHECKBOX_PATTERN: &str = r#"<CustomCheckbox\s+checked=\{routeSettings\.{field}\}\s+onChange=\{\(checked\) =>\s+setRouteSettings\(\(prev\) => \(\{\s+\.\.\.prev,\s+{field}: checked,\s+\}\)\)\s+\}\s+size="sm"\s+/>"#;

const CHECKBOX_REPLACEMENT: &str = r#"<input
                        type="checkbox"
                        checked={routeSettings.{field}}
                        onChange={(e) =>
                          setRouteSettings((prev) => ({
                            ...prev,
                            {field}: e.target.checked,
                          }))
                        }
                        className="w-4 h-4 accent-blue-600 cursor-pointer"
                      />"#;

/// Pattern matching a `CustomCheckbox` bound to `routeSettings.<field>`
pub(crate) fn checkbox_pattern(field: &str) -> String {
    CHECKBOX_PATTERN.replace("{field}", &regex::escape(field))
}

/// Native checkbox input bound to `routeSettings.<field>`
pub(crate) fn checkbox_replacement(field: &str) -> String {
    CHECKBOX_REPLACEMENT.replace("{field}", field)
}

fn build_zoom_slider_pattern() -> String {
    [
        r#"<motion\.div\s+className="flex items-center justify-between p-2 bg-muted/20 rounded border transition-all duration-200 hover:bg-muted/30"\s+"#,
        r#"whileHover=\{\{ scale: 1\.01 \}\}\s+whileTap=\{\{ scale: 0\.99 \}\}\s+>\s+"#,
        r#"<div>\s+<p className="text-sm font-medium">Zoom Level</p>\s+"#,
        r#"<p className="text-xs text-muted-foreground">\s+\{routeSettings\.zoomLevel\}\s+</p>\s+</div>\s+"#,
        r#"<input\s+type="range"\s+min="10"\s+max="20"\s+value=\{routeSettings\.zoomLevel\}\s+"#,
        r#"onChange=\{\(e\) =>\s+setRouteSettings\(\(prev\) => \(\{\s+\.\.\.prev,\s+"#,
        r#"zoomLevel: parseInt\(e\.target\.value\),\s+\}\)\)\s+\}\s+"#,
        r#"className="w-16 h-2"\s+/>\s+</motion\.div>"#,
    ]
    .concat()
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: RewriteConfig,
}

impl ConfigBuilder {
    /// Create a builder with the default target and no rules
    pub fn new() -> Self {
        Self {
            config: RewriteConfig {
                version: "1.0".to_string(),
                target: default_target(),
                rules: Vec::new(),
            },
        }
    }

    /// Start from the built-in rule set
    pub fn from_defaults() -> Self {
        Self { config: RewriteConfig::with_defaults() }
    }

    pub fn target(mut self, target: impl Into<PathBuf>) -> Self {
        self.config.target = target.into();
        self
    }

    /// Append a rule after the existing ones
    pub fn add_rule(mut self, rule: RewriteRule) -> Self {
        self.config.rules.push(rule);
        self
    }

    pub fn add_rules(mut self, rules: impl IntoIterator<Item = RewriteRule>) -> Self {
        self.config.rules.extend(rules);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> RewriteResult<RewriteConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
