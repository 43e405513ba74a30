//! Index Rewriter CLI - Command-line interface for ordered in-place rewrites
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates flags into a rule set, a target and rewrite options
//! - Handles external concerns like config discovery, process exit codes, and terminal output

use clap::{Parser, Subcommand, ValueEnum};
use index_rewriter::{
    OutputFormat, ReportFormatter, ReportOptions, RewriteConfig, RewriteError, RewriteOptions,
    RewriteResult, Rewriter,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Index Rewriter - swap CustomCheckbox for native inputs and drop the zoom slider
#[derive(Parser)]
#[command(name = "index-rewriter")]
#[command(version)]
#[command(about = "Apply ordered regex rewrite rules to a single file in place")]
#[command(long_about = "Index Rewriter loads one file, applies an ordered list of pattern/replacement rules (each to the output of the previous one), and atomically writes the result back. With no arguments it applies the built-in Index.tsx rules to client/pages/Index.tsx.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// File to rewrite (overrides the configured target)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Show what would change without writing
    #[arg(long)]
    dry_run: bool,

    /// Fail without writing if any rule matches nothing
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormatArg,
}

#[derive(Subcommand)]
enum Commands {
    /// List rules in application order
    Rules {
        /// Show only enabled rules
        #[arg(long)]
        enabled_only: bool,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Exit code when `--strict` finds rules that matched nothing
const EXIT_UNMATCHED: i32 = 2;

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> RewriteResult<i32> {
    match cli.command {
        Some(Commands::Rules { enabled_only }) => run_list_rules(cli.config, enabled_only),
        Some(Commands::ValidateConfig { config_file }) => {
            run_validate_config(config_file.or(cli.config))
        }
        None => run_rewrite(
            cli.config,
            cli.file,
            RewriteOptions { dry_run: cli.dry_run, fail_on_unmatched: cli.strict },
            cli.format,
            !cli.no_color,
        ),
    }
}

fn load_config(config_path: Option<PathBuf>) -> RewriteResult<RewriteConfig> {
    match config_path {
        Some(path) => RewriteConfig::load_from_file(path),
        None => RewriteConfig::discover(Path::new(".")),
    }
}

fn run_rewrite(
    config_path: Option<PathBuf>,
    file: Option<PathBuf>,
    options: RewriteOptions,
    format: OutputFormatArg,
    use_colors: bool,
) -> RewriteResult<i32> {
    let mut config = load_config(config_path)?;
    if let Some(file) = file {
        config.target = file;
    }

    let rewriter = Rewriter::new(config)?;

    let report = match rewriter.run_target(&options) {
        Ok(report) => report,
        Err(RewriteError::Unmatched { rules }) => {
            eprintln!("Error: {}", RewriteError::Unmatched { rules });
            eprintln!("No changes were written to {}", rewriter.target().display());
            return Ok(EXIT_UNMATCHED);
        }
        Err(e) => return Err(e),
    };

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors,
        show_outcomes: options.dry_run,
        ..Default::default()
    });
    let formatted = formatter.format_report(&report, format.into())?;
    print!("{formatted}");
    if format == OutputFormatArg::Json {
        println!();
    }

    Ok(0)
}

fn run_validate_config(config_path: Option<PathBuf>) -> RewriteResult<i32> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("index_rewriter.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match RewriteConfig::load_from_file(&config_path) {
        Ok(config) => {
            let total_rules = config.rules.len();
            let enabled_rules = config.enabled_rules().count();

            println!("Configuration is valid");
            println!("  Target: {}", config.target.display());
            println!("  Rules: {total_rules} total, {enabled_rules} enabled");
            println!("  Fingerprint: {}", config.fingerprint());

            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            Ok(1)
        }
    }
}

fn run_list_rules(config_path: Option<PathBuf>, enabled_only: bool) -> RewriteResult<i32> {
    let config = load_config(config_path)?;

    println!("Rules for {} (applied in order)\n", config.target.display());

    for (position, rule) in config.rules.iter().enumerate() {
        if enabled_only && !rule.enabled {
            continue;
        }

        let status = if rule.enabled { "on " } else { "off" };
        println!("{:>2}. [{}] {} ({})", position + 1, status, rule.id, rule.kind().as_str());
        if !rule.description.is_empty() {
            println!("       {}", rule.description);
        }
    }

    Ok(0)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const INDEX_TSX: &str = include_str!("testdata/Index.tsx");

    #[test]
    fn test_rewrite_command() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("Index.tsx");
        fs::write(&target, INDEX_TSX).unwrap();

        let config_file = temp_dir.path().join("rules.yaml");
        fs::write(&config_file, RewriteConfig::with_defaults().to_yaml().unwrap()).unwrap();

        let result = run_rewrite(
            Some(config_file),
            Some(target.clone()),
            RewriteOptions::default(),
            OutputFormatArg::Json,
            false,
        );

        assert_eq!(result.unwrap(), 0);
        assert!(!fs::read_to_string(&target).unwrap().contains("CustomCheckbox"));
    }

    #[test]
    fn test_strict_rewrite_reports_unmatched() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("Index.tsx");
        fs::write(&target, "nothing here").unwrap();

        let config_file = temp_dir.path().join("rules.yaml");
        fs::write(&config_file, RewriteConfig::with_defaults().to_yaml().unwrap()).unwrap();

        let result = run_rewrite(
            Some(config_file),
            Some(target.clone()),
            RewriteOptions { fail_on_unmatched: true, ..Default::default() },
            OutputFormatArg::Human,
            false,
        );

        assert_eq!(result.unwrap(), EXIT_UNMATCHED);
        assert_eq!(fs::read_to_string(&target).unwrap(), "nothing here");
    }

    #[test]
    fn test_rewrite_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("rules.yaml");
        fs::write(&config_file, RewriteConfig::with_defaults().to_yaml().unwrap()).unwrap();

        let result = run_rewrite(
            Some(config_file),
            Some(temp_dir.path().join("missing.tsx")),
            RewriteOptions::default(),
            OutputFormatArg::Human,
            false,
        );

        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("rules.yaml");
        fs::write(&config_file, RewriteConfig::default().to_yaml().unwrap()).unwrap();
        assert_eq!(run_validate_config(Some(config_file)).unwrap(), 0);

        let broken = temp_dir.path().join("broken.yaml");
        fs::write(&broken, "version: \"9.9\"\nrules: []\n").unwrap();
        assert_eq!(run_validate_config(Some(broken)).unwrap(), 1);
    }

    #[test]
    fn test_list_rules() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("rules.yaml");
        fs::write(&config_file, RewriteConfig::default().to_yaml().unwrap()).unwrap();

        assert_eq!(run_list_rules(Some(config_file.clone()), false).unwrap(), 0);
        assert_eq!(run_list_rules(Some(config_file), true).unwrap(), 0);
    }

    #[test]
    fn test_cli_parses_without_arguments() {
        let cli = Cli::try_parse_from(["index-rewriter"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.file.is_none());
        assert!(!cli.dry_run);
        assert!(cli.format == OutputFormatArg::Human);
    }

    #[test]
    fn test_cli_parses_flags_and_subcommands() {
        let cli = Cli::try_parse_from([
            "index-rewriter",
            "--file",
            "web/Index.tsx",
            "--dry-run",
            "--strict",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.file.as_deref(), Some(Path::new("web/Index.tsx")));
        assert!(cli.dry_run && cli.strict);

        let cli = Cli::try_parse_from(["index-rewriter", "rules", "--enabled-only"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Rules { enabled_only: true })));
    }
}
