// Command-line interface definitions and parsing for validate-links

use crate::config::{ConfigLayer, parse_lenient_int};
use crate::core::error::{Result, ValidateLinksError};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};

const ENVIRONMENT_HELP: &str = "\
Environment:
  LINK_VALIDATOR_SCOPE            Default for --scope
  LINK_VALIDATOR_MAX_BROKEN       Default for --max-broken
  LINK_VALIDATOR_MAX_FILES        Default for --max-files
  LINK_VALIDATOR_MAX_DEPTH        Default for --max-depth
  LINK_VALIDATOR_TIMEOUT          Default for --timeout
  LINK_VALIDATOR_FORMAT           Default for --format
  LINK_VALIDATOR_CHECK_EXTERNAL   true/false
  LINK_VALIDATOR_CASE_SENSITIVE   true/false
  LINK_VALIDATOR_INCLUDE_HIDDEN   true/false
  LINK_VALIDATOR_ONLY_HIDDEN      true/false
  LINK_VALIDATOR_NO_COLOR         true/false
  LINK_VALIDATOR_DRY_RUN          true/false

Exit status is 0 when every link resolves and 1 otherwise.";

#[derive(Parser, Debug, Default)]
#[command(
    name = "validate-links",
    about = "Validate internal, anchor, cross-reference and external links in documentation",
    after_help = ENVIRONMENT_HELP,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Files or directories to validate
    #[arg(value_name = "PATH")]
    pub inputs: Vec<String>,

    // Validation
    /// Link kinds to check: all, internal, anchor, cross_reference, external (comma-separated)
    #[arg(long, value_name = "LIST", help_heading = "Validation")]
    pub scope: Option<String>,

    /// Stop after this many broken links, 0 for unlimited (default: 50)
    #[arg(
        long,
        value_name = "COUNT",
        allow_negative_numbers = true,
        help_heading = "Validation"
    )]
    pub max_broken: Option<String>,

    /// Stop after this many files, 0 for unlimited (default: 0)
    #[arg(
        long,
        value_name = "COUNT",
        allow_negative_numbers = true,
        help_heading = "Validation"
    )]
    pub max_files: Option<String>,

    /// Check external links over the network
    #[arg(long, help_heading = "Validation")]
    pub check_external: bool,

    /// Timeout for external link checks in seconds (default: 30)
    #[arg(
        long,
        value_name = "SECONDS",
        allow_negative_numbers = true,
        help_heading = "Validation"
    )]
    pub timeout: Option<String>,

    /// Match file names case-sensitively
    #[arg(long, help_heading = "Validation")]
    pub case_sensitive: bool,

    // File Discovery
    /// Directory recursion depth, 0 for unlimited (default: 0)
    #[arg(
        long,
        value_name = "DEPTH",
        allow_negative_numbers = true,
        help_heading = "File Discovery"
    )]
    pub max_depth: Option<String>,

    /// Include hidden files and directories
    #[arg(long, help_heading = "File Discovery")]
    pub include_hidden: bool,

    /// Only process hidden files and directories
    #[arg(long, help_heading = "File Discovery")]
    pub only_hidden: bool,

    /// Glob patterns to skip (comma-separated)
    #[arg(long, value_name = "GLOBS", help_heading = "File Discovery")]
    pub exclude: Option<String>,

    // Output
    /// Report format: console, json, markdown, html (default: console)
    #[arg(long, value_name = "FORMAT", help_heading = "Output")]
    pub format: Option<String>,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "FILE", help_heading = "Output")]
    pub output: Option<String>,

    /// Disable colored output
    #[arg(long, help_heading = "Output")]
    pub no_color: bool,

    /// Only print errors
    #[arg(short = 'q', long, help_heading = "Output")]
    pub quiet: bool,

    /// Log per-file progress
    #[arg(short = 'v', long, help_heading = "Output")]
    pub verbose: bool,

    /// Log debug diagnostics
    #[arg(long, help_heading = "Output")]
    pub debug: bool,

    /// List the files that would be validated and exit
    #[arg(long, help_heading = "Output")]
    pub dry_run: bool,

    // Configuration
    /// Load options from a TOML file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Print help
    #[arg(short = 'h', long)]
    pub help: bool,
}

/// Parse argv (program name first) without exiting the process on error
pub fn parse_args(args: &[String]) -> Result<Cli> {
    Cli::try_parse_from(args).map_err(|err| {
        let message = match (err.kind(), err.get(ContextKind::InvalidArg)) {
            (ErrorKind::UnknownArgument, Some(ContextValue::String(arg))) => {
                format!("Unknown option: {arg}")
            }
            _ => first_error_line(&err),
        };
        ValidateLinksError::InvalidArgument(message)
    })
}

fn first_error_line(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error:")
        .trim()
        .to_string()
}

/// Rendered `--help` output
pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}

/// Convert parsed CLI arguments into the highest-priority config layer
pub fn cli_to_layer(cli: &Cli) -> ConfigLayer {
    let flag = |set: bool| set.then_some(true);
    let int = |value: &Option<String>| value.as_deref().map(parse_lenient_int);

    ConfigLayer {
        inputs: Some(cli.inputs.clone()).filter(|inputs| !inputs.is_empty()),
        scope: cli.scope.clone(),
        max_broken: int(&cli.max_broken),
        max_files: int(&cli.max_files),
        max_depth: int(&cli.max_depth),
        timeout: int(&cli.timeout),
        format: cli.format.clone(),
        output: cli.output.clone().filter(|output| !output.trim().is_empty()),
        exclude: cli.exclude.as_deref().map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|pattern| !pattern.is_empty())
                .map(String::from)
                .collect()
        }),
        check_external: flag(cli.check_external),
        case_sensitive: flag(cli.case_sensitive),
        dry_run: flag(cli.dry_run),
        include_hidden: flag(cli.include_hidden),
        only_hidden: flag(cli.only_hidden),
        no_color: flag(cli.no_color),
        quiet: flag(cli.quiet),
        verbose: flag(cli.verbose),
        debug: flag(cli.debug),
        config_file: cli.config.clone(),
        help: flag(cli.help),
    }
}
