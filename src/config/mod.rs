//! Configuration management
//!
//! This module resolves the final `Config` from built-in defaults, an
//! optional TOML file, `LINK_VALIDATOR_*` environment variables and CLI
//! arguments, in increasing order of precedence.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::constants::{defaults, env_vars, output_formats, scopes};
use crate::core::error::{Result, ValidateLinksError};
use crate::core::types::LinkScope;
use crate::security::SecurityValidator;
use crate::ui::cli;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Markdown,
    Html,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Console => output_formats::CONSOLE,
            OutputFormat::Json => output_formats::JSON,
            OutputFormat::Markdown => output_formats::MARKDOWN,
            OutputFormat::Html => output_formats::HTML,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ValidateLinksError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            output_formats::CONSOLE => Ok(OutputFormat::Console),
            output_formats::JSON => Ok(OutputFormat::Json),
            output_formats::MARKDOWN => Ok(OutputFormat::Markdown),
            output_formats::HTML => Ok(OutputFormat::Html),
            other => Err(ValidateLinksError::InvalidArgument(format!(
                "Invalid format: {other}. Valid formats: {}",
                output_formats::ALL.join(", ")
            ))),
        }
    }
}

/// How chatty diagnostics on stderr are
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Files or directories to validate
    pub inputs: Vec<PathBuf>,
    pub scope: LinkScope,
    /// Stop after this many broken links (0 = unlimited)
    pub max_broken: u64,
    /// Stop after this many files (0 = unlimited)
    pub max_files: u64,
    /// Directory recursion limit (0 = unlimited)
    pub max_depth: usize,
    /// External request timeout in seconds
    pub timeout: u64,
    pub format: OutputFormat,
    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,
    /// Glob patterns excluded from directory walks
    pub exclude_patterns: Vec<String>,
    pub check_external: bool,
    pub case_sensitive: bool,
    pub dry_run: bool,
    pub include_hidden: bool,
    pub only_hidden: bool,
    pub no_color: bool,
    pub verbosity: Verbosity,
    pub config_file: Option<PathBuf>,
    pub show_help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            scope: LinkScope::all(),
            max_broken: defaults::MAX_BROKEN,
            max_files: defaults::MAX_FILES,
            max_depth: defaults::MAX_DEPTH,
            timeout: defaults::TIMEOUT_SECONDS,
            format: OutputFormat::default(),
            output: None,
            exclude_patterns: Vec::new(),
            check_external: false,
            case_sensitive: false,
            dry_run: false,
            include_hidden: false,
            only_hidden: false,
            no_color: false,
            verbosity: Verbosity::default(),
            config_file: None,
            show_help: false,
        }
    }
}

impl Config {
    /// Get timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Validate cross-option constraints that individual layers cannot see
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            return Err(ValidateLinksError::InvalidArgument(
                "Timeout must be positive".to_string(),
            ));
        }
        if self.include_hidden && self.only_hidden {
            return Err(ValidateLinksError::InvalidArgument(
                "Cannot use both --include-hidden and --only-hidden".to_string(),
            ));
        }
        if self.inputs.is_empty() && !self.show_help {
            return Err(ValidateLinksError::InvalidArgument(
                "No input files or directories specified".to_string(),
            ));
        }
        Ok(())
    }
}

/// One source of configuration values. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub inputs: Option<Vec<String>>,
    pub scope: Option<String>,
    pub max_broken: Option<i64>,
    pub max_files: Option<i64>,
    pub max_depth: Option<i64>,
    pub timeout: Option<i64>,
    pub format: Option<String>,
    pub output: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub check_external: Option<bool>,
    pub case_sensitive: Option<bool>,
    pub dry_run: Option<bool>,
    pub include_hidden: Option<bool>,
    pub only_hidden: Option<bool>,
    pub no_color: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub debug: Option<bool>,
    #[serde(skip)]
    pub config_file: Option<String>,
    #[serde(skip)]
    pub help: Option<bool>,
}

impl ConfigLayer {
    /// Load a layer from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ValidateLinksError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            ValidateLinksError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Build a layer from `LINK_VALIDATOR_*` variables. Empty values are ignored.
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        let get = |name: &str| {
            env.get(name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };
        let get_int = |name: &str| get(name).map(parse_lenient_int);
        let get_bool = |name: &str| get(name).map(parse_bool);

        Self {
            scope: get(env_vars::SCOPE).map(str::to_string),
            max_broken: get_int(env_vars::MAX_BROKEN),
            max_files: get_int(env_vars::MAX_FILES),
            max_depth: get_int(env_vars::MAX_DEPTH),
            timeout: get_int(env_vars::TIMEOUT),
            format: get(env_vars::FORMAT).map(str::to_string),
            check_external: get_bool(env_vars::CHECK_EXTERNAL),
            case_sensitive: get_bool(env_vars::CASE_SENSITIVE),
            include_hidden: get_bool(env_vars::INCLUDE_HIDDEN),
            only_hidden: get_bool(env_vars::ONLY_HIDDEN),
            no_color: get_bool(env_vars::NO_COLOR),
            dry_run: get_bool(env_vars::DRY_RUN),
            ..Default::default()
        }
    }

    /// Combine with a higher-priority layer; its set fields win.
    pub fn overlay(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            inputs: higher.inputs.or(self.inputs),
            scope: higher.scope.or(self.scope),
            max_broken: higher.max_broken.or(self.max_broken),
            max_files: higher.max_files.or(self.max_files),
            max_depth: higher.max_depth.or(self.max_depth),
            timeout: higher.timeout.or(self.timeout),
            format: higher.format.or(self.format),
            output: higher.output.or(self.output),
            exclude: higher.exclude.or(self.exclude),
            check_external: higher.check_external.or(self.check_external),
            case_sensitive: higher.case_sensitive.or(self.case_sensitive),
            dry_run: higher.dry_run.or(self.dry_run),
            include_hidden: higher.include_hidden.or(self.include_hidden),
            only_hidden: higher.only_hidden.or(self.only_hidden),
            no_color: higher.no_color.or(self.no_color),
            quiet: higher.quiet.or(self.quiet),
            verbose: higher.verbose.or(self.verbose),
            debug: higher.debug.or(self.debug),
            config_file: higher.config_file.or(self.config_file),
            help: higher.help.or(self.help),
        }
    }

    /// Apply this layer on top of `defaults` and validate the result.
    pub fn resolve(self, defaults: &Config) -> Result<Config> {
        let mut config = defaults.clone();

        if let Some(inputs) = self.inputs {
            config.inputs = inputs.into_iter().map(PathBuf::from).collect();
        }
        if let Some(ref scope) = self.scope {
            config.scope = LinkScope::parse(scope).map_err(|segment| {
                ValidateLinksError::InvalidArgument(format!(
                    "Invalid scope: {segment}. Valid scopes: {}",
                    scopes::VALID.join(", ")
                ))
            })?;
        }
        if let Some(ref format) = self.format {
            config.format = format.parse()?;
        }
        if let Some(timeout) = self.timeout {
            if timeout <= 0 {
                return Err(ValidateLinksError::InvalidArgument(
                    "Timeout must be positive".to_string(),
                ));
            }
            config.timeout = timeout.unsigned_abs();
        }
        if let Some(max_broken) = self.max_broken {
            config.max_broken = non_negative("max-broken", max_broken)?;
        }
        if let Some(max_files) = self.max_files {
            config.max_files = non_negative("max-files", max_files)?;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = usize::try_from(non_negative("max-depth", max_depth)?)
                .unwrap_or(usize::MAX);
        }
        if let Some(output) = self.output {
            config.output = Some(PathBuf::from(output));
        }
        if let Some(exclude) = self.exclude {
            config.exclude_patterns = exclude;
        }
        if let Some(config_file) = self.config_file {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let flags = [
            (self.check_external, &mut config.check_external),
            (self.case_sensitive, &mut config.case_sensitive),
            (self.dry_run, &mut config.dry_run),
            (self.include_hidden, &mut config.include_hidden),
            (self.only_hidden, &mut config.only_hidden),
            (self.no_color, &mut config.no_color),
            (self.help, &mut config.show_help),
        ];
        for (value, slot) in flags {
            if let Some(value) = value {
                *slot = value;
            }
        }

        config.verbosity = match (self.debug, self.verbose, self.quiet) {
            (Some(true), _, _) => Verbosity::Debug,
            (_, Some(true), _) => Verbosity::Verbose,
            (_, _, Some(true)) => Verbosity::Quiet,
            _ => defaults.verbosity,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Resolve the run configuration from argv, environment and defaults.
///
/// `args[0]` is the program name. The only I/O performed is reading the file
/// named by `--config`, when given.
pub fn resolve_config(
    args: &[String],
    env: &HashMap<String, String>,
    defaults: &Config,
) -> Result<Config> {
    let parsed = cli::parse_args(args)?;
    let security = SecurityValidator::new();
    let mut cli_layer = cli::cli_to_layer(&parsed);

    if let Some(ref inputs) = cli_layer.inputs {
        let checked = inputs
            .iter()
            .map(|input| security.validate_cli_argument(input))
            .collect::<Result<Vec<_>>>()?;
        cli_layer.inputs = Some(checked).filter(|inputs| !inputs.is_empty());
    }

    let file_layer = match cli_layer.config_file {
        Some(ref path) => ConfigLayer::load_from_file(path)?,
        None => ConfigLayer::default(),
    };

    file_layer
        .overlay(ConfigLayer::from_env(env))
        .overlay(cli_layer)
        .resolve(defaults)
}

/// `true/1/yes/on` are true; every other value is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Parse an integer, degrading to 0 when the value is not a number.
pub fn parse_lenient_int(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

fn non_negative(option: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        ValidateLinksError::InvalidArgument(format!("Option --{option} must be non-negative"))
    })
}
