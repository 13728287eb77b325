//! End-to-end run: configuration, discovery, validation and reporting

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{Config, OutputFormat, resolve_config};
use crate::core::Result;
use crate::discovery::{DiscoveryOptions, expand_inputs};
use crate::reporting::logging::{self, log_config_info, log_file_info, log_validation_complete};
use crate::reporting::{ReportGenerator, ReportOptions};
use crate::security::SecurityValidator;
use crate::ui::color::supports_color;
use crate::ui::output::{log_pre_validation, render_dry_run};
use crate::ui::{ProgressReporter, help_text};
use crate::validation::{LinkValidator, ValidateLinks, ValidationOptions};

/// Run the validator with `args` (program name first) and `env`, returning the exit code.
///
/// 0 when every link resolved, 1 on broken links, unreadable files,
/// configuration errors or a failed report write.
pub async fn run(args: Vec<String>, env: HashMap<String, String>) -> i32 {
    let config = match resolve_config(&args, &env, &Config::default()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("\nFor more information, try '--help'.");
            return 1;
        }
    };

    if config.show_help {
        print!("{}", help_text());
        return 0;
    }

    logging::init_logger(config.verbosity, config.no_color);
    log_config_info(&config);

    match run_validation(&config).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            logging::log_error("Validation aborted", Some(&e));
            eprintln!("Error: {e}");
            1
        }
    }
}

async fn run_validation(config: &Config) -> Result<i32> {
    let security = build_security_validator(&config.inputs);

    let files = expand_inputs(&config.inputs, &DiscoveryOptions::from(config))?;
    if files.is_empty() {
        eprintln!("Error: No files found to validate");
        return Ok(1);
    }
    log_file_info(&files);

    let validator = LinkValidator::new(security);
    let stats = validator.collect_statistics(&files, &config.scope);
    log_pre_validation(config, &stats);

    if config.dry_run {
        print!(
            "{}",
            render_dry_run(config, &stats, &files, supports_color(config.no_color))
        );
        return Ok(0);
    }

    let progress = ProgressReporter::new(files.len(), config.format == OutputFormat::Console);
    let run = validator
        .validate_files(&files, &ValidationOptions::from(config), Some(&progress))
        .await;
    log_validation_complete(&run.summary);

    let generator = ReportGenerator::new(ReportOptions {
        max_broken: config.max_broken,
        color: config.output.is_none() && supports_color(config.no_color),
    });
    if let Err(e) = generator.write_report(&run, config.format, config.output.as_deref()) {
        logging::log_error("Could not write report", Some(&e));
        eprintln!("Error: {e}");
        return Ok(1);
    }

    Ok(if run.has_failures() { 1 } else { 0 })
}

/// Confine link targets to the working directory and the inputs' directories
fn build_security_validator(inputs: &[PathBuf]) -> SecurityValidator {
    let mut security = SecurityValidator::new();

    let mut roots: Vec<PathBuf> = Vec::with_capacity(inputs.len() + 1);
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    roots.extend(inputs.iter().map(|input| input_root(input)));

    for root in roots {
        if let Err(e) = security.add_allowed_root(&root) {
            log::debug!("Skipping allowed root {}: {e}", root.display());
        }
    }
    security
}

fn input_root(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.to_path_buf();
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
