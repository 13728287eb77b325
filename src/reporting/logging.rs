use crate::config::{Config, Verbosity};
use crate::validation::RunSummary;
use log::{debug, error, info, warn};
use std::path::Path;

/// Level filter for a verbosity setting
pub fn level_for(verbosity: Verbosity) -> log::LevelFilter {
    match verbosity {
        Verbosity::Quiet => log::LevelFilter::Error,
        Verbosity::Normal => log::LevelFilter::Warn,
        Verbosity::Verbose => log::LevelFilter::Info,
        Verbosity::Debug => log::LevelFilter::Debug,
    }
}

/// Initialize the logger with appropriate level based on verbosity.
///
/// `RUST_LOG` still applies on top; repeated calls are ignored.
pub fn init_logger(verbosity: Verbosity, no_color: bool) {
    let level = level_for(verbosity);
    let style = if no_color {
        env_logger::WriteStyle::Never
    } else {
        env_logger::WriteStyle::Auto
    };

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(level)
        .write_style(style)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if initialized.is_ok() {
        debug!("Logger initialized with level: {level:?}");
    }
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    info!(
        "Configuration: scope={}, format={}, timeout={}s, check_external={}, case_sensitive={}",
        config.scope, config.format, config.timeout, config.check_external, config.case_sensitive
    );
    info!(
        "Limits: max_broken={}, max_files={}, max_depth={}",
        config.max_broken, config.max_files, config.max_depth
    );
    if let Some(ref path) = config.config_file {
        debug!("Loaded config file: {}", path.display());
    }
}

/// Log file processing information
pub fn log_file_info<P: AsRef<Path>>(files: &[P]) {
    info!("Processing {} file(s)", files.len());
    for (i, file) in files.iter().enumerate() {
        debug!("  {}. {}", i + 1, file.as_ref().display());
    }
}

/// Log validation completion
pub fn log_validation_complete(summary: &RunSummary) {
    let working = summary.total_links - summary.broken_links;
    if summary.broken_links == 0 && summary.files_with_errors == 0 {
        info!(
            "✅ Validation complete: {}/{} links valid in {} file(s) ({:.3}s)",
            working, summary.total_links, summary.files_processed, summary.execution_time
        );
    } else {
        warn!(
            "❌ Validation complete: {}/{} links valid, {} broken, {} unreadable file(s) ({:.3}s)",
            working,
            summary.total_links,
            summary.broken_links,
            summary.files_with_errors,
            summary.execution_time
        );
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(Verbosity::Quiet), log::LevelFilter::Error);
        assert_eq!(level_for(Verbosity::Normal), log::LevelFilter::Warn);
        assert_eq!(level_for(Verbosity::Verbose), log::LevelFilter::Info);
        assert_eq!(level_for(Verbosity::Debug), log::LevelFilter::Debug);
    }

    #[test]
    fn test_logger_initialization_twice() {
        // Second initialization is a no-op rather than a panic
        init_logger(Verbosity::Debug, true);
        init_logger(Verbosity::Quiet, false);
    }

    #[test]
    fn test_log_helpers_do_not_panic() {
        log_config_info(&Config::default());
        log_file_info(&["a.md", "b.md"]);
        log_validation_complete(&RunSummary::default());
        log_validation_complete(&RunSummary {
            total_links: 3,
            broken_links: 1,
            ..Default::default()
        });

        let err = io::Error::new(io::ErrorKind::NotFound, "missing");
        log_error("Could not read", Some(&err));
        log_error("Plain message", None);
    }
}
