/// Application-wide constants to avoid magic values throughout the codebase.
///
/// This module centralizes all magic strings, numbers, and other literal values
/// used across the application, making them easier to maintain and modify.
/// Output format names
pub mod output_formats {
    /// Human-readable, optionally colorized terminal output
    pub const CONSOLE: &str = "console";
    /// Full machine-readable dump of the validation run
    pub const JSON: &str = "json";
    /// Markdown report with a summary table
    pub const MARKDOWN: &str = "markdown";
    /// Self-contained HTML page
    pub const HTML: &str = "html";

    /// Default output format
    pub const DEFAULT: &str = CONSOLE;

    /// All valid output formats
    pub const ALL: [&str; 4] = [CONSOLE, JSON, MARKDOWN, HTML];
}

/// Link scope names accepted by `--scope`
pub mod scopes {
    pub const ALL: &str = "all";
    pub const INTERNAL: &str = "internal";
    pub const ANCHOR: &str = "anchor";
    pub const CROSS_REFERENCE: &str = "cross_reference";
    pub const EXTERNAL: &str = "external";

    /// Every accepted scope value, in the order shown in error messages
    pub const VALID: [&str; 5] = [ALL, INTERNAL, ANCHOR, CROSS_REFERENCE, EXTERNAL];
}

/// Default configuration values
pub mod defaults {
    /// Stop after this many broken links unless overridden (0 = unlimited)
    pub const MAX_BROKEN: u64 = 50;
    /// Unlimited files
    pub const MAX_FILES: u64 = 0;
    /// Unlimited directory depth
    pub const MAX_DEPTH: usize = 0;
    /// External link timeout in seconds
    pub const TIMEOUT_SECONDS: u64 = 30;
}

/// Environment variable names
pub mod env_vars {
    /// Prefix shared by every environment override
    pub const PREFIX: &str = "LINK_VALIDATOR_";

    pub const SCOPE: &str = "LINK_VALIDATOR_SCOPE";
    pub const MAX_BROKEN: &str = "LINK_VALIDATOR_MAX_BROKEN";
    pub const MAX_FILES: &str = "LINK_VALIDATOR_MAX_FILES";
    pub const MAX_DEPTH: &str = "LINK_VALIDATOR_MAX_DEPTH";
    pub const TIMEOUT: &str = "LINK_VALIDATOR_TIMEOUT";
    pub const FORMAT: &str = "LINK_VALIDATOR_FORMAT";
    pub const CHECK_EXTERNAL: &str = "LINK_VALIDATOR_CHECK_EXTERNAL";
    pub const CASE_SENSITIVE: &str = "LINK_VALIDATOR_CASE_SENSITIVE";
    pub const INCLUDE_HIDDEN: &str = "LINK_VALIDATOR_INCLUDE_HIDDEN";
    pub const ONLY_HIDDEN: &str = "LINK_VALIDATOR_ONLY_HIDDEN";
    pub const NO_COLOR: &str = "LINK_VALIDATOR_NO_COLOR";
    pub const DRY_RUN: &str = "LINK_VALIDATOR_DRY_RUN";
}

/// File processing constants
pub mod files {
    /// Extensions of documents that are scanned when walking directories
    pub const TEXT_EXTENSIONS: [&str; 8] = [
        "md", "markdown", "txt", "html", "htm", "rst", "adoc", "asciidoc",
    ];
    /// Files listed in the dry-run preview before truncating
    pub const PREVIEW_SAMPLE_SIZE: usize = 5;
}

/// External link checking constants
pub mod http {
    /// Maximum redirects followed for a single external link
    pub const MAX_REDIRECTS: usize = 5;
    /// Upper bound on concurrent requests for links within one file
    pub const MAX_CONCURRENT_CHECKS: usize = 8;
    /// User agent sent with every request
    pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
}

/// Security constants
pub mod security {
    /// URL schemes that are never followed
    pub const DANGEROUS_SCHEMES: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];
    /// Characters that may not appear in a resolved link target
    pub const FORBIDDEN_PATH_CHARS: [char; 6] = ['<', '>', '"', '|', '*', '?'];
    /// Windows device names that may not be used as a file stem
    pub const RESERVED_NAMES: [&str; 22] = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    /// Shell metacharacters rejected in positional arguments
    pub const SHELL_METACHARACTERS: [char; 7] = [';', '&', '|', '`', '$', '(', ')'];
}

/// Validation status messages
pub mod messages {
    pub const INTERNAL_VALID: &str = "Internal link valid";
    pub const INTERNAL_NOT_FOUND: &str = "Internal link target not found";
    pub const CROSS_REFERENCE_VALID: &str = "Cross-reference link valid";
    pub const CROSS_REFERENCE_NOT_FOUND: &str = "Cross-reference target file not found";
    pub const ANCHOR_VALID: &str = "Anchor link valid";
    pub const ANCHOR_EMPTY: &str = "Empty anchor (top of page)";
    pub const ANCHOR_NOT_FOUND: &str = "Anchor not found in file";
    pub const ANCHOR_NOT_FOUND_IN_TARGET: &str = "Anchor not found in target file";
    pub const EXTERNAL_SKIPPED: &str = "External link validation skipped";
    pub const EXTERNAL_NON_HTTP: &str = "Non-HTTP external link not checked";
    pub const EXTERNAL_CONNECT_FAILED: &str = "Failed to connect to external URL";
}

/// Display and formatting constants
pub mod display {
    pub const SUCCESS_EMOJI: &str = "✅";
    pub const WARNING_EMOJI: &str = "⚠️";
    pub const ERROR_EMOJI: &str = "❌";
    pub const FILE_EMOJI: &str = "📄";
    pub const LINK_EMOJI: &str = "🔗";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_formats_constants() {
        assert_eq!(output_formats::DEFAULT, "console");
        assert_eq!(output_formats::ALL.len(), 4);
        assert!(output_formats::ALL.contains(&output_formats::HTML));
    }

    #[test]
    fn test_env_vars_share_prefix() {
        for name in [
            env_vars::SCOPE,
            env_vars::MAX_BROKEN,
            env_vars::MAX_FILES,
            env_vars::MAX_DEPTH,
            env_vars::TIMEOUT,
            env_vars::FORMAT,
            env_vars::CHECK_EXTERNAL,
            env_vars::CASE_SENSITIVE,
            env_vars::INCLUDE_HIDDEN,
            env_vars::ONLY_HIDDEN,
            env_vars::NO_COLOR,
            env_vars::DRY_RUN,
        ] {
            assert!(name.starts_with(env_vars::PREFIX), "{name}");
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(defaults::MAX_BROKEN, 50);
        assert_eq!(defaults::MAX_FILES, 0);
        assert_eq!(defaults::TIMEOUT_SECONDS, 30);
    }
}
