use std::fmt;

/// Error types for validate-links operations
#[derive(Debug)]
pub enum ValidateLinksError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration file error
    Config(String),

    /// Invalid CLI argument or environment value
    InvalidArgument(String),

    /// Path rejected by the security validator
    PathRejected(String),

    /// URL rejected by the security validator
    UnsafeUrl(String),

    /// HTTP client error
    Http(reqwest::Error),

    /// Regex compilation error
    Regex(regex::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// JSON serialization error
    Json(serde_json::Error),

    /// File walking/ignore error
    FileWalking(ignore::Error),
}

impl fmt::Display for ValidateLinksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateLinksError::Io(err) => write!(f, "IO error: {err}"),
            ValidateLinksError::Config(msg) => write!(f, "Configuration error: {msg}"),
            ValidateLinksError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            ValidateLinksError::PathRejected(msg) => write!(f, "Path rejected: {msg}"),
            ValidateLinksError::UnsafeUrl(msg) => write!(f, "Unsafe URL: {msg}"),
            ValidateLinksError::Http(err) => write!(f, "HTTP error: {err}"),
            ValidateLinksError::Regex(err) => write!(f, "Regex error: {err}"),
            ValidateLinksError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            ValidateLinksError::Json(err) => write!(f, "JSON error: {err}"),
            ValidateLinksError::FileWalking(err) => write!(f, "File walking error: {err}"),
        }
    }
}

impl std::error::Error for ValidateLinksError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidateLinksError::Io(err) => Some(err),
            ValidateLinksError::Http(err) => Some(err),
            ValidateLinksError::Regex(err) => Some(err),
            ValidateLinksError::TomlParsing(err) => Some(err),
            ValidateLinksError::Json(err) => Some(err),
            ValidateLinksError::FileWalking(err) => Some(err),
            _ => None,
        }
    }
}

impl ValidateLinksError {
    /// Whether this error stems from user-supplied configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ValidateLinksError::Config(_)
                | ValidateLinksError::InvalidArgument(_)
                | ValidateLinksError::TomlParsing(_)
        )
    }
}

impl From<std::io::Error> for ValidateLinksError {
    fn from(err: std::io::Error) -> Self {
        ValidateLinksError::Io(err)
    }
}

impl From<reqwest::Error> for ValidateLinksError {
    fn from(err: reqwest::Error) -> Self {
        ValidateLinksError::Http(err)
    }
}

impl From<regex::Error> for ValidateLinksError {
    fn from(err: regex::Error) -> Self {
        ValidateLinksError::Regex(err)
    }
}

impl From<toml::de::Error> for ValidateLinksError {
    fn from(err: toml::de::Error) -> Self {
        ValidateLinksError::TomlParsing(err)
    }
}

impl From<serde_json::Error> for ValidateLinksError {
    fn from(err: serde_json::Error) -> Self {
        ValidateLinksError::Json(err)
    }
}

impl From<ignore::Error> for ValidateLinksError {
    fn from(err: ignore::Error) -> Self {
        ValidateLinksError::FileWalking(err)
    }
}

/// Type alias for Results using ValidateLinksError
pub type Result<T> = std::result::Result<T, ValidateLinksError>;
