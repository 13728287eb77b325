//! Link validation logic
//!
//! This module runs the per-file validation loop, resolves filesystem
//! targets and checks external links over HTTP.

pub mod external;
pub mod resolver;
pub mod results;
pub mod statistics;
pub mod validator;

// Re-export commonly used items
pub use external::{ExternalChecker, HttpChecker};
pub use results::{FileResult, LinkRecord, RunSummary, TerminationReason, ValidationRun};
pub use statistics::{PreValidationStats, collect_statistics};
pub use validator::{LinkValidator, ValidateLinks, ValidationOptions};
