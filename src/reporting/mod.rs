//! Reporting and logging
//!
//! This module renders finished validation runs in every output format
//! and sets up structured logging for the application.

pub mod logging;
pub mod report;

// Re-export commonly used items
pub use logging::init_logger;
pub use report::{ReportGenerator, ReportOptions};
