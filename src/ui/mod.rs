//! User interface and interaction
//!
//! This module contains all components related to user interaction,
//! including CLI parsing, terminal colors, progress reporting and the
//! dry-run preview.

pub mod cli;
pub mod color;
pub mod output;
pub mod progress;

// Re-export commonly used items
pub use cli::{Cli, cli_to_layer, help_text, parse_args};
pub use progress::ProgressReporter;
