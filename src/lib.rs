//! Validation of internal, anchor, cross-reference and external links in
//! markdown and HTML documentation.

pub mod config;
pub mod core;
pub mod discovery;
pub mod reporting;
pub mod runner;
pub mod security;
pub mod ui;
pub mod validation;

pub use config::{Config, ConfigLayer, OutputFormat, Verbosity};
pub use core::{Link, LinkKind, LinkScope, Result, ValidateLinksError};
pub use runner::run;
pub use validation::{LinkValidator, ValidateLinks, ValidationOptions, ValidationRun};
