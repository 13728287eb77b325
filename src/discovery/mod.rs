//! Link discovery and file processing
//!
//! This module handles finding links and headings in documents and
//! expanding input paths into the files to validate.

pub mod anchors;
pub mod extractor;
pub mod path_utils;

// Re-export commonly used items
pub use extractor::{extract_anchors, extract_links, load_document};
pub use path_utils::{DiscoveryOptions, expand_inputs};
