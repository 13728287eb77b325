use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::types::{LinkCounts, LinkScope};
use crate::discovery::extractor::{extract_links, load_document};
use crate::validation::results::round_to;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSize {
    pub file: PathBuf,
    pub bytes: u64,
}

/// Structural census of the input set, taken before any validation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PreValidationStats {
    pub total_files: usize,
    pub total_directories: usize,
    pub directories: Vec<PathBuf>,
    pub total_links: usize,
    pub links_by_type: LinkCounts,
    pub scoped_links: usize,
    pub file_sizes: Vec<FileSize>,
    pub total_size: u64,
    /// Bytes, 2 decimals; 0 when no file could be read
    pub average_file_size: f64,
    pub unreadable_files: usize,
}

struct FileCensus {
    links: LinkCounts,
    size: Option<u64>,
}

fn census(file: &Path) -> FileCensus {
    match load_document(file) {
        Ok(content) => {
            let mut links = LinkCounts::default();
            for link in extract_links(&content, file) {
                links.increment(link.kind);
            }
            let size = std::fs::metadata(file)
                .map(|meta| meta.len())
                .unwrap_or(content.len() as u64);
            FileCensus {
                links,
                size: Some(size),
            }
        }
        Err(e) => {
            log::debug!("Census could not read {}: {e}", file.display());
            FileCensus {
                links: LinkCounts::default(),
                size: None,
            }
        }
    }
}

/// Count files, directories and links per kind without validating anything.
///
/// Files are read in parallel; results are folded in input order, so the
/// output is identical across runs.
pub fn collect_statistics(files: &[PathBuf], scope: &LinkScope) -> PreValidationStats {
    let censuses: Vec<FileCensus> = files.par_iter().map(|file| census(file)).collect();

    let mut stats = PreValidationStats {
        total_files: files.len(),
        ..Default::default()
    };
    let mut seen_dirs = FxHashSet::default();

    for (file, census) in files.iter().zip(censuses) {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if seen_dirs.insert(dir.clone()) {
            stats.directories.push(dir);
        }

        stats.links_by_type.add(&census.links);
        match census.size {
            Some(bytes) => {
                stats.total_size += bytes;
                stats.file_sizes.push(FileSize {
                    file: file.clone(),
                    bytes,
                });
            }
            None => stats.unreadable_files += 1,
        }
    }

    stats.total_directories = stats.directories.len();
    stats.total_links = stats.links_by_type.total();
    stats.scoped_links = stats.links_by_type.scoped(scope);
    if !stats.file_sizes.is_empty() {
        stats.average_file_size = round_to(
            stats.total_size as f64 / stats.file_sizes.len() as f64,
            2,
        );
    }

    stats
}
