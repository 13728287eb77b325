use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::types::{Link, LinkCounts, LinkFormat, LinkKind, ValidationOutcome};

/// A validated link as it appears in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub text: String,
    pub target: String,
    pub line: u64,
    pub column: u64,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub format: LinkFormat,
    pub status: String,
}

impl LinkRecord {
    pub fn new(link: &Link, outcome: &ValidationOutcome) -> Self {
        Self {
            text: link.text.clone(),
            target: link.raw_target.clone(),
            line: link.line,
            column: link.column,
            kind: link.kind,
            format: link.format,
            status: outcome.reason.clone(),
        }
    }
}

/// Outcome of scanning one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    /// Links in scope
    pub total_links: usize,
    pub links_by_type: LinkCounts,
    pub broken_links: Vec<LinkRecord>,
    pub working_links: Vec<LinkRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl FileResult {
    pub fn new(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            total_links: 0,
            links_by_type: LinkCounts::default(),
            broken_links: Vec::new(),
            working_links: Vec::new(),
            error: None,
            duration_ms: 0,
        }
    }

    /// Result for a file that could not be read
    pub fn failed(file: &Path, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(file)
        }
    }

    pub fn record(&mut self, link: &Link, outcome: &ValidationOutcome) {
        self.total_links += 1;
        self.links_by_type.increment(link.kind);

        let record = LinkRecord::new(link, outcome);
        if outcome.valid {
            self.working_links.push(record);
        } else {
            self.broken_links.push(record);
        }
    }

    pub fn broken_count(&self) -> usize {
        self.broken_links.len()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Why the run loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    #[default]
    Completed,
    MaxFiles,
    MaxBroken,
}

impl TerminationReason {
    pub fn is_early(&self) -> bool {
        !matches!(self, TerminationReason::Completed)
    }
}

/// Aggregate counters for a run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RunSummary {
    pub total_files: usize,
    pub files_processed: usize,
    pub total_files_available: usize,
    pub total_links: usize,
    pub links_by_type: LinkCounts,
    pub broken_by_type: LinkCounts,
    pub broken_links: usize,
    pub files_with_errors: usize,
    /// Percentage of scoped links that resolved (2 decimals)
    pub success_rate: f64,
    /// Seconds (3 decimals)
    pub execution_time: f64,
    pub termination: TerminationReason,
}

impl RunSummary {
    pub fn new(total_files_available: usize) -> Self {
        Self {
            total_files: total_files_available,
            total_files_available,
            success_rate: 100.0,
            ..Default::default()
        }
    }

    /// Fold a finished file into the counters
    pub fn absorb(&mut self, result: &FileResult) {
        self.files_processed += 1;
        self.total_links += result.total_links;
        self.links_by_type.add(&result.links_by_type);
        self.broken_links += result.broken_count();
        for record in &result.broken_links {
            self.broken_by_type.increment(record.kind);
        }
        if result.has_error() {
            self.files_with_errors += 1;
        }
    }

    pub fn finalize(&mut self, elapsed_secs: f64, termination: TerminationReason) {
        self.success_rate = if self.total_links == 0 {
            100.0
        } else {
            let working = self.total_links - self.broken_links;
            round_to(working as f64 / self.total_links as f64 * 100.0, 2)
        };
        self.execution_time = round_to(elapsed_secs, 3);
        self.termination = termination;
    }
}

/// Complete output of `validate_files`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRun {
    pub summary: RunSummary,
    /// One entry per processed file, in input order
    pub results: Vec<FileResult>,
    pub timestamp: String,
    pub execution_time: f64,
}

impl ValidationRun {
    pub fn result_for(&self, file: &Path) -> Option<&FileResult> {
        self.results.iter().find(|result| result.file == file)
    }

    /// Broken links across all files, in file then document order
    pub fn broken_links(&self) -> impl Iterator<Item = (&Path, &LinkRecord)> {
        self.results.iter().flat_map(|result| {
            result
                .broken_links
                .iter()
                .map(move |record| (result.file.as_path(), record))
        })
    }

    /// A run fails when any link is broken or any file could not be read
    pub fn has_failures(&self) -> bool {
        self.summary.broken_links > 0 || self.summary.files_with_errors > 0
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(target: &str) -> Link {
        Link::new(target, "text", Path::new("a.md"), 1, 1, LinkFormat::Markdown).unwrap()
    }

    #[test]
    fn test_file_result_record() {
        let mut result = FileResult::new(Path::new("a.md"));
        result.record(&link("b.md"), &ValidationOutcome::valid("ok"));
        result.record(&link("#x"), &ValidationOutcome::broken("Anchor not found in file"));

        assert_eq!(result.total_links, 2);
        assert_eq!(result.broken_count(), 1);
        assert_eq!(result.working_links.len(), 1);
        assert_eq!(result.links_by_type.anchor, 1);
        assert_eq!(result.broken_links[0].status, "Anchor not found in file");
    }

    #[test]
    fn test_summary_success_rate() {
        let mut summary = RunSummary::new(1);
        let mut result = FileResult::new(Path::new("a.md"));
        for target in ["a.md", "b.md", "c.md"] {
            result.record(&link(target), &ValidationOutcome::valid("ok"));
        }
        result.record(&link("d.md"), &ValidationOutcome::broken("missing"));
        summary.absorb(&result);
        summary.finalize(0.12345, TerminationReason::Completed);

        assert_eq!(summary.success_rate, 75.0);
        assert_eq!(summary.execution_time, 0.123);
        assert_eq!(summary.broken_by_type.internal, 1);
    }

    #[test]
    fn test_summary_total_files_is_input_count() {
        let mut summary = RunSummary::new(4);
        summary.absorb(&FileResult::new(Path::new("a.md")));
        summary.absorb(&FileResult::new(Path::new("b.md")));

        assert_eq!(summary.total_files, 4);
        assert_eq!(summary.files_processed, 2);
    }

    #[test]
    fn test_summary_without_links_is_fully_successful() {
        let mut summary = RunSummary::new(0);
        summary.finalize(0.0, TerminationReason::Completed);
        assert_eq!(summary.success_rate, 100.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(66.666_666, 2), 66.67);
        assert_eq!(round_to(2.718_28, 3), 2.718);
    }

    #[test]
    fn test_termination_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TerminationReason::MaxBroken).unwrap(),
            "\"max_broken\""
        );
        assert!(TerminationReason::MaxFiles.is_early());
        assert!(!TerminationReason::Completed.is_early());
    }
}
