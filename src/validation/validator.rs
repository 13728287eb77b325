use async_trait::async_trait;
use futures::{StreamExt, stream};
use percent_encoding::percent_decode_str;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::core::constants::{http, messages};
use crate::core::types::{Link, LinkKind, LinkScope, ValidationOutcome};
use crate::discovery::extractor::{extract_anchors, extract_links, load_document};
use crate::security::{SecurityValidator, normalize_path};
use crate::ui::progress::ProgressReporter;
use crate::validation::external::{ExternalChecker, HttpChecker};
use crate::validation::resolver::DirectoryCache;
use crate::validation::results::{FileResult, RunSummary, TerminationReason, ValidationRun};
use crate::validation::statistics::{PreValidationStats, collect_statistics};

/// Options that drive a single validation run
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOptions {
    pub scope: LinkScope,
    pub check_external: bool,
    pub case_sensitive: bool,
    pub timeout_seconds: u64,
    /// 0 = unlimited
    pub max_broken: u64,
    /// 0 = unlimited
    pub max_files: u64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ValidationOptions {
    fn from(config: &Config) -> Self {
        Self {
            scope: config.scope.clone(),
            check_external: config.check_external,
            case_sensitive: config.case_sensitive,
            timeout_seconds: config.timeout,
            max_broken: config.max_broken,
            max_files: config.max_files,
        }
    }
}

impl ValidationOptions {
    /// First satisfied stop condition, broken-link limit first
    fn termination(&self, summary: &RunSummary) -> Option<TerminationReason> {
        if self.max_broken > 0 && summary.broken_links as u64 >= self.max_broken {
            Some(TerminationReason::MaxBroken)
        } else if self.max_files > 0 && summary.files_processed as u64 >= self.max_files {
            Some(TerminationReason::MaxFiles)
        } else {
            None
        }
    }
}

#[async_trait]
pub trait ValidateLinks {
    /// Census of the inputs without validating anything
    fn collect_statistics(&self, files: &[PathBuf], scope: &LinkScope) -> PreValidationStats;

    /// Validate every in-scope link of `files`, in order, honoring the stop limits
    async fn validate_files(
        &self,
        files: &[PathBuf],
        options: &ValidationOptions,
        progress: Option<&ProgressReporter>,
    ) -> ValidationRun;
}

#[derive(Default)]
pub struct LinkValidator {
    security: SecurityValidator,
    checker: Option<Arc<dyn ExternalChecker>>,
}

impl std::fmt::Debug for LinkValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkValidator")
            .field("security", &self.security)
            .field("custom_checker", &self.checker.is_some())
            .finish()
    }
}

/// Caches owned by one run
#[derive(Default)]
struct RunState {
    directories: DirectoryCache,
    anchors: FxHashMap<PathBuf, Option<FxHashSet<String>>>,
}

impl RunState {
    fn anchors_for(&mut self, document: &Path) -> Option<&FxHashSet<String>> {
        self.anchors
            .entry(document.to_path_buf())
            .or_insert_with(|| {
                load_document(document)
                    .ok()
                    .map(|content| extract_anchors(&content))
            })
            .as_ref()
    }
}

#[async_trait]
impl ValidateLinks for LinkValidator {
    fn collect_statistics(&self, files: &[PathBuf], scope: &LinkScope) -> PreValidationStats {
        collect_statistics(files, scope)
    }

    async fn validate_files(
        &self,
        files: &[PathBuf],
        options: &ValidationOptions,
        progress: Option<&ProgressReporter>,
    ) -> ValidationRun {
        let started = Instant::now();
        let timestamp = chrono::Local::now().to_rfc3339();
        let checker = self.external_checker(options);

        let mut state = RunState::default();
        let mut summary = RunSummary::new(files.len());
        let mut results = Vec::with_capacity(files.len());
        let mut termination = TerminationReason::Completed;

        for (index, file) in files.iter().enumerate() {
            if let Some(progress) = progress {
                progress.start_file(file);
            }

            let result = self
                .validate_file(file, options, &mut state, checker.as_deref())
                .await;
            summary.absorb(&result);

            match result.error {
                Some(ref error) => log::warn!("{}: {error}", file.display()),
                None => log::info!(
                    "{}: {} link(s), {} broken",
                    file.display(),
                    result.total_links,
                    result.broken_count()
                ),
            }
            results.push(result);

            if let Some(progress) = progress {
                progress.file_done();
            }

            let remaining = files.len() - (index + 1);
            if remaining > 0
                && let Some(reason) = options.termination(&summary)
            {
                log::warn!(
                    "Stopping early ({}): {} broken link(s) after {} of {} file(s)",
                    match reason {
                        TerminationReason::MaxBroken => "max broken links reached",
                        _ => "max files reached",
                    },
                    summary.broken_links,
                    summary.files_processed,
                    files.len()
                );
                termination = reason;
                break;
            }
        }

        if let Some(progress) = progress {
            progress.finish(summary.files_processed, files.len());
        }

        let elapsed = started.elapsed().as_secs_f64();
        summary.finalize(elapsed, termination);
        let execution_time = summary.execution_time;

        ValidationRun {
            summary,
            results,
            timestamp,
            execution_time,
        }
    }
}

impl LinkValidator {
    pub fn new(security: SecurityValidator) -> Self {
        Self {
            security,
            checker: None,
        }
    }

    /// Use `checker` for external links instead of the default HTTP client
    pub fn with_checker(mut self, checker: Arc<dyn ExternalChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    fn external_checker(&self, options: &ValidationOptions) -> Option<Arc<dyn ExternalChecker>> {
        if !options.check_external {
            return None;
        }
        if let Some(ref checker) = self.checker {
            return Some(Arc::clone(checker));
        }
        match HttpChecker::new(Duration::from_secs(options.timeout_seconds)) {
            Ok(checker) => Some(Arc::new(checker)),
            Err(e) => {
                log::error!("Could not build HTTP client: {e}");
                None
            }
        }
    }

    async fn validate_file(
        &self,
        file: &Path,
        options: &ValidationOptions,
        state: &mut RunState,
        checker: Option<&dyn ExternalChecker>,
    ) -> FileResult {
        let started = Instant::now();

        let content = match load_document(file) {
            Ok(content) => content,
            Err(e) => {
                let mut result = FileResult::failed(file, format!("Cannot read file: {e}"));
                result.duration_ms = started.elapsed().as_millis() as u64;
                return result;
            }
        };

        let links: Vec<Link> = extract_links(&content, file)
            .into_iter()
            .filter(|link| options.scope.includes(link.kind))
            .collect();
        let source_dir = absolute_parent(file);

        let mut outcomes: Vec<Option<ValidationOutcome>> = vec![None; links.len()];
        let mut own_anchors: Option<FxHashSet<String>> = None;

        for (slot, link) in outcomes.iter_mut().zip(&links) {
            *slot = match link.kind {
                LinkKind::External => continue,
                LinkKind::Anchor => {
                    let anchors = own_anchors.get_or_insert_with(|| extract_anchors(&content));
                    Some(check_anchor(link, anchors, options.case_sensitive))
                }
                LinkKind::Internal | LinkKind::CrossReference => {
                    Some(self.check_file_link(link, &source_dir, options, state))
                }
            };
        }

        let external: Vec<(usize, String)> = links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.kind == LinkKind::External)
            .map(|(index, link)| (index, link.raw_target.clone()))
            .collect();

        let checked: Vec<(usize, ValidationOutcome)> = stream::iter(external)
            .map(|(index, url)| async move {
                (index, self.check_external(&url, options, checker).await)
            })
            .buffered(external_concurrency())
            .collect()
            .await;

        for (index, outcome) in checked {
            outcomes[index] = Some(outcome);
        }

        let mut result = FileResult::new(file);
        for (link, outcome) in links.iter().zip(outcomes) {
            if let Some(outcome) = outcome {
                if !outcome.valid {
                    log::debug!(
                        "{}:{}:{} broken {} link '{}': {}",
                        file.display(),
                        link.line,
                        link.column,
                        link.kind,
                        link.raw_target,
                        outcome.reason
                    );
                }
                result.record(link, &outcome);
            }
        }
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }

    fn check_file_link(
        &self,
        link: &Link,
        source_dir: &Path,
        options: &ValidationOptions,
        state: &mut RunState,
    ) -> ValidationOutcome {
        let (valid_message, missing_message) = match link.kind {
            LinkKind::CrossReference => (
                messages::CROSS_REFERENCE_VALID,
                messages::CROSS_REFERENCE_NOT_FOUND,
            ),
            _ => (messages::INTERNAL_VALID, messages::INTERNAL_NOT_FOUND),
        };

        let path_part = percent_decode(link.path_part());
        // Root-relative targets resolve against the source directory
        let relative = path_part.trim_start_matches('/');
        let candidate = if relative.is_empty() {
            source_dir.join(link.source_file.file_name().unwrap_or_default())
        } else {
            source_dir.join(relative)
        };

        let resolved = match self.security.validate_path(&candidate) {
            Ok(resolved) => resolved,
            Err(e) => return ValidationOutcome::broken(e.to_string()),
        };

        let Some(located) = state.directories.locate(&resolved, options.case_sensitive) else {
            return ValidationOutcome::broken(missing_message);
        };

        match link.fragment() {
            Some(fragment) if !fragment.is_empty() => match state.anchors_for(&located) {
                Some(anchors) if contains_anchor(anchors, fragment, options.case_sensitive) => {
                    ValidationOutcome::valid(valid_message)
                }
                _ => ValidationOutcome::broken(messages::ANCHOR_NOT_FOUND_IN_TARGET),
            },
            _ => ValidationOutcome::valid(valid_message),
        }
    }

    async fn check_external(
        &self,
        url: &str,
        options: &ValidationOptions,
        checker: Option<&dyn ExternalChecker>,
    ) -> ValidationOutcome {
        if !options.check_external {
            return ValidationOutcome::valid(messages::EXTERNAL_SKIPPED);
        }
        if let Err(e) = self.security.validate_url(url) {
            return ValidationOutcome::broken(e.to_string());
        }

        let url = match url.strip_prefix("//") {
            Some(rest) => format!("https://{rest}"),
            None => url.to_string(),
        };
        let lowered = url.to_ascii_lowercase();
        if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
            return ValidationOutcome::valid(messages::EXTERNAL_NON_HTTP);
        }

        match checker {
            Some(checker) => checker.check(&url).await,
            None => ValidationOutcome::broken(format!(
                "{}: HTTP client unavailable",
                messages::EXTERNAL_CONNECT_FAILED
            )),
        }
    }
}

/// Concurrent external checks per file, bounded by the CPU count
fn external_concurrency() -> usize {
    num_cpus::get().clamp(1, http::MAX_CONCURRENT_CHECKS)
}

fn check_anchor(link: &Link, anchors: &FxHashSet<String>, case_sensitive: bool) -> ValidationOutcome {
    let fragment = link.raw_target.trim_start_matches('#');
    if fragment.is_empty() {
        return ValidationOutcome::valid(messages::ANCHOR_EMPTY);
    }
    if contains_anchor(anchors, fragment, case_sensitive) {
        ValidationOutcome::valid(messages::ANCHOR_VALID)
    } else {
        ValidationOutcome::broken(messages::ANCHOR_NOT_FOUND)
    }
}

fn contains_anchor(anchors: &FxHashSet<String>, fragment: &str, case_sensitive: bool) -> bool {
    let fragment = percent_decode(fragment);
    if anchors.contains(&fragment) {
        return true;
    }
    if case_sensitive {
        return false;
    }
    let wanted = fragment.to_lowercase();
    anchors.iter().any(|anchor| anchor.to_lowercase() == wanted)
}

/// Decode `%XX` escapes; malformed escapes are kept verbatim
fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// Absolute, normalized directory containing `file`
fn absolute_parent(file: &Path) -> PathBuf {
    let absolute = std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf());
    let normalized = normalize_path(&absolute);
    normalized
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(normalized)
}
