use ignore::overrides::OverrideBuilder;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core::constants::files;
use crate::core::error::Result;

/// Filters applied while walking directory inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// 0 = unlimited; 1 = only the directory's own entries
    pub max_depth: usize,
    pub include_hidden: bool,
    pub only_hidden: bool,
    /// Glob patterns; a pattern without `/` matches file names at any depth
    pub exclude_patterns: Vec<String>,
}

impl From<&Config> for DiscoveryOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_depth: config.max_depth,
            include_hidden: config.include_hidden,
            only_hidden: config.only_hidden,
            exclude_patterns: config.exclude_patterns.clone(),
        }
    }
}

impl DiscoveryOptions {
    fn accepts_name(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));

        if self.only_hidden {
            hidden
        } else {
            self.include_hidden || !hidden
        }
    }
}

/// Whether `path` has one of the documentation extensions that are scanned
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            files::TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Expand inputs into the list of files to validate.
///
/// Directories are walked in file-name order. Anything else is passed through
/// unchanged, so a missing file surfaces later as a per-file error.
pub fn expand_inputs(inputs: &[PathBuf], options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    let mut seen = FxHashSet::default();
    let mut result_paths = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            if seen.insert(input.clone()) {
                result_paths.push(input.clone());
            }
            continue;
        }

        let mut overrides = OverrideBuilder::new(input);
        for pattern in &options.exclude_patterns {
            overrides.add(&format!("!{pattern}"))?;
        }

        let mut builder = ignore::WalkBuilder::new(input);
        builder
            .standard_filters(false)
            .overrides(overrides.build()?)
            .max_depth((options.max_depth > 0).then_some(options.max_depth))
            .sort_by_file_name(|a, b| a.cmp(b));

        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry under {}: {err}", input.display());
                    continue;
                }
            };

            let path = entry.path();
            let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
            if !is_file || !options.accepts_name(path) || !is_text_file(path) {
                continue;
            }

            if seen.insert(path.to_path_buf()) {
                result_paths.push(path.to_path_buf());
            }
        }
    }

    log::debug!("Discovered {} file(s)", result_paths.len());
    Ok(result_paths)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn create_test_structure() -> std::result::Result<TempDir, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let base = temp_dir.path();

        fs::create_dir_all(base.join("guide/nested"))?;
        fs::create_dir_all(base.join("drafts"))?;

        fs::write(base.join("README.md"), "# Readme")?;
        fs::write(base.join("notes.txt"), "notes")?;
        fs::write(base.join("script.sh"), "#!/bin/sh")?;
        fs::write(base.join(".hidden.md"), "# Hidden")?;
        fs::write(base.join("guide/intro.MD"), "# Intro")?;
        fs::write(base.join("guide/nested/deep.html"), "<h1>Deep</h1>")?;
        fs::write(base.join("drafts/wip.md"), "# WIP")?;

        Ok(temp_dir)
    }

    fn names(base: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(base)
                    .unwrap_or(p)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_expand_inputs__walks_text_files_in_order() -> TestResult {
        let temp_dir = create_test_structure()?;
        let base = temp_dir.path();

        let found = expand_inputs(&[base.to_path_buf()], &DiscoveryOptions::default())?;

        assert_eq!(
            names(base, &found),
            vec![
                "README.md",
                "drafts/wip.md",
                "guide/intro.MD",
                "guide/nested/deep.html",
                "notes.txt"
            ]
        );
        Ok(())
    }

    #[test]
    fn test_expand_inputs__max_depth() -> TestResult {
        let temp_dir = create_test_structure()?;
        let base = temp_dir.path();

        let options = DiscoveryOptions {
            max_depth: 1,
            ..Default::default()
        };
        let found = expand_inputs(&[base.to_path_buf()], &options)?;
        assert_eq!(names(base, &found), vec!["README.md", "notes.txt"]);

        let options = DiscoveryOptions {
            max_depth: 2,
            ..Default::default()
        };
        let found = expand_inputs(&[base.to_path_buf()], &options)?;
        assert_eq!(found.len(), 4);
        Ok(())
    }

    #[test]
    fn test_expand_inputs__hidden_files() -> TestResult {
        let temp_dir = create_test_structure()?;
        let base = temp_dir.path();
        let root = [base.to_path_buf()];

        let include = DiscoveryOptions {
            include_hidden: true,
            ..Default::default()
        };
        assert!(names(base, &expand_inputs(&root, &include)?).contains(&".hidden.md".to_string()));

        let only = DiscoveryOptions {
            only_hidden: true,
            ..Default::default()
        };
        assert_eq!(names(base, &expand_inputs(&root, &only)?), vec![".hidden.md"]);
        Ok(())
    }

    #[test]
    fn test_expand_inputs__exclude_patterns() -> TestResult {
        let temp_dir = create_test_structure()?;
        let base = temp_dir.path();

        let options = DiscoveryOptions {
            exclude_patterns: vec!["drafts".to_string(), "*.txt".to_string()],
            ..Default::default()
        };
        let found = expand_inputs(&[base.to_path_buf()], &options)?;

        assert_eq!(
            names(base, &found),
            vec!["README.md", "guide/intro.MD", "guide/nested/deep.html"]
        );
        Ok(())
    }

    #[test]
    fn test_expand_inputs__files_pass_through() -> TestResult {
        let temp_dir = create_test_structure()?;
        let script = temp_dir.path().join("script.sh");
        let missing = temp_dir.path().join("missing.md");

        let found = expand_inputs(
            &[script.clone(), missing.clone(), script.clone()],
            &DiscoveryOptions::default(),
        )?;
        assert_eq!(found, vec![script, missing]);
        Ok(())
    }

    #[test]
    fn test_is_text_file() {
        assert!(is_text_file(Path::new("a.md")));
        assert!(is_text_file(Path::new("a.AsciiDoc")));
        assert!(!is_text_file(Path::new("a.rs")));
        assert!(!is_text_file(Path::new("Makefile")));
    }
}
