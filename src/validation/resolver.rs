use rustc_hash::FxHashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Directory listings cached for the duration of one run.
///
/// Existence is decided by comparing path components against real directory
/// entries, so case sensitivity does not depend on the host filesystem.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    listings: FxHashMap<PathBuf, Option<Vec<OsString>>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&mut self, dir: &Path) -> Option<&[OsString]> {
        self.listings
            .entry(dir.to_path_buf())
            .or_insert_with(|| {
                fs::read_dir(dir).ok().map(|entries| {
                    entries
                        .filter_map(|entry| entry.ok().map(|e| e.file_name()))
                        .collect()
                })
            })
            .as_deref()
    }

    /// Locate `path` on disk, returning the path spelled as it exists.
    ///
    /// With `case_sensitive` every component must match a directory entry
    /// exactly; otherwise an ASCII case-insensitive match is accepted.
    /// `path` is expected to be normalized (no `.` or `..`).
    pub fn locate(&mut self, path: &Path, case_sensitive: bool) -> Option<PathBuf> {
        let mut current = PathBuf::new();

        for component in path.components() {
            let name = match component {
                Component::Normal(name) => name,
                Component::CurDir => continue,
                other => {
                    current.push(other.as_os_str());
                    continue;
                }
            };

            let dir = if current.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                current.clone()
            };
            let Some(entries) = self.entries(&dir) else {
                // Unlistable but traversable directories only support exact lookups
                let candidate = dir.join(name);
                fs::symlink_metadata(&candidate).ok()?;
                current = candidate;
                continue;
            };

            let matched = entries.iter().find(|entry| entry.as_os_str() == name).or_else(|| {
                if case_sensitive {
                    return None;
                }
                let wanted = name.to_string_lossy();
                entries
                    .iter()
                    .find(|entry| entry.to_string_lossy().eq_ignore_ascii_case(&wanted))
            })?;

            current.push(matched);
        }

        (!current.as_os_str().is_empty()).then_some(current)
    }

    pub fn exists(&mut self, path: &Path, case_sensitive: bool) -> bool {
        self.locate(path, case_sensitive).is_some()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_locate__case_handling() -> TestResult {
        let temp_dir = tempfile::tempdir()?;
        let base = temp_dir.path().canonicalize()?;
        fs::create_dir_all(base.join("Guide"))?;
        fs::write(base.join("Guide/Intro.md"), "# Intro")?;

        let mut cache = DirectoryCache::new();

        assert!(cache.exists(&base.join("Guide/Intro.md"), true));
        assert!(!cache.exists(&base.join("guide/intro.md"), true));
        assert_eq!(
            cache.locate(&base.join("guide/intro.md"), false),
            Some(base.join("Guide/Intro.md"))
        );
        assert!(!cache.exists(&base.join("Guide/Missing.md"), false));
        Ok(())
    }

    #[test]
    fn test_locate__directories_and_missing_parents() -> TestResult {
        let temp_dir = tempfile::tempdir()?;
        let base = temp_dir.path().canonicalize()?;
        fs::create_dir_all(base.join("docs"))?;

        let mut cache = DirectoryCache::new();
        assert!(cache.exists(&base.join("docs"), true));
        assert!(!cache.exists(&base.join("nope/file.md"), false));
        Ok(())
    }
}
