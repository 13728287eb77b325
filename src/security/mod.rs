//! Input sanitization and path confinement
//!
//! Every filesystem target derived from a document and every positional
//! argument passes through `SecurityValidator` before it is used.

use std::path::{Component, Path, PathBuf};

use crate::core::constants::security;
use crate::core::error::{Result, ValidateLinksError};

#[derive(Debug, Clone, Default)]
pub struct SecurityValidator {
    /// Canonical roots a validated path must live under (empty = unrestricted)
    allowed_roots: Vec<PathBuf>,
}

impl SecurityValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict validated paths to `root` (and any other registered root).
    pub fn add_allowed_root<P: AsRef<Path>>(&mut self, root: P) -> Result<()> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| {
            ValidateLinksError::PathRejected(format!(
                "Allowed root '{}' cannot be resolved: {e}",
                root.display()
            ))
        })?;
        if !self.allowed_roots.contains(&canonical) {
            log::debug!("Allowed root: {}", canonical.display());
            self.allowed_roots.push(canonical);
        }
        Ok(())
    }

    pub fn allowed_roots(&self) -> &[PathBuf] {
        &self.allowed_roots
    }

    /// Validate a filesystem path and return its lexically normalized form.
    ///
    /// # Examples
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use validate_links::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::new();
    /// assert_eq!(
    ///     validator.validate_path(Path::new("/docs/guide/../index.md")).unwrap(),
    ///     PathBuf::from("/docs/index.md")
    /// );
    /// assert!(validator.validate_path(Path::new("../../etc/passwd")).is_err());
    /// ```
    pub fn validate_path(&self, path: &Path) -> Result<PathBuf> {
        let raw = path.to_string_lossy();

        if raw.contains('\0') {
            return Err(ValidateLinksError::PathRejected(format!(
                "'{}' contains a null byte",
                raw.replace('\0', "\\0")
            )));
        }
        if let Some(c) = raw
            .chars()
            .find(|c| security::FORBIDDEN_PATH_CHARS.contains(c))
        {
            return Err(ValidateLinksError::PathRejected(format!(
                "'{raw}' contains forbidden character '{c}'"
            )));
        }
        if let Some(name) = reserved_component(path) {
            return Err(ValidateLinksError::PathRejected(format!(
                "'{raw}' uses reserved device name '{name}'"
            )));
        }

        let normalized = normalize_path(path);
        if matches!(normalized.components().next(), Some(Component::ParentDir)) {
            return Err(ValidateLinksError::PathRejected(format!(
                "'{raw}' traverses outside its base directory"
            )));
        }

        if !self.allowed_roots.is_empty() {
            let resolved = resolve_through_existing_ancestor(&normalized);
            if !self
                .allowed_roots
                .iter()
                .any(|root| resolved.starts_with(root))
            {
                return Err(ValidateLinksError::PathRejected(format!(
                    "'{}' is outside the allowed directories",
                    normalized.display()
                )));
            }
        }

        Ok(normalized)
    }

    /// Reject URLs with schemes that execute or embed content.
    pub fn validate_url(&self, url: &str) -> Result<()> {
        let lowered = url.trim().to_ascii_lowercase();

        if let Some(scheme) = security::DANGEROUS_SCHEMES
            .iter()
            .find(|scheme| lowered.starts_with(*scheme))
        {
            return Err(ValidateLinksError::UnsafeUrl(format!(
                "'{url}' uses disallowed scheme '{scheme}'"
            )));
        }

        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            reqwest::Url::parse(url.trim()).map_err(|e| {
                ValidateLinksError::UnsafeUrl(format!("'{url}' is not a valid URL: {e}"))
            })?;
        }

        Ok(())
    }

    /// Reject arguments carrying shell metacharacters; returns the sanitized argument.
    pub fn validate_cli_argument(&self, arg: &str) -> Result<String> {
        if arg.contains("${")
            || arg
                .chars()
                .any(|c| security::SHELL_METACHARACTERS.contains(&c))
        {
            return Err(ValidateLinksError::InvalidArgument(format!(
                "Argument contains potentially dangerous characters: {arg}"
            )));
        }
        Ok(self.sanitize_input(arg))
    }

    /// Strip NUL and control characters (newlines and tabs survive) and trim.
    pub fn sanitize_input(&self, input: &str) -> String {
        input
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// Lexically normalize a path, resolving `.` and `..` without touching the filesystem.
///
/// Leading `..` components of a relative path are kept; `..` at the root is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn reserved_component(path: &Path) -> Option<String> {
    path.components().find_map(|component| {
        let Component::Normal(name) = component else {
            return None;
        };
        let name = name.to_string_lossy();
        let stem = name.split('.').next().unwrap_or_default().to_ascii_uppercase();
        security::RESERVED_NAMES
            .contains(&stem.as_str())
            .then_some(stem)
    })
}

/// Canonicalize the nearest existing ancestor and re-append the missing tail,
/// so targets that do not exist yet can still be checked against the roots.
fn resolve_through_existing_ancestor(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut tail = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(canonical) = current.canonicalize() {
            return tail
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (current.file_name(), current.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name.to_os_string());
                current = parent;
            }
            _ => return absolute,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use std::fs;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d.md")),
            PathBuf::from("/a/c/d.md")
        );
        assert_eq!(normalize_path(Path::new("/../x.md")), PathBuf::from("/x.md"));
        assert_eq!(
            normalize_path(Path::new("a/../../b.md")),
            PathBuf::from("../b.md")
        );
    }

    #[test]
    fn test_validate_path__rejects_dangerous_input() {
        let validator = SecurityValidator::new();

        for bad in ["docs/a\0b.md", "docs/<x>.md", "docs/a|b.md", "docs/*.md", "../up.md"] {
            let err = validator.validate_path(Path::new(bad)).unwrap_err();
            assert!(matches!(err, ValidateLinksError::PathRejected(_)), "{bad}");
        }
    }

    #[test]
    fn test_validate_path__rejects_reserved_names() {
        let validator = SecurityValidator::new();
        assert!(validator.validate_path(Path::new("docs/CON")).is_err());
        assert!(validator.validate_path(Path::new("docs/nul.md")).is_err());
        assert!(validator.validate_path(Path::new("docs/console.md")).is_ok());
    }

    #[test]
    fn test_validate_path__confines_to_allowed_roots() -> TestResult {
        let temp_dir = tempfile::tempdir()?;
        let inside = temp_dir.path().join("inside");
        fs::create_dir_all(&inside)?;

        let mut validator = SecurityValidator::new();
        validator.add_allowed_root(&inside)?;

        // Missing files under the root are still accepted
        assert!(validator.validate_path(&inside.join("missing/new.md")).is_ok());
        assert!(validator.validate_path(&inside.join("../outside.md")).is_err());
        Ok(())
    }

    #[test]
    fn test_add_allowed_root__missing_directory() {
        let mut validator = SecurityValidator::new();
        assert!(
            validator
                .add_allowed_root("/definitely/not/a/real/root")
                .is_err()
        );
        assert!(validator.allowed_roots().is_empty());
    }

    #[test]
    fn test_validate_url() {
        let validator = SecurityValidator::new();

        assert!(validator.validate_url("https://example.com/docs").is_ok());
        assert!(validator.validate_url("mailto:someone@example.com").is_ok());
        assert!(validator.validate_url("#section").is_ok());
        assert!(validator.validate_url("javascript:alert(1)").is_err());
        assert!(validator.validate_url("JavaScript:alert(1)").is_err());
        assert!(validator.validate_url("data:text/html;base64,xx").is_err());
        assert!(validator.validate_url("https://exa mple.com").is_err());
    }

    #[test]
    fn test_validate_cli_argument() {
        let validator = SecurityValidator::new();

        assert_eq!(validator.validate_cli_argument(" docs/ ").unwrap(), "docs/");
        for bad in ["docs; rm -rf /", "a && b", "$(whoami)", "`id`", "${HOME}"] {
            assert!(validator.validate_cli_argument(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_sanitize_input() {
        let validator = SecurityValidator::new();
        assert_eq!(validator.sanitize_input("  a\0b\x07c\td\n "), "abc\td");
    }
}
