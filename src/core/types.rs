use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::constants::scopes;

static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").expect("valid scheme regex"));

/// The kind of a link, decided purely by the lexical shape of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// A file in the same directory as the source document
    Internal,
    /// A fragment within the source document (`#section`)
    Anchor,
    /// A path with more than one segment (`../guide/intro.md`)
    CrossReference,
    /// A target with a URI scheme (`https://`, `mailto:`)
    External,
}

impl LinkKind {
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Internal,
        LinkKind::Anchor,
        LinkKind::CrossReference,
        LinkKind::External,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Internal => scopes::INTERNAL,
            LinkKind::Anchor => scopes::ANCHOR,
            LinkKind::CrossReference => scopes::CROSS_REFERENCE,
            LinkKind::External => scopes::EXTERNAL,
        }
    }

    /// Human-friendly label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Internal => "Internal",
            LinkKind::Anchor => "Anchor",
            LinkKind::CrossReference => "Cross-reference",
            LinkKind::External => "External",
        }
    }

    /// Classify a raw link target.
    ///
    /// # Examples
    /// ```
    /// use validate_links::core::types::LinkKind;
    ///
    /// assert_eq!(LinkKind::classify("#intro"), LinkKind::Anchor);
    /// assert_eq!(LinkKind::classify("other.md"), LinkKind::Internal);
    /// assert_eq!(LinkKind::classify("path/to/file.md"), LinkKind::CrossReference);
    /// assert_eq!(LinkKind::classify("https://example.com"), LinkKind::External);
    /// ```
    pub fn classify(target: &str) -> LinkKind {
        if target.starts_with('#') {
            LinkKind::Anchor
        } else if target.starts_with("//") || SCHEME_PATTERN.is_match(target) {
            LinkKind::External
        } else if target.contains('/') {
            LinkKind::CrossReference
        } else {
            LinkKind::Internal
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown link kind '{s}'"))
    }
}

/// The subset of link kinds a run considers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkScope {
    all: bool,
    kinds: Vec<LinkKind>,
}

impl LinkScope {
    /// Scope that includes every link kind
    pub fn all() -> Self {
        Self {
            all: true,
            kinds: Vec::new(),
        }
    }

    pub fn from_kinds<I: IntoIterator<Item = LinkKind>>(kinds: I) -> Self {
        let mut scope = Self::default();
        for kind in kinds {
            scope.insert(kind);
        }
        scope
    }

    /// Parse a comma-separated scope list such as `internal,anchor`.
    ///
    /// Segments are trimmed; empty segments are tolerated and select nothing.
    /// The first unrecognised segment is returned as the error.
    pub fn parse(list: &str) -> Result<Self, String> {
        let mut scope = Self::default();
        for segment in list.split(',').map(str::trim) {
            if segment.is_empty() {
                continue;
            }
            if segment == scopes::ALL {
                scope.all = true;
                continue;
            }
            let kind = segment
                .parse::<LinkKind>()
                .map_err(|_| segment.to_string())?;
            scope.insert(kind);
        }
        Ok(scope)
    }

    fn insert(&mut self, kind: LinkKind) {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
    }

    pub fn includes(&self, kind: LinkKind) -> bool {
        self.all || self.kinds.contains(&kind)
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.kinds.is_empty()
    }

    /// The kinds this scope selects, in canonical order
    pub fn kinds(&self) -> Vec<LinkKind> {
        LinkKind::ALL
            .into_iter()
            .filter(|kind| self.includes(*kind))
            .collect()
    }
}

impl fmt::Display for LinkScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all {
            return f.write_str(scopes::ALL);
        }
        if self.kinds.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.kinds.iter().map(LinkKind::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

impl Serialize for LinkScope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.all {
            return serializer.collect_seq([scopes::ALL]);
        }
        serializer.collect_seq(self.kinds.iter().map(LinkKind::as_str))
    }
}

/// Markup the link was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkFormat {
    Markdown,
    Html,
}

/// A reference extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Target exactly as written (`other.md#section`)
    pub raw_target: String,
    /// Link text
    pub text: String,
    pub kind: LinkKind,
    /// Document containing the link
    pub source_file: PathBuf,
    /// Line number where the link was found (1-indexed)
    pub line: u64,
    /// Column where the link starts (1-indexed)
    pub column: u64,
    pub format: LinkFormat,
}

/// Errors that can occur when building a `Link`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Target is missing or empty
    MissingTarget,
    /// Line number is invalid (zero)
    InvalidLineNumber,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => write!(f, "Link target is required and cannot be empty"),
            Self::InvalidLineNumber => write!(f, "Line number must be greater than 0"),
        }
    }
}

impl std::error::Error for LinkError {}

impl Link {
    /// Create a new link, classifying its target.
    pub fn new(
        raw_target: &str,
        text: &str,
        source_file: &Path,
        line: u64,
        column: u64,
        format: LinkFormat,
    ) -> Result<Self, LinkError> {
        let raw_target = raw_target.trim();
        if raw_target.is_empty() {
            return Err(LinkError::MissingTarget);
        }
        if line == 0 {
            return Err(LinkError::InvalidLineNumber);
        }

        Ok(Self {
            raw_target: raw_target.to_string(),
            text: text.trim().to_string(),
            kind: LinkKind::classify(raw_target),
            source_file: source_file.to_path_buf(),
            line,
            column: column.max(1),
            format,
        })
    }

    /// Path part of the target, without query string or fragment
    pub fn path_part(&self) -> &str {
        let end = self
            .raw_target
            .find(['#', '?'])
            .unwrap_or(self.raw_target.len());
        &self.raw_target[..end]
    }

    /// Fragment after `#`, if any
    pub fn fragment(&self) -> Option<&str> {
        self.raw_target
            .split_once('#')
            .map(|(_, fragment)| fragment)
    }
}

/// Result of validating a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub reason: String,
}

impl ValidationOutcome {
    pub fn valid<S: Into<String>>(reason: S) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
        }
    }

    pub fn broken<S: Into<String>>(reason: S) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }
}

/// Per-kind link counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCounts {
    pub internal: usize,
    pub anchor: usize,
    pub cross_reference: usize,
    pub external: usize,
}

impl LinkCounts {
    pub fn increment(&mut self, kind: LinkKind) {
        *self.slot(kind) += 1;
    }

    pub fn get(&self, kind: LinkKind) -> usize {
        match kind {
            LinkKind::Internal => self.internal,
            LinkKind::Anchor => self.anchor,
            LinkKind::CrossReference => self.cross_reference,
            LinkKind::External => self.external,
        }
    }

    pub fn total(&self) -> usize {
        self.internal + self.anchor + self.cross_reference + self.external
    }

    /// Sum of the counters selected by `scope`
    pub fn scoped(&self, scope: &LinkScope) -> usize {
        LinkKind::ALL
            .into_iter()
            .filter(|kind| scope.includes(*kind))
            .map(|kind| self.get(kind))
            .sum()
    }

    pub fn add(&mut self, other: &LinkCounts) {
        for kind in LinkKind::ALL {
            *self.slot(kind) += other.get(kind);
        }
    }

    fn slot(&mut self, kind: LinkKind) -> &mut usize {
        match kind {
            LinkKind::Internal => &mut self.internal,
            LinkKind::Anchor => &mut self.anchor,
            LinkKind::CrossReference => &mut self.cross_reference,
            LinkKind::External => &mut self.external,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_shape() {
        assert_eq!(LinkKind::classify("#section"), LinkKind::Anchor);
        assert_eq!(LinkKind::classify("#"), LinkKind::Anchor);
        assert_eq!(LinkKind::classify("other.md"), LinkKind::Internal);
        assert_eq!(LinkKind::classify("other.md#section"), LinkKind::Internal);
        assert_eq!(LinkKind::classify("../parent.md"), LinkKind::CrossReference);
        assert_eq!(LinkKind::classify("./local.md"), LinkKind::CrossReference);
        assert_eq!(LinkKind::classify("path/to/file.md#anchor"), LinkKind::CrossReference);
        assert_eq!(LinkKind::classify("https://example.com"), LinkKind::External);
        assert_eq!(LinkKind::classify("mailto:test@example.com"), LinkKind::External);
        assert_eq!(LinkKind::classify("//cdn.example.com/x.js"), LinkKind::External);
    }

    #[test]
    fn test_link_kind_round_trips_through_str() {
        for kind in LinkKind::ALL {
            assert_eq!(kind.as_str().parse::<LinkKind>(), Ok(kind));
        }
        assert!("bogus".parse::<LinkKind>().is_err());
    }

    #[test]
    fn test_scope_parse() {
        let scope = LinkScope::parse("internal, anchor").unwrap();
        assert!(scope.includes(LinkKind::Internal));
        assert!(scope.includes(LinkKind::Anchor));
        assert!(!scope.includes(LinkKind::External));
        assert_eq!(scope.to_string(), "internal, anchor");

        let all = LinkScope::parse("all").unwrap();
        assert!(all.is_all());
        assert!(LinkKind::ALL.iter().all(|k| all.includes(*k)));
    }

    #[test]
    fn test_scope_parse_rejects_unknown_segment() {
        assert_eq!(
            LinkScope::parse("internal,invalid_scope"),
            Err("invalid_scope".to_string())
        );
    }

    #[test]
    fn test_scope_parse_tolerates_empty_segments() {
        let scope = LinkScope::parse("internal,,").unwrap();
        assert_eq!(scope.kinds(), vec![LinkKind::Internal]);

        let empty = LinkScope::parse("").unwrap();
        assert!(empty.is_empty());
        assert!(!empty.includes(LinkKind::Internal));
        assert_eq!(empty.to_string(), "none");
    }

    #[test]
    fn test_scope_serializes_as_list() {
        let scope = LinkScope::from_kinds([LinkKind::CrossReference]);
        assert_eq!(
            serde_json::to_string(&scope).unwrap(),
            r#"["cross_reference"]"#
        );
        assert_eq!(serde_json::to_string(&LinkScope::all()).unwrap(), r#"["all"]"#);
    }

    #[test]
    fn test_link_creation_validation() {
        let source = Path::new("docs/index.md");
        assert_eq!(
            Link::new("  ", "text", source, 1, 1, LinkFormat::Markdown),
            Err(LinkError::MissingTarget)
        );
        assert_eq!(
            Link::new("a.md", "text", source, 0, 1, LinkFormat::Markdown),
            Err(LinkError::InvalidLineNumber)
        );

        let link = Link::new(" guide/a.md?x=1#part ", "Guide", source, 3, 5, LinkFormat::Markdown)
            .unwrap();
        assert_eq!(link.raw_target, "guide/a.md?x=1#part");
        assert_eq!(link.kind, LinkKind::CrossReference);
        assert_eq!(link.path_part(), "guide/a.md");
        assert_eq!(link.fragment(), Some("part"));
    }

    #[test]
    fn test_link_counts() {
        let mut counts = LinkCounts::default();
        counts.increment(LinkKind::Internal);
        counts.increment(LinkKind::Internal);
        counts.increment(LinkKind::External);

        assert_eq!(counts.get(LinkKind::Internal), 2);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.scoped(&LinkScope::from_kinds([LinkKind::External])), 1);
        assert_eq!(counts.scoped(&LinkScope::all()), 3);

        let mut sum = LinkCounts::default();
        sum.add(&counts);
        sum.add(&counts);
        assert_eq!(sum.total(), 6);
    }
}
