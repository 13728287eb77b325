use memchr::{memchr, memchr_iter};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::core::types::{Link, LinkFormat};
use crate::discovery::anchors::AnchorGenerator;

use std::{fs, io, path::Path};

static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("Failed to compile markdown link pattern")
});

static HTML_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\s+[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>([^<]*)</a>"#)
        .expect("Failed to compile HTML link pattern")
});

static MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*\r?$")
        .expect("Failed to compile heading pattern")
});

static HTML_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h[1-6](?:\s[^>]*)?>(.*?)</h[1-6]>")
        .expect("Failed to compile HTML heading pattern")
});

static EXPLICIT_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<[a-z][a-z0-9]*\s[^>]*?\b(?:id|name)\s*=\s*["']([^"']+)["']"#)
        .expect("Failed to compile anchor attribute pattern")
});

/// Read a document as text.
///
/// Binary content (anything containing a NUL byte) reads as an empty document;
/// invalid UTF-8 is replaced rather than rejected.
pub fn load_document(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    if is_binary(&bytes) {
        log::debug!("Treating {} as binary", path.display());
        return Ok(String::new());
    }
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned()))
}

pub fn is_binary(bytes: &[u8]) -> bool {
    memchr(0, bytes).is_some()
}

/// Byte offsets where each line starts, for mapping match offsets to positions
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = Vec::with_capacity(content.len() / 40 + 1);
        starts.push(0);
        starts.extend(memchr_iter(b'\n', content.as_bytes()).map(|pos| pos + 1));
        Self { starts }
    }

    /// 1-based line and column (in characters) of a byte offset
    fn position(&self, content: &str, offset: usize) -> (u64, u64) {
        let line_idx = match self.starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.starts[line_idx];
        let column = content[line_start..offset].chars().count() + 1;
        (line_idx as u64 + 1, column as u64)
    }
}

/// Extract every markdown and HTML link in `content`, in document order.
pub fn extract_links(content: &str, source: &Path) -> Vec<Link> {
    if content.is_empty() || is_binary(content.as_bytes()) {
        return Vec::new();
    }

    let index = LineIndex::new(content);
    let mut found: Vec<(usize, Link)> = Vec::new();

    let mut push = |offset: usize, target: &str, text: &str, format: LinkFormat| {
        let (line, column) = index.position(content, offset);
        match Link::new(target, text, source, line, column, format) {
            Ok(link) => found.push((offset, link)),
            Err(e) => log::debug!("{}:{line}: skipping link: {e}", source.display()),
        }
    };

    for caps in MARKDOWN_LINK.captures_iter(content) {
        let (Some(whole), Some(text), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        push(
            whole.start(),
            &clean_markdown_target(target.as_str()),
            text.as_str(),
            LinkFormat::Markdown,
        );
    }

    for caps in HTML_LINK.captures_iter(content) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let text = caps.get(2).map_or("", |m| m.as_str());
        push(whole.start(), target.as_str(), text, LinkFormat::Html);
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, link)| link).collect()
}

/// Strip `<...>` wrapping and an optional title from a markdown link destination
fn clean_markdown_target(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('<')
        && let Some(end) = rest.find('>')
    {
        return rest[..end].trim().to_string();
    }
    trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Heading texts in document order, markdown and HTML interleaved
pub fn extract_headings(content: &str) -> Vec<String> {
    let mut headings: Vec<(usize, String)> = MARKDOWN_HEADING
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.as_str().trim().to_string())))
        .collect();

    headings.extend(
        HTML_HEADING
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.as_str().trim().to_string()))),
    );

    headings.sort_by_key(|(offset, _)| *offset);
    headings.into_iter().map(|(_, text)| text).collect()
}

/// Every anchor a fragment may point at: heading slugs plus explicit `id`/`name` attributes
pub fn extract_anchors(content: &str) -> FxHashSet<String> {
    let mut generator = AnchorGenerator::new();
    let mut anchors: FxHashSet<String> = extract_headings(content)
        .iter()
        .filter_map(|heading| generator.generate(heading))
        .collect();

    anchors.extend(
        EXPLICIT_ANCHOR
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
            .filter(|anchor| !anchor.is_empty()),
    );

    anchors
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::core::types::LinkKind;
    use std::io::Write;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn links(content: &str) -> Vec<Link> {
        extract_links(content, Path::new("docs/index.md"))
    }

    #[test]
    fn test_extract_links__one_of_each_kind() {
        let content = "# Intro\n\n[Same dir](other.md) and [Section](#intro)\n[Deep](path/to/file.md)\n[Ext](https://example.com)\n";
        let found = links(content);

        let kinds: Vec<LinkKind> = found.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LinkKind::Internal,
                LinkKind::Anchor,
                LinkKind::CrossReference,
                LinkKind::External
            ]
        );
        assert_eq!(found[0].text, "Same dir");
        assert_eq!((found[0].line, found[0].column), (3, 1));
        assert_eq!((found[1].line, found[1].column), (3, 26));
        assert_eq!(found[3].line, 5);
    }

    #[test]
    fn test_extract_links__html_anchor_tags() {
        let content = r#"<p>See <a class="x" href="guide/setup.html">the guide</a></p>"#;
        let found = links(content);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_target, "guide/setup.html");
        assert_eq!(found[0].text, "the guide");
        assert_eq!(found[0].format, LinkFormat::Html);
        assert_eq!(found[0].column, 8);
    }

    #[test]
    fn test_extract_links__titles_and_angle_brackets() {
        let found = links("[a](<my file.md>) [b](b.md \"Title\") ![img](img/logo.png)");
        let targets: Vec<&str> = found.iter().map(|l| l.raw_target.as_str()).collect();
        assert_eq!(targets, vec!["my file.md", "b.md", "img/logo.png"]);
    }

    #[test]
    fn test_extract_links__skips_blank_targets() {
        assert!(links("[empty]( )").is_empty());
    }

    #[test]
    fn test_extract_links__binary_content() {
        assert!(links("[a](b.md)\0\0").is_empty());
    }

    #[test]
    fn test_extract_links__multibyte_columns() {
        let found = links("héllo [x](y.md)");
        assert_eq!(found[0].column, 7);
    }

    #[test]
    fn test_extract_headings() {
        let content = "# Title\n## Section Two ##\n<h3 id=\"x\">HTML <em>Heading</em></h3>\n#not-a-heading\n## C#\n";
        assert_eq!(
            extract_headings(content),
            vec!["Title", "Section Two", "HTML <em>Heading</em>", "C#"]
        );
    }

    #[test]
    fn test_extract_anchors__slugs_duplicates_and_ids() {
        let content = "# Setup\n## Setup\n<a name=\"legacy-anchor\"></a>\n<div id=\"custom\">x</div>\n";
        let anchors = extract_anchors(content);

        for expected in ["setup", "setup-1", "legacy-anchor", "custom"] {
            assert!(anchors.contains(expected), "{expected}");
        }
        assert_eq!(anchors.len(), 4);
    }

    #[test]
    fn test_extract_headings__crlf() {
        assert_eq!(extract_headings("# Windows\r\nbody\r\n"), vec!["Windows"]);
    }

    #[test]
    fn test_load_document() -> TestResult {
        let mut text = tempfile::NamedTempFile::new()?;
        text.write_all(b"# Hello\n")?;
        assert_eq!(load_document(text.path())?, "# Hello\n");

        let mut binary = tempfile::NamedTempFile::new()?;
        binary.write_all(&[0x89, b'P', b'N', b'G', 0, 1, 2])?;
        assert_eq!(load_document(binary.path())?, "");

        assert!(load_document(Path::new("/no/such/file.md")).is_err());
        Ok(())
    }
}
