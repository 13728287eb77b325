//! GitHub-compatible heading anchors

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\- ]").expect("valid slug regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));

/// Turn heading text into an anchor slug.
///
/// Returns an empty string when nothing sluggable remains.
///
/// # Examples
/// ```
/// use validate_links::discovery::anchors::slugify;
///
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// assert_eq!(slugify("API <code>v2</code> Reference"), "api-v2-reference");
/// ```
pub fn slugify(heading: &str) -> String {
    let text = HTML_TAG.replace_all(heading, "");
    let text = text.to_lowercase();
    let text = NON_SLUG_CHARS.replace_all(&text, "");
    let text = WHITESPACE_RUN.replace_all(&text, "-");
    text.trim_matches('-').to_string()
}

/// Assigns slugs in document order, suffixing repeats with `-1`, `-2`, ...
#[derive(Debug, Default)]
pub struct AnchorGenerator {
    seen: FxHashMap<String, usize>,
}

impl AnchorGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for the next heading, or `None` if the heading yields no slug
    pub fn generate(&mut self, heading: &str) -> Option<String> {
        let base = slugify(heading);
        if base.is_empty() {
            return None;
        }

        match self.seen.get_mut(&base) {
            Some(count) => {
                *count += 1;
                Some(format!("{base}-{count}"))
            }
            None => {
                self.seen.insert(base.clone(), 0);
                Some(base)
            }
        }
    }
}

/// Slugs for a sequence of headings in order
pub fn generate_anchors<'a, I>(headings: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut generator = AnchorGenerator::new();
    headings
        .into_iter()
        .filter_map(|heading| generator.generate(heading))
        .collect()
}
