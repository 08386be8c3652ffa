//! Heading anchors.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

/// Anchor slug of a heading text.
///
/// Lowercases, turns whitespace and underscores into hyphens, keeps
/// alphanumerics (unicode letters included) and collapses hyphen runs.
///
/// ```
/// use folio_core::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// ```
pub fn slugify(input: &str) -> String {
    let kept: String = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' || c == '-' {
                Some("-")
            } else if c.is_alphanumeric() {
                Some(g)
            } else {
                None
            }
        })
        .collect();

    HYPHENS.replace_all(&kept, "-").trim_matches('-').to_string()
}

/// Hands out unique anchors within one document: repeated slugs get a
/// `-1`, `-2`, ... suffix in order of appearance
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    seen: HashMap<String, usize>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(&mut self, text: &str) -> String {
        let base = match slugify(text) {
            s if s.is_empty() => "section".to_string(),
            s => s,
        };
        let count = self.seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        anchor
    }
}
