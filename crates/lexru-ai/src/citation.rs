//! Citations of codified norms inside generated answer text.
//!
//! A citation is a code name plus an article, optionally narrowed to a part
//! and a point. Parts and points are looked up in a window of
//! [`WINDOW_CHARS`] characters on each side of the article reference.

use std::collections::HashSet;
use std::sync::LazyLock;

use lexru_core::patterns::citations;
use regex::Regex;
use serde::Serialize;

/// Characters searched on each side of an article reference.
pub const WINDOW_CHARS: usize = 40;

static CODES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    citations::CODES
        .iter()
        .map(|(name, pat)| (*name, Regex::new(pat).expect("valid code regex")))
        .collect()
});
static ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(citations::ARTICLE).expect("valid article regex"));
static PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(citations::PART).expect("valid part regex"));
static POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(citations::POINT).expect("valid point regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Citation {
    /// Display name, e.g. "КоАП РФ".
    pub code: &'static str,
    pub article: String,
    pub part: Option<String>,
    pub point: Option<String>,
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, ст. {}", self.code, self.article)?;
        if let Some(part) = &self.part {
            write!(f, " ч. {part}")?;
        }
        if let Some(point) = &self.point {
            write!(f, " п. {point}")?;
        }
        Ok(())
    }
}

/// Slice of `text` extending `radius` characters either side of `start..end`.
fn char_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let lo = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let hi = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    &text[lo..hi]
}

fn first_group(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract every citation from `text`.
///
/// Each article reference is attributed to every code named anywhere in the
/// text. Output is deduplicated and keeps first-seen order, codes in
/// [`citations::CODES`] order.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (code, code_re) in CODES.iter() {
        if !code_re.is_match(text) {
            continue;
        }
        for caps in ARTICLE.captures_iter(text) {
            let (Some(whole), Some(article)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let window = char_window(text, whole.start(), whole.end(), WINDOW_CHARS);
            let citation = Citation {
                code: *code,
                article: article.as_str().to_string(),
                part: first_group(&PART, window),
                point: first_group(&POINT, window),
            };
            if seen.insert(citation.clone()) {
                out.push(citation);
            }
        }
    }
    out
}

pub fn has_valid_citation(text: &str) -> bool {
    !extract_citations(text).is_empty()
}
