//! Norm targets: the legal provisions a question is believed to implicate.
//!
//! The planner emits qualification candidates as semicolon-delimited records
//! (`"КоАП РФ;20.1;1;мелкое хулиганство"`). This module parses them into
//! [`NormTarget`]s with a normalised code name so that the relevance ranker
//! can compare them against codes found in page text.
//!
//! # Code names
//!
//! - КоАП РФ: administrative offences
//! - УК РФ: criminal code
//! - ГК РФ: civil code
//! - УПК РФ: criminal procedure (also spelled "КПК РФ")

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const KOAP: &str = "коап рф";
pub const UK: &str = "ук рф";
pub const GK: &str = "гк рф";
pub const UPK: &str = "упк рф";

static WORD_UK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bук\b").expect("valid regex"));
static WORD_GK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bгк\b").expect("valid regex"));

/// A candidate legal provision to rank pages against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormTarget {
    /// Normalised code name, see [`normalize_code`].
    pub code: String,
    pub article: String,
    /// Empty when the record had no part.
    pub part: String,
    /// Short human term ("мелкое хулиганство"), empty if absent.
    pub term: String,
}

/// Normalise a free-form code name to one of the known codes.
///
/// Checks run in a fixed order and the first match wins, so a string naming
/// several codes resolves to the earliest check:
///
/// 1. contains "коап" → `коап рф`
/// 2. contains "уголов" or the word "ук" → `ук рф`
/// 3. contains "гражданск" or the word "гк" → `гк рф`
/// 4. contains "упк" or "кпк" → `упк рф`
///
/// Anything else is returned lowercased and trimmed.
pub fn normalize_code(s: &str) -> String {
    let lower = s.to_lowercase();
    if lower.contains("коап") {
        return KOAP.to_string();
    }
    if lower.contains("уголов") || WORD_UK.is_match(&lower) {
        return UK.to_string();
    }
    if lower.contains("гражданск") || WORD_GK.is_match(&lower) {
        return GK.to_string();
    }
    if lower.contains("упк") || lower.contains("кпк") {
        return UPK.to_string();
    }
    lower.trim().to_string()
}

/// Parse one `"Code;Article;Part;Term"` record.
///
/// Returns `None` for records with fewer than two fields.
pub fn parse_norm_target(record: &str) -> Option<NormTarget> {
    let fields: Vec<&str> = record.split(';').map(str::trim).collect();
    if fields.len() < 2 {
        return None;
    }
    Some(NormTarget {
        code: normalize_code(fields[0]),
        article: fields[1].to_string(),
        part: fields.get(2).map(|s| s.to_string()).unwrap_or_default(),
        term: fields.get(3).map(|s| s.to_string()).unwrap_or_default(),
    })
}

/// Parse a planner `QUAL` list, skipping malformed entries.
pub fn parse_norm_targets<S: AsRef<str>>(qual: &[S]) -> Vec<NormTarget> {
    let targets: Vec<NormTarget> = qual
        .iter()
        .filter_map(|rec| parse_norm_target(rec.as_ref()))
        .collect();
    if targets.len() < qual.len() {
        tracing::debug!(
            skipped = qual.len() - targets.len(),
            "skipped malformed QUAL entries"
        );
    }
    targets
}
