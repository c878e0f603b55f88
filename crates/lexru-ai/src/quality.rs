//! Quality gate for generated legal answers.
//!
//! An answer passes when it cites a norm, names a concrete sanction (a ruble
//! amount or one of the fixed sanction phrases) and references an amendment
//! law. Only the confidence label depends on the outcome.

use std::sync::LazyLock;

use lexru_core::patterns::{citations, norms};
use regex::Regex;
use serde::Serialize;

use crate::citation::{Citation, extract_citations};

static RUBLE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(citations::RUBLE_AMOUNT).expect("valid ruble regex"));
static AMENDMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(norms::AMENDMENT).expect("valid amendment regex"));

/// Signals found in an answer.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub citations: Vec<Citation>,
    pub has_sanction: bool,
    pub has_amendment: bool,
}

impl QualityReport {
    pub fn passes(&self) -> bool {
        !self.citations.is_empty() && self.has_sanction && self.has_amendment
    }
}

fn has_sanction(text: &str) -> bool {
    if RUBLE_AMOUNT.is_match(text) {
        return true;
    }
    let lower = text.to_lowercase();
    citations::SANCTIONS.iter().any(|s| lower.contains(s))
}

pub fn assess(text: &str) -> QualityReport {
    QualityReport {
        citations: extract_citations(text),
        has_sanction: has_sanction(text),
        has_amendment: AMENDMENT.is_match(text),
    }
}

pub fn has_strict_legal_quality(text: &str) -> bool {
    assess(text).passes()
}
