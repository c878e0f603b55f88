//! Typed search plan produced by the query planner.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::norm::{NormTarget, parse_norm_targets};

/// Search queries and norm candidates for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    #[serde(rename = "Q_STRICT")]
    pub strict: String,
    #[serde(rename = "Q_SEMI")]
    pub semi: String,
    #[serde(rename = "Q_BROAD")]
    pub broad: String,
    #[serde(rename = "Q_ALT", default)]
    pub alternates: Vec<String>,
    #[serde(rename = "QUAL", default)]
    pub qual: Vec<String>,
}

/// String field of the planner reply, if present and not blank.
fn text_field(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// List field of the planner reply. A bare string counts as a one-item
/// list; non-string items are skipped.
fn list_field(v: &Value, key: &str) -> Vec<String> {
    match v.get(key) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

impl QueryPlan {
    /// Plan that searches for the question itself and targets no norms.
    pub fn fallback(question: &str) -> Self {
        Self {
            strict: question.to_string(),
            semi: question.to_string(),
            broad: question.to_string(),
            alternates: Vec::new(),
            qual: Vec::new(),
        }
    }

    /// Build a plan from the planner's JSON, filling gaps from `question`.
    ///
    /// Each field is read on its own: a missing, blank or mistyped `Q_*`
    /// field becomes the question and a bad list becomes empty, without
    /// touching the other fields. Unparseable input yields
    /// [`QueryPlan::fallback`].
    pub fn from_json(raw: &str, question: &str) -> Self {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "planner returned invalid JSON, using defaults");
                Value::Null
            }
        };
        let or_question =
            |key: &str| text_field(&parsed, key).unwrap_or_else(|| question.to_string());
        Self {
            strict: or_question("Q_STRICT"),
            semi: or_question("Q_SEMI"),
            broad: or_question("Q_BROAD"),
            alternates: list_field(&parsed, "Q_ALT"),
            qual: list_field(&parsed, "QUAL"),
        }
    }

    /// Queries in search order: strict, semi, broad, then alternates.
    ///
    /// Blank entries are skipped; an otherwise empty list falls back to
    /// `question`.
    pub fn queries(&self, question: &str) -> Vec<String> {
        let mut out: Vec<String> = [&self.strict, &self.semi, &self.broad]
            .into_iter()
            .chain(self.alternates.iter())
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .collect();
        if out.is_empty() {
            out.push(question.to_string());
        }
        out
    }

    /// Parsed norm targets from `QUAL`.
    pub fn targets(&self) -> Vec<NormTarget> {
        parse_norm_targets(&self.qual)
    }
}
