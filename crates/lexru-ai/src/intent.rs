//! Question intent: full legal answer, short reference reply, or decline.

use std::sync::LazyLock;

use lexru_core::patterns::intent;
use regex::Regex;
use tracing::{debug, warn};

use crate::generator::{CompletionRequest, Generator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// A question about Russian law. Runs the full pipeline.
    Legal,
    /// Near-legal reference questions (banks, currency rates, ...).
    Paralegal,
    /// Greetings, meta questions and anything unrelated.
    Offtopic,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legal => "LEGAL",
            Self::Paralegal => "PARALEGAL",
            Self::Offtopic => "OFFTOPIC",
        }
    }

    /// Parse a model label. Case and surrounding punctuation are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_uppercase();
        match label.as_str() {
            "LEGAL" => Some(Self::Legal),
            "PARALEGAL" => Some(Self::Paralegal),
            "OFFTOPIC" => Some(Self::Offtopic),
            _ => None,
        }
    }
}

const LABEL_SYSTEM: &str = "Классифицируй пользовательский запрос на русском в одну метку: \
LEGAL (строго правовой вопрос по праву РФ), \
PARALEGAL (справочный/около-правовой: банки, курсы, инструкции), \
OFFTOPIC (приветствия, «кто ты», бытовые темы). \
Ответь ТОЛЬКО меткой без пояснений.";

struct PatternSet(Vec<Regex>);

impl PatternSet {
    fn new(patterns: &[&str]) -> Self {
        Self(
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("valid intent regex"))
                .collect(),
        )
    }

    fn matches(&self, lower: &str) -> bool {
        self.0.iter().any(|re| re.is_match(lower))
    }
}

static OFFTOPIC: LazyLock<PatternSet> = LazyLock::new(|| PatternSet::new(intent::OFFTOPIC));
static LEGAL: LazyLock<PatternSet> = LazyLock::new(|| PatternSet::new(intent::LEGAL));
static LEGAL_SHORT: LazyLock<PatternSet> = LazyLock::new(|| PatternSet::new(intent::LEGAL_SHORT));
static PARALEGAL: LazyLock<PatternSet> = LazyLock::new(|| PatternSet::new(intent::PARALEGAL));

/// Pattern-only classification. `None` when no rule decides.
///
/// Rules run in order: empty and meta/greeting text is off-topic, strong legal
/// keywords then short legal phrasings are legal, paralegal hints apply only
/// after nothing legal matched.
pub fn classify_heuristic(text: &str) -> Option<Intent> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() || OFFTOPIC.matches(&lower) {
        return Some(Intent::Offtopic);
    }
    if LEGAL.matches(&lower) || LEGAL_SHORT.matches(&lower) {
        return Some(Intent::Legal);
    }
    if PARALEGAL.matches(&lower) {
        return Some(Intent::Paralegal);
    }
    None
}

/// Classify `text`, asking `fallback` for a label when the patterns are
/// undecided. Defaults to [`Intent::Legal`].
pub async fn classify_intent(text: &str, fallback: Option<&dyn Generator>) -> Intent {
    if let Some(intent) = classify_heuristic(text) {
        debug!(intent = intent.as_str(), "intent from patterns");
        return intent;
    }
    if let Some(generator) = fallback {
        let req = CompletionRequest {
            system: LABEL_SYSTEM.to_string(),
            user: text.trim().to_string(),
            temperature: 0.0,
            max_tokens: 8,
            json_mode: false,
        };
        match generator.complete(&req).await {
            Ok(label) => {
                if let Some(intent) = Intent::from_label(&label) {
                    debug!(intent = intent.as_str(), "intent from model");
                    return intent;
                }
                debug!(label = %label, "unrecognised intent label");
            }
            Err(e) => warn!(error = %e, "intent classification failed"),
        }
    }
    Intent::Legal
}
