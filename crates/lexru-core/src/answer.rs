//! Final reply assembly: confidence label, source list, disclaimer.

use crate::types::UsedSource;

/// Maximum sources listed under a reply.
pub const MAX_LISTED_SOURCES: usize = 6;

/// Default cap on question length, in characters.
pub const MAX_USER_CHARS: usize = 500;

pub const USER_DISCLAIMER: &str = "⚠️ Я не являюсь вашим адвокатом. Ответ носит справочный характер и не заменяет юридическую помощь.";

pub const NO_SOURCES_PREFIX: &str = "Предварительная справка (источники не подтверждены мгновенно):";

/// Coarse trust indicator for a generated answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// At least three sources and the answer passed the quality gate.
    High,
    /// Some sources were used.
    Medium,
    /// No sources.
    Low,
}

impl Confidence {
    pub fn derive(used_sources: usize, quality_ok: bool) -> Self {
        if used_sources >= 3 && quality_ok {
            Self::High
        } else if used_sources > 0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Label shown to the user.
    pub fn label_ru(&self) -> &'static str {
        match self {
            Self::High => "высокая",
            Self::Medium => "средняя",
            Self::Low => "низкая",
        }
    }
}

/// Trim and cut a question to at most `max_chars` characters.
pub fn clamp_text(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Prefix the generated text with the confidence line (and the no-sources
/// notice when nothing was cited), then append sources and disclaimer.
pub fn compose_reply(generated: &str, used: &[UsedSource], confidence: Confidence) -> String {
    let body = if used.is_empty() {
        format!("{NO_SOURCES_PREFIX}\n{generated}")
    } else {
        generated.to_string()
    };
    let body = format!("Уровень уверенности: {}.\n\n{body}", confidence.label_ru());
    format_answer(&body, used)
}

/// Append the source list (at most [`MAX_LISTED_SOURCES`]) and the disclaimer.
pub fn format_answer(model_text: &str, used: &[UsedSource]) -> String {
    let lines: Vec<String> = used
        .iter()
        .take(MAX_LISTED_SOURCES)
        .map(|s| {
            let label = if s.title.trim().is_empty() {
                &s.url
            } else {
                &s.title
            };
            format!("- {label} — {}", s.url)
        })
        .collect();
    let block = if lines.is_empty() {
        "- (источники не найдены)".to_string()
    } else {
        lines.join("\n")
    };
    format!("{model_text}\n\nИсточники:\n{block}\n\n{USER_DISCLAIMER}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(n: usize) -> UsedSource {
        UsedSource {
            url: format!("https://consultant.ru/{n}"),
            title: format!("Документ {n}"),
        }
    }

    #[test]
    fn confidence_levels() {
        assert_eq!(Confidence::derive(3, true), Confidence::High);
        assert_eq!(Confidence::derive(3, false), Confidence::Medium);
        assert_eq!(Confidence::derive(2, true), Confidence::Medium);
        assert_eq!(Confidence::derive(0, true), Confidence::Low);
        assert_eq!(Confidence::High.label_ru(), "высокая");
        assert_eq!(Confidence::Low.as_str(), "low");
    }

    #[test]
    fn clamp_counts_characters() {
        assert_eq!(clamp_text("  привет мир  ", 6), "привет");
        assert_eq!(clamp_text("коротко", 500), "коротко");
        assert_eq!(clamp_text("абв", 3), "абв");
    }

    #[test]
    fn source_list_capped_at_six() {
        let used: Vec<UsedSource> = (0..9).map(src).collect();
        let out = format_answer("ответ", &used);
        assert_eq!(out.matches("\n- ").count(), MAX_LISTED_SOURCES);
        assert!(out.contains("- Документ 0 — https://consultant.ru/0"));
        assert!(!out.contains("Документ 6"));
        assert!(out.ends_with(USER_DISCLAIMER));
    }

    #[test]
    fn empty_sources_placeholder_and_title_fallback() {
        let out = format_answer("ответ", &[]);
        assert!(out.contains("- (источники не найдены)"));

        let untitled = UsedSource {
            url: "https://sudact.ru/x".into(),
            title: String::new(),
        };
        let out = format_answer("ответ", &[untitled]);
        assert!(out.contains("- https://sudact.ru/x — https://sudact.ru/x"));
    }

    #[test]
    fn reply_without_sources_is_marked_preliminary() {
        let out = compose_reply("текст", &[], Confidence::Low);
        assert!(out.starts_with("Уровень уверенности: низкая.\n\n"));
        assert!(out.contains(NO_SOURCES_PREFIX));

        let out = compose_reply("текст", &[src(1)], Confidence::Medium);
        assert!(out.starts_with("Уровень уверенности: средняя."));
        assert!(!out.contains(NO_SOURCES_PREFIX));
    }
}
