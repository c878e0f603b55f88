//! Text generation seam.
//!
//! Every model call in the pipeline (planning, intent fallback, answer
//! drafting) goes through [`Generator`], so the model backend can be swapped
//! or faked. The HTTP backend lives in `openai` behind the `openai` feature.

use async_trait::async_trait;
use lexru_core::RankedPage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("HTTP request failed: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model returned no content")]
    EmptyResponse,
}

/// One system + user exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the backend for a JSON object response.
    pub json_mode: bool,
}

#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the trimmed completion text.
    async fn complete(&self, req: &CompletionRequest) -> Result<String, GeneratorError>;
}

pub const ANSWER_TEMPERATURE: f32 = 0.2;
pub const ANSWER_MAX_TOKENS: u32 = 700;

/// Rendered in place of the context when no page survived ranking.
pub const NO_CONTEXT: &str = "(no-context)";

/// Context blocks for the answer prompt, one per ranked page.
pub fn render_context(pages: &[RankedPage]) -> String {
    if pages.is_empty() {
        return NO_CONTEXT.to_string();
    }
    pages
        .iter()
        .map(|p| {
            format!(
                "SOURCE: {}\nTITLE: {}\nEXCERPT: {}",
                p.page.url, p.page.title, p.page.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn answer_request(system_prompt: &str, question: &str, pages: &[RankedPage]) -> CompletionRequest {
    CompletionRequest {
        system: system_prompt.to_string(),
        user: format!("Вопрос: {question}\n\nКонтекст:\n{}", render_context(pages)),
        temperature: ANSWER_TEMPERATURE,
        max_tokens: ANSWER_MAX_TOKENS,
        json_mode: false,
    }
}
