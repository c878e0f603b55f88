//! Search planning: turn a question into a [`QueryPlan`] via the model.

use lexru_core::QueryPlan;
use tracing::{info, warn};

use crate::generator::{CompletionRequest, Generator};

/// Question characters sent to the planner.
pub const PLANNER_INPUT_CHARS: usize = 600;

pub const SYSTEM_BASE: &str = "Ты — помощник-юрист РФ. Твоя задача — подготовить ПЛАН ПОИСКА и КАНДИДАТЫ К НОРМАМ.\n\
1) Сначала определи юридическую квалификацию бытового описания (разговорные формулировки надо перевести в термины права: \
напр. «ходить голым в общественном месте» → «мелкое хулиганство (КоАП РФ ст. 20.1 ч.1)»; \
«уехал с места аварии» → «оставление места ДТП (КоАП РФ ст. 12.27 ч.2)»; и т.п.).\n\
2) Сформируй пакет поисковых запросов для РФ:\n\
   • Q_STRICT — узкий запрос с точной нормой (Кодекс, статья, часть) + ключевые юридические слова;\n\
   • Q_SEMI — средний (норма + ключи по ситуации/терминам);\n\
   • Q_BROAD — широкий (синонимы/общее название правонарушения), но юридически осмысленный;\n\
   • Q_ALT — 1–3 альтернативы (близкие квалификации или иные статьи), если уместно;\n\
   • QUAL — список до 3 кандидатов-норм в формате: «Кодекс;Статья;Часть;Короткий_термин».\n\
Верни ЧИСТЫЙ JSON без пояснений строго такого вида:\n\
{\"Q_STRICT\":\"...\",\"Q_SEMI\":\"...\",\"Q_BROAD\":\"...\",\"Q_ALT\":[\"...\",\"...\"],\"QUAL\":[\"Кодекс;Ст;Ч;Термин\", ...]}";

const FORCE_SUFFIX: &str = "\nВажно: форсируй привязку к конкретным нормам. Если вопрос разговорный, ОБЯЗАТЕЛЬНО дай хотя бы одну конкретную норму \
в QUAL (например, КоАП РФ ст. 20.1 ч.1; КоАП РФ ст. 12.27 ч.2; УК РФ ст. 213 и т.д.).";

pub fn system_prompt(force: bool) -> String {
    if force {
        format!("{SYSTEM_BASE}{FORCE_SUFFIX}")
    } else {
        SYSTEM_BASE.to_string()
    }
}

pub fn plan_request(question: &str, force: bool) -> CompletionRequest {
    CompletionRequest {
        system: system_prompt(force),
        user: question.trim().chars().take(PLANNER_INPUT_CHARS).collect(),
        temperature: 0.1,
        max_tokens: 400,
        json_mode: true,
    }
}

/// Ask `generator` for a search plan. Never fails: any generator or parse
/// error yields [`QueryPlan::fallback`].
pub async fn plan_queries(generator: &dyn Generator, question: &str, force: bool) -> QueryPlan {
    let plan = match generator.complete(&plan_request(question, force)).await {
        Ok(raw) => QueryPlan::from_json(&raw, question),
        Err(e) => {
            warn!(error = %e, "query planning failed");
            QueryPlan::fallback(question)
        }
    };
    info!(
        alternates = plan.alternates.len(),
        qual = plan.qual.len(),
        force,
        "query plan"
    );
    plan
}
