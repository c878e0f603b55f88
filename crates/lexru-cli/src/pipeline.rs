//! Request pipeline: question in, formatted reply out.
//!
//! clamp → intent → plan → search → fetch → rank → generate → validate →
//! confidence → format. Every stage degrades instead of failing; a failed
//! answer generation becomes [`APOLOGY_REPLY`].

use futures::stream::{self, StreamExt};
use lexru_ai::generator::GeneratorError;
use lexru_ai::{
    Generator, Intent, answer_request, classify_intent, filter_and_rank_pages,
    has_strict_legal_quality, plan_queries,
};
use lexru_core::answer::MAX_USER_CHARS;
use lexru_core::{
    Confidence, FetchedPage, QueryPlan, RankedPage, SearchHit, UsedSource, clamp_text,
    compose_reply,
};
use lexru_search::fetcher::SNIPPET_CHARS;
use lexru_search::http::truncate_chars;
use lexru_search::{PageSource, SearchAggregator};
use serde::Serialize;
use tracing::{info, warn};

/// Hits fetched per question, taken from the top of the search results.
pub const FETCH_LIMIT: usize = 10;
/// Pages whose snippet is shorter than this carry too little text to rank.
pub const MIN_SNIPPET_CHARS: usize = 120;
pub const MIN_KEEP: usize = 2;
pub const MAX_KEEP: usize = 6;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

pub const OFFTOPIC_REPLY: &str = "Я юридический помощник по праву РФ. Отвечаю на вопросы по КоАП, УК, ГК, трудовому, налоговому и др. \
Опишите ситуацию или задайте юридический вопрос — я подберу нормы и подскажу шаги.";

pub const CURRENCY_REPLY: &str = "Это около-правовой вопрос. Актуальные официальные курсы публикует Банк России: cbr.ru/currency_base/daily/. \
Если курс нужен для расчётов по договору/пошлине — укажите дату и правовой контекст, подскажу, какую норму применять.";

pub const PARALEGAL_REPLY: &str = "Это ближе к справочному вопросу. Я фокусируюсь на праве РФ. \
Если подскажете юридический контекст (норма/статья/ситуация), дам точные нормы и шаги.";

pub const APOLOGY_REPLY: &str = "Не получилось быстро получить выдержки из баз. \
Могу дать предварительную правовую оценку — сформулируйте ситуацию (кодекс/статья/часть — если знаете).";

/// Built-in answer prompt. `__TODAY__` is replaced with the current date.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Ты — юридический помощник по праву РФ. Сегодня __TODAY__.\n\
Отвечай кратко и по делу, опираясь на выдержки из контекста (SOURCE/TITLE/EXCERPT).\n\
Называй нормы в формате «Кодекс, ст. N ч. M п. K», указывай санкции (размер штрафа в ₽, \
лишение права управления, обязательные работы, административный арест, предупреждение) \
и редакцию закона (ФЗ-N-ФЗ от ДД.ММ.ГГГГ), если она есть в контексте.\n\
Если контекста нет, дай предварительную оценку и прямо скажи, что нормы нужно проверить.\n\
Заверши 2–3 практическими шагами.";

const TODAY_PLACEHOLDER: &str = "__TODAY__";

/// Substitute `today` (already formatted `DD.MM.YYYY`) into `template`.
pub fn render_system_prompt(template: &str, today: &str) -> String {
    template.replace(TODAY_PLACEHOLDER, today)
}

pub fn today() -> String {
    chrono::Local::now().format("%d.%m.%Y").to_string()
}

fn paralegal_reply(question: &str) -> &'static str {
    let lower = question.to_lowercase();
    let currency = ["доллар", "usd", "евро", "eur"]
        .iter()
        .any(|c| lower.contains(c));
    if lower.contains("курс") && currency {
        CURRENCY_REPLY
    } else {
        PARALEGAL_REPLY
    }
}

/// Everything retrieved for one question.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    pub plan: QueryPlan,
    pub hits: Vec<SearchHit>,
    pub pages: Vec<FetchedPage>,
    pub ranked: Vec<RankedPage>,
}

/// A reply plus what it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub reply: String,
    pub intent: &'static str,
    /// `None` for canned replies.
    pub confidence: Option<&'static str>,
    pub evidence: Option<Evidence>,
}

impl Answer {
    fn canned(intent: Intent, reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            intent: intent.as_str(),
            confidence: None,
            evidence: None,
        }
    }
}

pub struct Pipeline {
    aggregator: SearchAggregator,
    pages: Box<dyn PageSource>,
    generator: Box<dyn Generator>,
    system_prompt: String,
    max_user_chars: usize,
    fetch_concurrency: usize,
}

impl Pipeline {
    pub fn new(
        aggregator: SearchAggregator,
        pages: Box<dyn PageSource>,
        generator: Box<dyn Generator>,
    ) -> Self {
        Self {
            aggregator,
            pages,
            generator,
            system_prompt: render_system_prompt(DEFAULT_SYSTEM_PROMPT, &today()),
            max_user_chars: MAX_USER_CHARS,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Use `prompt` as the answer system prompt. `__TODAY__` is substituted.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = render_system_prompt(prompt, &today());
        self
    }

    pub fn with_max_user_chars(mut self, max: usize) -> Self {
        self.max_user_chars = max;
        self
    }

    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }

    /// Answer a question. Always returns a reply.
    pub async fn answer(&self, question: &str) -> String {
        self.answer_detailed(question).await.reply
    }

    /// Like [`Pipeline::answer`], keeping the intent, confidence and evidence.
    pub async fn answer_detailed(&self, question: &str) -> Answer {
        let q = clamp_text(question, self.max_user_chars);

        let intent = classify_intent(&q, Some(self.generator.as_ref())).await;
        info!(intent = intent.as_str(), "intent decided");
        match intent {
            Intent::Offtopic => return Answer::canned(intent, OFFTOPIC_REPLY),
            Intent::Paralegal => return Answer::canned(intent, paralegal_reply(&q)),
            Intent::Legal => {}
        }

        let evidence = self.gather(&q).await;
        match self.draft(&q, &evidence).await {
            Ok((reply, confidence)) => Answer {
                reply,
                intent: intent.as_str(),
                confidence: Some(confidence.as_str()),
                evidence: Some(evidence),
            },
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                Answer {
                    reply: APOLOGY_REPLY.to_string(),
                    intent: intent.as_str(),
                    confidence: None,
                    evidence: Some(evidence),
                }
            }
        }
    }

    /// Generate, validate and format the reply for gathered evidence.
    async fn draft(
        &self,
        question: &str,
        evidence: &Evidence,
    ) -> Result<(String, Confidence), GeneratorError> {
        let req = answer_request(&self.system_prompt, question, &evidence.ranked);
        let generated = self.generator.complete(&req).await?;

        let used: Vec<UsedSource> = evidence.ranked.iter().map(UsedSource::from).collect();
        let quality_ok = has_strict_legal_quality(&generated);
        let confidence = Confidence::derive(used.len(), quality_ok);
        info!(
            used = used.len(),
            quality_ok,
            confidence = confidence.as_str(),
            "answer ready"
        );
        Ok((compose_reply(&generated, &used, confidence), confidence))
    }

    /// Plan, search, fetch and rank for `question`.
    pub async fn gather(&self, question: &str) -> Evidence {
        let plan = plan_queries(self.generator.as_ref(), question, false).await;
        let queries = plan.queries(question);
        let hits = self.aggregator.multi_query_search(&queries).await;
        let pages = self.fetch_pages(&hits).await;
        let ranked = filter_and_rank_pages(&pages, &plan.targets(), MIN_KEEP, MAX_KEEP, true);
        Evidence {
            plan,
            hits,
            pages,
            ranked,
        }
    }

    pub async fn fetch_pages(&self, hits: &[SearchHit]) -> Vec<FetchedPage> {
        fetch_pages(self.pages.as_ref(), hits, self.fetch_concurrency).await
    }
}

/// Fetch the first [`FETCH_LIMIT`] hits with at most `concurrency` requests
/// in flight, keeping hit order. Failed fetches and pages with a short
/// snippet are dropped.
pub async fn fetch_pages(
    source: &dyn PageSource,
    hits: &[SearchHit],
    concurrency: usize,
) -> Vec<FetchedPage> {
    let results: Vec<_> = stream::iter(hits.iter().take(FETCH_LIMIT))
        .map(|hit| async move { (hit.url.as_str(), source.fetch_page(&hit.url).await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut pages = Vec::with_capacity(results.len());
    for (url, result) in results {
        match result {
            Ok(mut page) => {
                if page.snippet.is_empty() {
                    page.snippet = truncate_chars(&page.text, SNIPPET_CHARS);
                }
                if page.snippet.chars().count() < MIN_SNIPPET_CHARS {
                    continue;
                }
                pages.push(page);
            }
            Err(e) => warn!(url, error = %e, "fetch failed"),
        }
    }
    info!(hits = hits.len(), pages = pages.len(), "pages fetched");
    pages
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use lexru_ai::CompletionRequest;
    use lexru_search::{FetchError, ProviderError, SearchProvider};

    use super::*;

    const PLAN: &str = r#"{"Q_STRICT":"ст. 20.1 ч.1 КоАП РФ","Q_SEMI":"мелкое хулиганство штраф","Q_BROAD":"хулиганство ответственность","QUAL":["КоАП РФ;20.1;1;мелкое хулиганство"]}"#;
    const GOOD_ANSWER: &str = "Это ст. 20.1 ч.1 КоАП РФ: штраф от 500 до 1 000 ₽ или административный арест. Редакция ФЗ-123-ФЗ от 01.02.2024.";

    struct Hits(Vec<SearchHit>, Arc<Mutex<usize>>);

    #[async_trait]
    impl SearchProvider for Hits {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn search(&self, _q: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
            *self.1.lock().unwrap() += 1;
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    struct Pages(HashMap<String, FetchedPage>);

    #[async_trait]
    impl PageSource for Pages {
        async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.0
                .get(url)
                .cloned()
                .ok_or(FetchError::Server { status: 404 })
        }
    }

    /// Returns the plan for JSON requests and `answer` otherwise.
    struct Model {
        answer: Option<&'static str>,
    }

    #[async_trait]
    impl Generator for Model {
        async fn complete(&self, req: &CompletionRequest) -> Result<String, GeneratorError> {
            if req.json_mode {
                return Ok(PLAN.to_string());
            }
            self.answer
                .map(str::to_string)
                .ok_or(GeneratorError::EmptyResponse)
        }
    }

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            title: String::new(),
            url: url.into(),
            snippet: String::new(),
        }
    }

    fn page(url: &str, title: &str, snippet: &str) -> FetchedPage {
        FetchedPage {
            url: url.into(),
            title: title.into(),
            text: snippet.into(),
            snippet: snippet.into(),
        }
    }

    fn relevant(url: &str) -> FetchedPage {
        let body = format!(
            "ст. 20.1 ч.1 КоАП РФ мелкое хулиганство {}",
            "нарушение общественного порядка ".repeat(5)
        );
        page(url, "Документ", &body)
    }

    /// Five hits: three relevant pages, one too short, one unreachable.
    fn pipeline(answer: Option<&'static str>) -> (Pipeline, Arc<Mutex<usize>>) {
        let urls = ["https://a.ru/1", "https://b.ru/2", "https://c.ru/3", "https://d.ru/4", "https://e.ru/5"];
        let calls = Arc::new(Mutex::new(0));
        let provider = Hits(urls.iter().map(|u| hit(u)).collect(), calls.clone());
        let aggregator = SearchAggregator::new(vec![Box::new(provider)], vec![], 8);

        let mut pages = HashMap::new();
        for u in &urls[..3] {
            pages.insert(u.to_string(), relevant(u));
        }
        pages.insert(urls[3].to_string(), page(urls[3], "", "ст. 20.1 коротко"));

        let p = Pipeline::new(aggregator, Box::new(Pages(pages)), Box::new(Model { answer }));
        (p, calls)
    }

    #[test]
    fn prompt_date_substitution() {
        assert_eq!(
            render_system_prompt("Сегодня __TODAY__.", "17.10.2026"),
            "Сегодня 17.10.2026."
        );
        assert_eq!(today().len(), 10);
    }

    #[tokio::test]
    async fn legal_question_gets_labelled_reply() {
        let (p, _) = pipeline(Some(GOOD_ANSWER));
        let reply = p.answer("Какой штраф по ст. 20.1 КоАП?").await;
        assert!(reply.starts_with("Уровень уверенности: высокая.\n\n"));
        assert!(reply.contains(GOOD_ANSWER));
        assert!(reply.contains("Источники:\n- Документ — https://a.ru/1"));
        assert!(reply.contains("https://c.ru/3"));
        assert!(!reply.contains("https://d.ru/4"));
        assert!(!reply.contains("https://e.ru/5"));
    }

    #[tokio::test]
    async fn weak_answer_is_medium() {
        let (p, _) = pipeline(Some("Скорее всего это мелкое хулиганство."));
        let reply = p.answer("Какой штраф по ст. 20.1 КоАП?").await;
        assert!(reply.starts_with("Уровень уверенности: средняя."));
    }

    #[tokio::test]
    async fn generator_failure_gives_apology() {
        let (p, _) = pipeline(None);
        let answer = p.answer_detailed("Какой штраф по ст. 20.1 КоАП?").await;
        assert_eq!(answer.reply, APOLOGY_REPLY);
        assert_eq!(answer.confidence, None);
        assert_eq!(answer.evidence.map(|e| e.ranked.len()), Some(3));
    }

    #[tokio::test]
    async fn detailed_answer_serializes() {
        let (p, _) = pipeline(Some(GOOD_ANSWER));
        let answer = p.answer_detailed("Какой штраф по ст. 20.1 КоАП?").await;
        let v = serde_json::to_value(&answer).unwrap();
        assert_eq!(v["intent"], "LEGAL");
        assert_eq!(v["confidence"], "high");
        assert_eq!(v["evidence"]["plan"]["QUAL"][0], "КоАП РФ;20.1;1;мелкое хулиганство");
        assert_eq!(v["evidence"]["ranked"][0]["score"], 7);

        let canned = p.answer_detailed("Привет").await;
        assert_eq!(canned.intent, "OFFTOPIC");
        assert!(canned.evidence.is_none());
    }

    #[tokio::test]
    async fn canned_replies_skip_search() {
        let (p, calls) = pipeline(Some(GOOD_ANSWER));
        assert_eq!(p.answer("Привет! Кто ты?").await, OFFTOPIC_REPLY);
        assert_eq!(p.answer("курс доллара сегодня").await, CURRENCY_REPLY);
        assert_eq!(p.answer("какая погода в Москве").await, PARALEGAL_REPLY);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn no_sources_gives_low_confidence() {
        let aggregator = SearchAggregator::new(vec![], vec![], 8);
        let p = Pipeline::new(
            aggregator,
            Box::new(Pages(HashMap::new())),
            Box::new(Model {
                answer: Some(GOOD_ANSWER),
            }),
        );
        let reply = p.answer("Какой штраф по ст. 20.1 КоАП?").await;
        assert!(reply.starts_with(
            "Уровень уверенности: низкая.\n\nПредварительная справка (источники не подтверждены мгновенно):\n"
        ));
        assert!(reply.contains("- (источники не найдены)"));
    }

    #[tokio::test]
    async fn fetch_keeps_order_and_limit() {
        let aggregator = SearchAggregator::new(vec![], vec![], 8);
        let hits: Vec<SearchHit> = (0..12).map(|i| hit(&format!("https://p/{i}"))).collect();
        let pages = hits
            .iter()
            .map(|h| (h.url.clone(), relevant(&h.url)))
            .collect();
        let p = Pipeline::new(
            aggregator,
            Box::new(Pages(pages)),
            Box::new(Model { answer: None }),
        )
        .with_fetch_concurrency(3);
        let fetched = p.fetch_pages(&hits).await;
        let urls: Vec<&str> = fetched.iter().map(|p| p.url.as_str()).collect();
        let expected: Vec<String> = (0..FETCH_LIMIT).map(|i| format!("https://p/{i}")).collect();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn empty_snippet_falls_back_to_text() {
        let aggregator = SearchAggregator::new(vec![], vec![], 8);
        let mut full = relevant("https://p/0");
        full.snippet.clear();
        let pages = HashMap::from([("https://p/0".to_string(), full)]);
        let p = Pipeline::new(
            aggregator,
            Box::new(Pages(pages)),
            Box::new(Model { answer: None }),
        );
        let fetched = p.fetch_pages(&[hit("https://p/0")]).await;
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].snippet, fetched[0].text);
    }

    #[tokio::test]
    async fn gather_collects_evidence() {
        let (p, _) = pipeline(Some(GOOD_ANSWER));
        let ev = p.gather("Какой штраф по ст. 20.1 КоАП?").await;
        assert_eq!(ev.plan.strict, "ст. 20.1 ч.1 КоАП РФ");
        assert_eq!(ev.hits.len(), 5);
        assert_eq!(ev.pages.len(), 3);
        assert_eq!(ev.ranked.len(), 3);
        assert!(ev.ranked.iter().all(|r| r.score == 7));
    }
}
