//! Cascading multi-provider search with a global result budget.
//!
//! For every query, each provider is tried in priority order, first with the
//! site-restricted variant and then with the plain query. Hits accumulate in
//! arrival order; once the accumulated (pre-dedup) count reaches the budget
//! no further provider is called, for this query or any later one.

use lexru_core::{SearchHit, dedup_by_url};
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::duckduckgo::DuckDuckGo;
use crate::google::GoogleCse;
use crate::http::{ProviderError, browser_client};
use crate::provider::SearchProvider;
use crate::searxng::Searxng;
use crate::startpage::Startpage;

/// Which form of the query a provider attempt uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Query restricted to the authoritative source sites.
    Strict,
    /// Query as given.
    Broad,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Broad => "broad",
        }
    }
}

pub struct SearchAggregator {
    providers: Vec<Box<dyn SearchProvider>>,
    source_sites: Vec<String>,
    max_results: usize,
}

impl SearchAggregator {
    /// `providers` in priority order.
    pub fn new(
        providers: Vec<Box<dyn SearchProvider>>,
        source_sites: Vec<String>,
        max_results: usize,
    ) -> Self {
        Self {
            providers,
            source_sites,
            max_results,
        }
    }

    /// Assemble the cascade from configuration: Google CSE, SearXNG,
    /// DuckDuckGo, Startpage, each only when configured and enabled.
    pub fn from_config(cfg: &SearchConfig) -> Result<Self, ProviderError> {
        let client = browser_client(cfg.timeout)?;
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();

        if let Some((key, cx)) = cfg.google_credentials() {
            providers.push(Box::new(GoogleCse::new(
                client.clone(),
                key.to_string(),
                cx.to_string(),
            )));
        }
        if let Some(base) = cfg.searxng_base() {
            providers.push(Box::new(Searxng::new(client.clone(), base)));
        }
        if !cfg.ddg_disabled {
            providers.push(Box::new(DuckDuckGo::new(client.clone())));
        }
        if cfg.startpage_enabled {
            providers.push(Box::new(Startpage::new(client)));
        }

        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        info!(providers = ?names, budget = cfg.max_results, "search cascade ready");
        Ok(Self::new(
            providers,
            cfg.source_sites.clone(),
            cfg.max_results,
        ))
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// `"<q> site:a OR site:b ..."`, or `q` unchanged with no source sites.
    pub fn site_restricted(&self, query: &str) -> String {
        if self.source_sites.is_empty() {
            return query.to_string();
        }
        let sites = self
            .source_sites
            .iter()
            .map(|s| format!("site:{s}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("{query} {sites}").trim().to_string()
    }

    /// Run the cascade over `queries` and return at most `max_results`
    /// hits, deduplicated by URL in arrival order.
    pub async fn multi_query_search<S: AsRef<str>>(&self, queries: &[S]) -> Vec<SearchHit> {
        let mut all: Vec<SearchHit> = Vec::new();

        'queries: for query in queries {
            let broad = query.as_ref();
            let strict = self.site_restricted(broad);
            for provider in &self.providers {
                for (variant, q) in [(Variant::Strict, strict.as_str()), (Variant::Broad, broad)] {
                    if all.len() >= self.max_results {
                        break 'queries;
                    }
                    match provider.search(q, self.max_results).await {
                        Ok(hits) => {
                            if !hits.is_empty() {
                                info!(
                                    provider = provider.name(),
                                    variant = variant.as_str(),
                                    count = hits.len(),
                                    "provider hits"
                                );
                            }
                            all.extend(hits);
                        }
                        Err(e) => warn!(
                            provider = provider.name(),
                            variant = variant.as_str(),
                            error = %e,
                            "provider failed"
                        ),
                    }
                }
            }
        }

        let out = dedup_by_url(all, self.max_results);
        info!(count = out.len(), "search total results (dedup)");
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;

    /// Scripted provider recording every query it receives.
    struct Scripted {
        name: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
        respond: fn(&str) -> Result<Vec<SearchHit>, ProviderError>,
    }

    #[async_trait]
    impl SearchProvider for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<SearchHit>, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{query}", self.name));
            (self.respond)(query).map(|mut hits| {
                hits.truncate(limit);
                hits
            })
        }
    }

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            title: url.to_string(),
            url: url.to_string(),
            snippet: String::new(),
        }
    }

    fn hits(prefix: &str, n: usize) -> Vec<SearchHit> {
        (0..n).map(|i| hit(&format!("https://{prefix}/{i}"))).collect()
    }

    fn provider(
        name: &'static str,
        calls: &Arc<Mutex<Vec<String>>>,
        respond: fn(&str) -> Result<Vec<SearchHit>, ProviderError>,
    ) -> Box<dyn SearchProvider> {
        Box::new(Scripted {
            name,
            calls: calls.clone(),
            respond,
        })
    }

    fn failing(_: &str) -> Result<Vec<SearchHit>, ProviderError> {
        Err(ProviderError::Server {
            status: 503,
            body: "unavailable".into(),
        })
    }

    fn empty(_: &str) -> Result<Vec<SearchHit>, ProviderError> {
        Ok(vec![])
    }

    fn sites() -> Vec<String> {
        vec!["pravo.gov.ru".into(), "consultant.ru".into()]
    }

    #[test]
    fn site_restriction_clause() {
        let agg = SearchAggregator::new(vec![], sites(), 8);
        assert_eq!(
            agg.site_restricted("ст. 20.1 КоАП"),
            "ст. 20.1 КоАП site:pravo.gov.ru OR site:consultant.ru"
        );
        let bare = SearchAggregator::new(vec![], vec![], 8);
        assert_eq!(bare.site_restricted("ст. 20.1"), "ст. 20.1");
    }

    #[tokio::test]
    async fn strict_then_broad_in_priority_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let agg = SearchAggregator::new(
            vec![
                provider("a", &calls, empty),
                provider("b", &calls, failing),
            ],
            vec!["sudact.ru".into()],
            8,
        );
        let out = agg.multi_query_search(&["q1", "q2"]).await;
        assert!(out.is_empty());
        let calls = calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            [
                "a:q1 site:sudact.ru",
                "a:q1",
                "b:q1 site:sudact.ru",
                "b:q1",
                "a:q2 site:sudact.ru",
                "a:q2",
                "b:q2 site:sudact.ru",
                "b:q2",
            ]
        );
    }

    #[tokio::test]
    async fn budget_stops_cascade_across_tiers_and_queries() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let agg = SearchAggregator::new(
            vec![
                provider("a", &calls, |_| Ok(hits("a", 5))),
                provider("b", &calls, |_| Ok(hits("b", 5))),
            ],
            sites(),
            8,
        );
        let out = agg.multi_query_search(&["q1", "q2"]).await;
        // Strict returns a/0..4, broad repeats them: 10 pre-dedup, 5 unique.
        assert_eq!(out.len(), 5);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failures_are_isolated() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let agg = SearchAggregator::new(
            vec![
                provider("a", &calls, failing),
                provider("b", &calls, |q| {
                    if q.contains("site:") {
                        Ok(vec![hit("https://pravo.gov.ru/1")])
                    } else {
                        Ok(vec![hit("https://pravo.gov.ru/1"), hit("https://other.ru/2")])
                    }
                }),
            ],
            sites(),
            8,
        );
        let out = agg.multi_query_search(&["q"]).await;
        let urls: Vec<&str> = out.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, ["https://pravo.gov.ru/1", "https://other.ru/2"]);
    }

    #[tokio::test]
    async fn output_never_exceeds_budget() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let agg = SearchAggregator::new(
            vec![provider("a", &calls, |q| {
                // Distinct URLs per query variant.
                let tag = if q.contains("site:") { "s" } else { "b" };
                Ok(hits(tag, 3))
            })],
            sites(),
            4,
        );
        let out = agg.multi_query_search(&["q1", "q2", "q3"]).await;
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].url, "https://s/0");
        assert_eq!(out[3].url, "https://b/0");
        // strict (3) + broad (3) reached the budget of 4 within q1.
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn zero_budget_calls_nothing() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let agg = SearchAggregator::new(vec![provider("a", &calls, empty)], sites(), 0);
        assert!(agg.multi_query_search(&["q"]).await.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn cascade_from_config() {
        let cfg = SearchConfig {
            google_api_key: Some("k".into()),
            google_cse_id: Some("cx".into()),
            searxng_enabled: true,
            searxng_url: Some("http://localhost:8888".into()),
            ..Default::default()
        };
        let agg = SearchAggregator::from_config(&cfg).unwrap();
        assert_eq!(
            agg.provider_names(),
            ["google_cse", "searxng", "duckduckgo", "startpage"]
        );

        let cfg = SearchConfig {
            ddg_disabled: true,
            startpage_enabled: false,
            ..Default::default()
        };
        assert!(SearchAggregator::from_config(&cfg).unwrap().provider_names().is_empty());
    }
}
