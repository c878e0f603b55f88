//! Self-hosted SearXNG instance, JSON output.

use async_trait::async_trait;
use lexru_core::SearchHit;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::info;

use crate::http::{ProviderError, send_for_text};
use crate::provider::SearchProvider;

pub struct Searxng {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Option<Vec<SearxResult>>,
}

#[derive(Deserialize)]
struct SearxResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

impl Searxng {
    /// `base_url` like `http://localhost:8888` (trailing slash is trimmed).
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for Searxng {
    fn name(&self) -> &'static str {
        "searxng"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        // X-Real-IP lets the request pass the instance's bot detection as a trusted local client.
        let req = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header("X-Real-IP", "127.0.0.1")
            .query(&[("q", query), ("format", "json"), ("language", "ru")]);
        let body = send_for_text(req).await?;
        let hits = parse_response(&body, limit)?;
        info!(count = hits.len(), "searxng results");
        Ok(hits)
    }
}

fn parse_response(body: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
    let resp: SearxResponse = serde_json::from_str(body)?;
    Ok(resp
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|r| SearchHit {
            title: r.title.unwrap_or_default(),
            url: r.url.unwrap_or_default(),
            snippet: r.content.unwrap_or_default(),
        })
        .take(limit)
        .collect())
}
