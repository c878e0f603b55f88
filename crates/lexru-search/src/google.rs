//! Google Custom Search JSON API.

use async_trait::async_trait;
use lexru_core::SearchHit;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::http::{ProviderError, send_for_text};
use crate::provider::SearchProvider;

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

pub struct GoogleCse {
    client: Client,
    api_key: String,
    engine_id: String,
}

#[derive(Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Option<Vec<CseItem>>,
}

#[derive(Deserialize)]
struct CseItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

impl GoogleCse {
    pub fn new(client: Client, api_key: String, engine_id: String) -> Self {
        Self {
            client,
            api_key,
            engine_id,
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleCse {
    fn name(&self) -> &'static str {
        "google_cse"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let req = self.client.get(ENDPOINT).query(&[
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("q", query),
            ("hl", "ru"),
        ]);
        let body = send_for_text(req).await?;
        let hits = parse_response(&body, limit)?;
        info!(count = hits.len(), "google cse results");
        Ok(hits)
    }
}

fn parse_response(body: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
    let resp: CseResponse = serde_json::from_str(body)?;
    Ok(resp
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|it| SearchHit {
            title: it.title.unwrap_or_default(),
            url: it.link.unwrap_or_default(),
            snippet: it.snippet.unwrap_or_default(),
        })
        .take(limit)
        .collect())
}
