//! Startpage, scraped from its HTML results page. Hits carry no snippet.

use async_trait::async_trait;
use lexru_core::SearchHit;
use reqwest::Client;
use reqwest::header::REFERER;
use scraper::Html;
use tracing::info;

use crate::http::{ProviderError, send_for_text};
use crate::markup::{element_text, selector};
use crate::provider::SearchProvider;

pub const ENDPOINT: &str = "https://www.startpage.com/sp/search";

pub struct Startpage {
    client: Client,
}

impl Startpage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchProvider for Startpage {
    fn name(&self) -> &'static str {
        "startpage"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let req = self
            .client
            .get(ENDPOINT)
            .header(REFERER, "https://www.startpage.com/")
            .query(&[("query", query), ("cat", "web"), ("language", "ru_RU")]);
        let body = send_for_text(req).await?;
        let hits = parse_results(&body, limit)?;
        info!(count = hits.len(), "startpage results");
        Ok(hits)
    }
}

pub fn parse_results(body: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
    let doc = Html::parse_document(body);
    let link_sel = selector("a.result-link")?;
    Ok(doc
        .select(&link_sel)
        .filter_map(|a| {
            let url = a.value().attr("href")?.trim();
            (!url.is_empty()).then(|| SearchHit {
                title: element_text(a),
                url: url.to_string(),
                snippet: String::new(),
            })
        })
        .take(limit)
        .collect())
}
