//! Page fetcher: downloads a result URL and reduces it to text plus snippet.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use lexru_core::FetchedPage;
use lexru_core::patterns::norms;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use crate::http::{FetchError, browser_client, truncate_chars};
use crate::markup::{document_title, visible_text};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(25);

/// Characters of page text kept as the snippet.
pub const SNIPPET_CHARS: usize = 1800;

static AMENDMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(norms::AMENDMENT).expect("valid amendment regex"));

/// Source of fetched pages; substituted in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: browser_client(timeout)?,
        })
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Server {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        let page = extract_page(url, &body);
        debug!(url, chars = page.text.len(), "fetched page");
        Ok(page)
    }
}

/// Reduce an HTML document to a [`FetchedPage`].
///
/// Title falls back to the URL. See [`build_snippet`] for the snippet.
pub fn extract_page(url: &str, html: &str) -> FetchedPage {
    let doc = Html::parse_document(html);
    let text = visible_text(&doc);
    let title = document_title(&doc).unwrap_or_else(|| url.to_string());
    let snippet = build_snippet(&text);
    FetchedPage {
        url: url.to_string(),
        title,
        text,
        snippet,
    }
}

/// First [`SNIPPET_CHARS`] characters of `text`, prefixed with the first
/// amendment reference found anywhere in `text` as `"<ref> — <snippet>"`.
pub fn build_snippet(text: &str) -> String {
    let head = truncate_chars(text, SNIPPET_CHARS);
    match AMENDMENT.find(text) {
        Some(m) => format!("{} — {head}", m.as_str()),
        None => head,
    }
}
