//! Shared HTTP plumbing for search providers and the page fetcher.

use std::time::Duration;

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use thiserror::Error;

/// Browser-like user agent; several legal portals reject default client signatures.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const ACCEPT_LANGUAGE_RU: &str = "ru,en;q=0.9";

/// Error bodies are cut to this many characters before logging.
const MAX_ERROR_BODY: usize = 512;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Stored without its URL, which can carry API keys.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad selector {0}")]
    Selector(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}")]
    Server { status: u16 },
}

/// Build a client that sends the browser user agent and Russian
/// `Accept-Language` on every request and follows redirects.
pub fn browser_client(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_RU));
    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

/// Send a request and return the body, turning non-2xx into [`ProviderError::Server`].
pub(crate) async fn send_for_text(req: RequestBuilder) -> Result<String, ProviderError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Server {
            status: status.as_u16(),
            body: truncate_chars(&body, MAX_ERROR_BODY),
        });
    }
    Ok(resp.text().await?)
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("статья", 3), "ста");
        assert_eq!(truncate_chars("ст", 10), "ст");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn collapse_joins_with_single_spaces() {
        assert_eq!(collapse_whitespace("  КоАП\n\t РФ  ст.  20.1 "), "КоАП РФ ст. 20.1");
    }

    #[test]
    fn server_error_display() {
        let err = ProviderError::Server {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "server returned 429: rate limited");
    }

    #[tokio::test]
    async fn request_errors_hide_query_keys() {
        let client = browser_client(Duration::from_secs(1)).unwrap();
        let req = client.get("ftp://customsearch.example/v1?key=SECRET-KEY&q=x");
        let err = send_for_text(req).await.unwrap_err();
        let ProviderError::Http(inner) = &err else {
            panic!("expected an HTTP error, got {err}");
        };
        assert!(inner.url().is_none());
        assert!(!err.to_string().contains("SECRET-KEY"));
        assert!(!format!("{err:?}").contains("SECRET-KEY"));
    }

    #[test]
    fn client_builds() {
        assert!(browser_client(Duration::from_secs(15)).is_ok());
    }
}
