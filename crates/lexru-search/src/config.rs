use std::time::Duration;

/// Authoritative legal-publication domains used for site-restricted queries.
pub const DEFAULT_SOURCE_SITES: &[&str] = &[
    "pravo.gov.ru",
    "consultant.ru",
    "base.garant.ru",
    "sudact.ru",
    "publication.pravo.gov.ru",
];

pub const DEFAULT_MAX_RESULTS: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Search backends and limits for the aggregator.
///
/// A provider is only added to the cascade when its settings allow it:
/// Google needs both key and engine id, SearXNG needs `searxng_enabled`
/// and a URL.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub source_sites: Vec<String>,
    pub max_results: usize,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub searxng_url: Option<String>,
    pub searxng_enabled: bool,
    pub startpage_enabled: bool,
    pub ddg_disabled: bool,
    /// Per-request timeout for provider calls.
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            source_sites: DEFAULT_SOURCE_SITES.iter().map(|s| s.to_string()).collect(),
            max_results: DEFAULT_MAX_RESULTS,
            google_api_key: None,
            google_cse_id: None,
            searxng_url: None,
            searxng_enabled: false,
            startpage_enabled: true,
            ddg_disabled: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SearchConfig {
    /// Key and engine id, when both are present and non-blank.
    pub fn google_credentials(&self) -> Option<(&str, &str)> {
        let key = self.google_api_key.as_deref().filter(|s| !s.trim().is_empty())?;
        let cx = self.google_cse_id.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((key, cx))
    }

    /// SearXNG base URL when the backend is enabled.
    pub fn searxng_base(&self) -> Option<&str> {
        if !self.searxng_enabled {
            return None;
        }
        self.searxng_url.as_deref().filter(|s| !s.trim().is_empty())
    }
}
