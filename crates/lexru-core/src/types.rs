//! Request-scoped records passed between search, fetch, ranking and answer stages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One search result from a provider.
///
/// `url` is the dedup key across providers and queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A downloaded page reduced to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub title: String,
    /// Full visible text, whitespace-collapsed.
    pub text: String,
    /// Leading excerpt of `text`, optionally prefixed with an amendment reference.
    pub snippet: String,
}

/// A fetched page with its relevance score for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPage {
    #[serde(flatten)]
    pub page: FetchedPage,
    pub score: i32,
}

/// A page cited to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedSource {
    pub url: String,
    pub title: String,
}

impl From<&RankedPage> for UsedSource {
    fn from(p: &RankedPage) -> Self {
        Self {
            url: p.page.url.clone(),
            title: p.page.title.clone(),
        }
    }
}

/// Anything carrying a URL that downstream stages dedup on.
pub trait HasUrl {
    fn url(&self) -> &str;
}

impl HasUrl for SearchHit {
    fn url(&self) -> &str {
        &self.url
    }
}

impl HasUrl for FetchedPage {
    fn url(&self) -> &str {
        &self.url
    }
}

impl HasUrl for RankedPage {
    fn url(&self) -> &str {
        &self.page.url
    }
}

/// Drop entries with an empty or repeated URL, keeping first occurrences in
/// order, and stop once `limit` entries are kept.
pub fn dedup_by_url<T: HasUrl>(items: impl IntoIterator<Item = T>, limit: usize) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if out.len() >= limit {
            break;
        }
        let url = item.url().trim();
        if url.is_empty() || !seen.insert(url.to_string()) {
            continue;
        }
        out.push(item);
    }
    out
}
