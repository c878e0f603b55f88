//! Search layer: provider clients, the cascading aggregator, and the page fetcher.

pub mod aggregator;
pub mod config;
pub mod duckduckgo;
pub mod fetcher;
pub mod google;
pub mod http;
pub mod markup;
pub mod provider;
pub mod searxng;
pub mod startpage;

pub use aggregator::SearchAggregator;
pub use config::SearchConfig;
pub use fetcher::{PageFetcher, PageSource};
pub use http::{FetchError, ProviderError};
pub use provider::SearchProvider;
