//! The seam every search backend implements.

use async_trait::async_trait;
use lexru_core::SearchHit;

use crate::http::ProviderError;

/// One search backend.
///
/// Implementations return at most `limit` hits and never retry; any failure
/// is reported as an error and the aggregator moves on.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError>;
}
