use async_trait::async_trait;

use crate::portfolio::Quote;

pub mod refresh;
pub mod stooq;

pub use refresh::{RefreshPool, RefreshProgress, RefreshReport};
pub use stooq::StooqSource;

/// Default concurrency guard applied when fanning out quote requests.
pub const REFRESH_CONCURRENCY_LIMIT: usize = 5;

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}

/// A single failed fetch. The batch never fails as a whole; failures are
/// collected per symbol and the cache entry for that symbol is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub symbol: String,
    pub error: String,
}

impl FetchFailure {
    pub fn new<S: Into<String>, E: Into<String>>(symbol: S, error: E) -> Self {
        Self {
            symbol: symbol.into(),
            error: error.into(),
        }
    }
}

/// Capability to fetch one symbol's quote. Success or failure is carried in
/// the return value; implementations must not panic.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchFailure>;
}
