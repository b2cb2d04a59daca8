mod config;
pub mod http_fetcher;

pub use config::FetcherConfig;
pub use http_fetcher::HttpFetcher;

use async_trait::async_trait;

use crate::app::Result;

/// Network retrieval of one URL.
///
/// Non-success responses are errors. Implementations never retry.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
