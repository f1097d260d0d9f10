pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Plain HTTP GET used by the feed and REST sources.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `url`; non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
