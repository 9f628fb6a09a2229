use async_trait::async_trait;
use crate::types::{ExtractedArticle, SearchResult};
use crate::Result;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the name of the search provider
    fn name(&self) -> &str;

    /// Fetches one page of results. `start` is 1-based, `num` is at most 10.
    async fn search_page(&self, query: &str, start: usize, num: usize) -> Result<Vec<SearchResult>>;
}

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Downloads a page and extracts its readable article text
    async fn fetch(&self, url: &str) -> Result<ExtractedArticle>;
}
