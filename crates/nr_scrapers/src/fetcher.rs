use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use nr_core::{ArticleFetcher, Error, ExtractedArticle, FetchedArticle, Result, SearchResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{error, info, instrument};
use url::Url;

use crate::extract::extract_article;

const USER_AGENT: &str = concat!("newsrag/", env!("CARGO_PKG_VERSION"));

/// Downloads article pages over HTTP and extracts their text.
#[derive(Debug, Clone)]
pub struct HtmlArticleFetcher {
    client: Client,
}

impl HtmlArticleFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        Some(value) => {
            let value = value.to_ascii_lowercase();
            value.starts_with("text/html") || value.starts_with("application/xhtml+xml")
        }
        // servers that omit the header usually serve HTML
        None => true,
    }
}

#[async_trait]
impl ArticleFetcher for HtmlArticleFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<ExtractedArticle> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!("unsupported scheme in {}", url)));
        }

        let response = self.client.get(parsed).send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response(url, response).await);
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_html(content_type.as_deref()) {
            return Err(Error::Scraping(format!(
                "unsupported content type {}",
                content_type.unwrap_or_default()
            )));
        }

        let html = response.text().await?;
        extract_article(&html)
    }
}

/// Fetches every search result, at most `concurrency` at a time.
///
/// A result whose page cannot be fetched or parsed is logged and dropped;
/// the rest keep their search order.
pub async fn fetch_all<F>(fetcher: &F, results: Vec<SearchResult>, concurrency: usize) -> Vec<FetchedArticle>
where
    F: ArticleFetcher + ?Sized,
{
    let total = results.len();
    let fetched: Vec<FetchedArticle> = stream::iter(results)
        .map(|result| async move {
            info!(title = %result.title, url = %result.link, "📰 Scraping article");
            match fetcher.fetch(&result.link).await {
                Ok(extracted) => Some(FetchedArticle::new(result, extracted)),
                Err(e) => {
                    error!(title = %result.title, url = %result.link, error = %e, "failed to fetch article");
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .filter_map(|item| async move { item })
        .collect()
        .await;

    info!(fetched = fetched.len(), total, "🦗 Scraping finished");
    fetched
}
