use std::fmt;

use async_trait::async_trait;
use nr_core::config::SearchConfig;
use nr_core::{with_retry, Error, Result, RetryPolicy, SearchProvider, SearchResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Most results the Custom Search API returns per request.
pub const PAGE_SIZE: usize = 10;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

/// Google Custom Search JSON API client.
pub struct GoogleSearchProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
    engine_id: String,
    retry: RetryPolicy,
}

impl GoogleSearchProvider {
    pub fn new(config: &SearchConfig, retry: RetryPolicy) -> Result<Self> {
        let (api_key, engine_id) = config.credentials()?;
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;
        Ok(Self {
            client: Client::builder().timeout(retry.timeout).build()?,
            endpoint,
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            retry,
        })
    }

    fn page_url(&self, query: &str, start: usize, num: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("cx", &self.engine_id)
            .append_pair("q", query)
            .append_pair("start", &start.to_string())
            .append_pair("num", &num.to_string());
        url
    }

    async fn send_page(&self, url: &Url) -> Result<Vec<SearchResult>> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response("google custom search", response).await);
        }
        let body: SearchResponse = response.json().await?;
        Ok(body.items)
    }
}

impl fmt::Debug for GoogleSearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSearchProvider")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn search_page(&self, query: &str, start: usize, num: usize) -> Result<Vec<SearchResult>> {
        let url = self.page_url(query, start.max(1), num.clamp(1, PAGE_SIZE));
        with_retry(&self.retry, "search page", || self.send_page(&url)).await
    }
}

/// Collects up to `desired_count` results, one page of at most
/// [`PAGE_SIZE`] at a time.
///
/// Each page asks only for what is still missing, and `start` advances by
/// the number of items the provider actually returned. A short page means
/// the provider has nothing more. Errors end the search but keep what was
/// already collected. Items without a link are skipped.
#[instrument(level = "info", skip(provider), fields(provider = provider.name()))]
pub async fn search_with_pagination<P>(provider: &P, query: &str, desired_count: usize) -> Vec<SearchResult>
where
    P: SearchProvider + ?Sized,
{
    let mut results: Vec<SearchResult> = Vec::new();
    let mut start = 1usize;

    while results.len() < desired_count {
        let requested = (desired_count - results.len()).min(PAGE_SIZE);
        let items = match provider.search_page(query, start, requested).await {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, collected = results.len(), "search failed");
                break;
            }
        };

        let returned = items.len();
        if returned > requested {
            warn!(returned, requested, "provider returned more items than requested");
        }
        let before = results.len();
        results.extend(
            items
                .into_iter()
                .take(requested)
                .filter(|item| !item.link.trim().is_empty()),
        );
        let skipped = returned.min(requested) - (results.len() - before);
        if skipped > 0 {
            warn!(skipped, start, "skipping results without a link");
        }
        start += returned.min(requested);

        if returned < requested {
            break;
        }
    }

    info!(count = results.len(), "🔎 Search finished");
    results
}
