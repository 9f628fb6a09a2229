use std::path::Path;
use std::sync::Arc;

use nr_core::{
    ArticleFetcher, Document, EmbeddingModel, InferenceModel, Result, SearchProvider, SummarizedArticle,
};
use nr_inference::{summarize_all, Summarizer};
use nr_storage::{Indexer, VectorIndex};
use tracing::{info, instrument, warn};

use crate::fetcher::fetch_all;
use crate::search::search_with_pagination;

/// What to collect in one pipeline run.
#[derive(Debug, Clone)]
pub struct CorpusRequest {
    /// Topic given to the summarizer
    pub topic: String,
    /// String sent to the search provider
    pub query: String,
    pub desired_count: usize,
}

/// How many items survived each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub searched: usize,
    pub fetched: usize,
    pub summarized: usize,
}

#[derive(Debug)]
pub struct CorpusReport {
    pub index: VectorIndex,
    pub stats: CorpusStats,
}

/// Runs search, scraping, summarization and indexing in sequence.
pub struct CorpusManager {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn ArticleFetcher>,
    summarizer: Summarizer,
    indexer: Indexer,
    concurrency: usize,
}

impl CorpusManager {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn ArticleFetcher>,
        model: Arc<dyn InferenceModel>,
        embedder: Arc<dyn EmbeddingModel>,
        concurrency: usize,
    ) -> Self {
        Self {
            search,
            fetcher,
            summarizer: Summarizer::new(model),
            indexer: Indexer::new(embedder),
            concurrency: concurrency.max(1),
        }
    }

    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    /// Search, fetch and summarize. Failed items are dropped along the way.
    pub async fn collect(&self, request: &CorpusRequest) -> (Vec<SummarizedArticle>, CorpusStats) {
        let results = search_with_pagination(self.search.as_ref(), &request.query, request.desired_count).await;
        let searched = results.len();

        let fetched = fetch_all(self.fetcher.as_ref(), results, self.concurrency).await;
        let fetched_count = fetched.len();

        let summarized = summarize_all(&self.summarizer, &request.topic, fetched, self.concurrency).await;
        let stats = CorpusStats {
            searched,
            fetched: fetched_count,
            summarized: summarized.len(),
        };
        (summarized, stats)
    }

    pub fn documents(items: &[SummarizedArticle]) -> Vec<Document> {
        items.iter().map(Document::from).collect()
    }

    /// Builds the index, persists it to `index_dir` and returns the reloaded copy.
    #[instrument(level = "info", skip(self, index_dir), fields(query = %request.query))]
    pub async fn run(&self, request: &CorpusRequest, index_dir: &Path) -> Result<CorpusReport> {
        let (summarized, stats) = self.collect(request).await;
        if summarized.is_empty() {
            warn!("corpus is empty; the index will have no documents");
        }

        let index = self.indexer.build_index(Self::documents(&summarized)).await?;
        self.indexer.persist(&index, index_dir)?;
        let index = self.indexer.load(index_dir)?;

        info!(
            searched = stats.searched,
            fetched = stats.fetched,
            summarized = stats.summarized,
            indexed = index.len(),
            "✅ Corpus ready"
        );
        Ok(CorpusReport { index, stats })
    }
}

impl std::fmt::Debug for CorpusManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusManager")
            .field("search", &self.search.name())
            .field("summarizer", &self.summarizer)
            .field("indexer", &self.indexer)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
