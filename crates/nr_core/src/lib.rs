pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod scraper;
pub mod storage;
pub mod types;

pub use error::{Error, ExtractionError, Result};
pub use models::{EmbeddingModel, InferenceModel};
pub use retry::{with_retry, RetryPolicy};
pub use scraper::{ArticleFetcher, SearchProvider};
pub use storage::DocumentStore;
pub use types::{
    cosine_similarity, ChatMessage, Document, DocumentMetadata, ExtractedArticle, FetchedArticle, Role,
    ScoredDocument, SearchResult, SummarizedArticle,
};
