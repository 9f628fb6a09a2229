use std::sync::Arc;

use nr_core::config::{EmbeddingConfig, EmbeddingProvider};
use nr_core::{EmbeddingModel, Result, RetryPolicy};

use crate::models::{OllamaEmbedder, OpenAiEmbedder};

pub mod hashing;

pub use hashing::HashingEmbedder;

/// Creates the embedding model selected in the configuration.
pub fn create_embedder(config: &EmbeddingConfig, retry: &RetryPolicy) -> Result<Arc<dyn EmbeddingModel>> {
    let embedder: Arc<dyn EmbeddingModel> = match config.provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(&config.url, &config.model_name, retry.clone())?),
        EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(
            &config.url,
            &config.model_name,
            config.api_key.clone(),
            retry.clone(),
        )?),
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.dimension)?),
    };
    tracing::debug!(model = embedder.name(), "created embedding model");
    Ok(embedder)
}
