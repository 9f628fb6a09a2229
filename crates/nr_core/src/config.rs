use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::{Error, Result};

pub const DEFAULT_TOPIC: &str = "egg prices";
pub const DEFAULT_QUERY_PREFIX: &str = "news";
pub const DEFAULT_RESULT_COUNT: usize = 30;
pub const DEFAULT_MODEL: &str = "deepseek-r1:7b";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_INDEX_PATH: &str = "news_index";
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelProvider {
    /// Local Ollama server
    Ollama,
    /// Any OpenAI-compatible chat completions endpoint
    #[value(name = "openai")]
    OpenAi,
    /// Offline model that echoes the start of the prompt
    Dummy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmbeddingProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAi,
    /// Offline feature-hashing embedder
    Hashing,
}

#[derive(Clone)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub endpoint: String,
    pub desired_count: usize,
    pub query_prefix: String,
}

impl SearchConfig {
    /// Returns `(api_key, engine_id)` or a config error naming what is missing.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("search API key is not set (GOOGLE_API_KEY)".to_string()))?;
        let engine_id = self
            .engine_id
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("search engine id is not set (GOOGLE_CSE_ID)".to_string()))?;
        Ok((api_key, engine_id))
    }

    pub fn query_for(&self, topic: &str) -> String {
        if self.query_prefix.trim().is_empty() {
            topic.to_string()
        } else {
            format!("{} {}", self.query_prefix.trim(), topic)
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            desired_count: DEFAULT_RESULT_COUNT,
            query_prefix: DEFAULT_QUERY_PREFIX.to_string(),
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("engine_id", &self.engine_id)
            .field("endpoint", &self.endpoint)
            .field("desired_count", &self.desired_count)
            .field("query_prefix", &self.query_prefix)
            .finish()
    }
}

#[derive(Clone)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub model_name: String,
    pub model_url: String,
    pub api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Ollama,
            model_name: DEFAULT_MODEL.to_string(),
            model_url: DEFAULT_OLLAMA_URL.to_string(),
            api_key: None,
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("model_url", &self.model_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model_name: String,
    pub url: String,
    pub api_key: Option<String>,
    /// Only used by the hashing embedder
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model_name: DEFAULT_EMBEDDING_MODEL.to_string(),
            url: DEFAULT_OLLAMA_URL.to_string(),
            api_key: None,
            dimension: 768,
        }
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub path: PathBuf,
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_INDEX_PATH),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Everything the pipeline needs, assembled once and handed to each component.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub topic: String,
    pub search: SearchConfig,
    pub model: ModelConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub retry: RetryPolicy,
    /// Upper bound on articles fetched or summarized at once
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            search: SearchConfig::default(),
            model: ModelConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            retry: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(Error::Config("topic must not be empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.index.top_k == 0 {
            return Err(Error::Config("top-k must be at least 1".to_string()));
        }
        if self.retry.timeout == Duration::ZERO {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.topic, "egg prices");
        assert_eq!(config.search.desired_count, 30);
        assert_eq!(config.model.model_name, "deepseek-r1:7b");
        assert_eq!(config.search.query_for(&config.topic), "news egg prices");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let mut search = SearchConfig::default();
        assert!(matches!(search.credentials(), Err(Error::Config(_))));

        search.api_key = Some("key".to_string());
        assert!(matches!(search.credentials(), Err(Error::Config(_))));

        search.engine_id = Some("cx".to_string());
        assert_eq!(search.credentials().unwrap(), ("key", "cx"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let search = SearchConfig {
            api_key: Some("super-secret".to_string()),
            ..SearchConfig::default()
        };
        let model = ModelConfig {
            api_key: Some("also-secret".to_string()),
            ..ModelConfig::default()
        };
        let rendered = format!("{:?} {:?}", search, model);
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("also-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_empty_prefix_uses_topic_verbatim() {
        let search = SearchConfig {
            query_prefix: "  ".to_string(),
            ..SearchConfig::default()
        };
        assert_eq!(search.query_for("egg prices"), "egg prices");
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = PipelineConfig {
            concurrency: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
