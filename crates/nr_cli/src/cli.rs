use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use nr_core::config::{
    EmbeddingConfig, EmbeddingProvider, IndexConfig, ModelConfig, ModelProvider, PipelineConfig, SearchConfig,
    DEFAULT_CONCURRENCY, DEFAULT_EMBEDDING_MODEL, DEFAULT_INDEX_PATH, DEFAULT_MODEL, DEFAULT_OLLAMA_URL,
    DEFAULT_QUERY_PREFIX, DEFAULT_RESULT_COUNT, DEFAULT_SEARCH_ENDPOINT, DEFAULT_TOP_K, DEFAULT_TOPIC,
};
use nr_core::RetryPolicy;

/// A duration written as `90`, `30s`, `2m` or `1h15m30s`. Bare numbers are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let scale = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = total_seconds.saturating_add(num.saturating_mul(scale));
                current_number.clear();
                has_value = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|e| format!("Invalid duration '{}': {}", s, e))?;
            total_seconds = total_seconds.saturating_add(num);
            has_value = true;
        }

        if !has_value {
            return Err(format!("Invalid duration '{}'", s));
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "nr", author, version, about = "Search, summarize and ask questions about the news on a topic", long_about = None)]
pub struct Cli {
    /// Topic to research; the search query is the prefix followed by the topic
    #[arg(long, env = "NR_TOPIC", default_value = DEFAULT_TOPIC)]
    pub topic: String,

    #[arg(long, env = "NR_QUERY_PREFIX", default_value = DEFAULT_QUERY_PREFIX)]
    pub query_prefix: String,

    /// How many search results to collect
    #[arg(long, env = "NR_RESULTS", default_value_t = DEFAULT_RESULT_COUNT)]
    pub results: usize,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_CSE_ID")]
    pub google_cse_id: Option<String>,

    #[arg(long, env = "NR_SEARCH_ENDPOINT", default_value = DEFAULT_SEARCH_ENDPOINT)]
    pub search_endpoint: String,

    #[arg(long, env = "NR_MODEL_PROVIDER", value_enum, default_value_t = ModelProvider::Ollama)]
    pub model_provider: ModelProvider,

    /// Chat model used for summaries and answers
    #[arg(long, env = "NR_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "NR_MODEL_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub model_url: String,

    #[arg(long, env = "NR_MODEL_API_KEY", hide_env_values = true)]
    pub model_api_key: Option<String>,

    #[arg(long, env = "NR_EMBEDDING_PROVIDER", value_enum, default_value_t = EmbeddingProvider::Ollama)]
    pub embedding_provider: EmbeddingProvider,

    #[arg(long, env = "NR_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Defaults to the model URL
    #[arg(long, env = "NR_EMBEDDING_URL")]
    pub embedding_url: Option<String>,

    #[arg(long, env = "NR_EMBEDDING_API_KEY", hide_env_values = true)]
    pub embedding_api_key: Option<String>,

    /// Vector size for the hashing embedder
    #[arg(long, env = "NR_EMBEDDING_DIMENSION", default_value_t = 768)]
    pub embedding_dimension: usize,

    /// Directory holding the persisted index
    #[arg(long, env = "NR_INDEX_PATH", default_value = DEFAULT_INDEX_PATH)]
    pub index_path: PathBuf,

    /// Documents retrieved per question
    #[arg(long, env = "NR_TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    #[arg(long, env = "NR_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout (e.g. 30s, 2m)
    #[arg(long, env = "NR_TIMEOUT", default_value = "120s")]
    pub timeout: HumanDuration,

    #[arg(long, env = "NR_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: usize,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Build the index from fresh search results, then answer questions
    Run,
    /// Build and persist the index, then exit
    Build,
    /// Answer questions against a previously built index
    Query,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let retry = RetryPolicy {
            max_retries: self.max_retries,
            timeout: self.timeout.0,
            ..RetryPolicy::default()
        };

        PipelineConfig {
            topic: self.topic.trim().to_string(),
            search: SearchConfig {
                api_key: self.google_api_key.clone(),
                engine_id: self.google_cse_id.clone(),
                endpoint: self.search_endpoint.clone(),
                desired_count: self.results,
                query_prefix: self.query_prefix.clone(),
            },
            model: ModelConfig {
                provider: self.model_provider,
                model_name: self.model.clone(),
                model_url: self.model_url.clone(),
                api_key: self.model_api_key.clone(),
            },
            embedding: EmbeddingConfig {
                provider: self.embedding_provider,
                model_name: self.embedding_model.clone(),
                url: self.embedding_url.clone().unwrap_or_else(|| self.model_url.clone()),
                api_key: self.embedding_api_key.clone().or_else(|| self.model_api_key.clone()),
                dimension: self.embedding_dimension,
            },
            index: IndexConfig {
                path: self.index_path.clone(),
                top_k: self.top_k,
            },
            retry,
            concurrency: self.concurrency,
        }
    }
}
