use std::sync::Arc;

use nr_core::config::{ModelConfig, ModelProvider};
use nr_core::{Error, InferenceModel, Result, RetryPolicy};
use url::Url;

pub mod dummy;
pub mod ollama;
pub mod openai;

pub use dummy::DummyModel;
pub use ollama::{OllamaEmbedder, OllamaModel};
pub use openai::{OpenAiEmbedder, OpenAiModel};

/// Creates the chat model selected in the configuration.
pub fn create_model(config: &ModelConfig, retry: &RetryPolicy) -> Result<Arc<dyn InferenceModel>> {
    let model: Arc<dyn InferenceModel> = match config.provider {
        ModelProvider::Ollama => Arc::new(OllamaModel::new(&config.model_url, &config.model_name, retry.clone())?),
        ModelProvider::OpenAi => Arc::new(OpenAiModel::new(
            &config.model_url,
            &config.model_name,
            config.api_key.clone(),
            retry.clone(),
        )?),
        ModelProvider::Dummy => Arc::new(DummyModel::new()),
    };
    tracing::debug!(model = model.name(), "created chat model");
    Ok(model)
}

/// Joins an API path onto a base URL, keeping any path prefix the base carries.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base).map_err(|e| Error::InvalidUrl(format!("{}: {}", base, e)))?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
}

pub(crate) fn http_client(retry: &RetryPolicy) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(retry.timeout).build()?)
}
