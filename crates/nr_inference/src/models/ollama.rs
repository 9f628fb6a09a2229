use std::fmt;

use async_trait::async_trait;
use nr_core::{with_retry, ChatMessage, EmbeddingModel, Error, InferenceModel, Result, RetryPolicy};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{endpoint, http_client};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Chat model served by a local Ollama instance.
pub struct OllamaModel {
    client: Client,
    chat_url: Url,
    model_name: String,
    retry: RetryPolicy,
}

impl OllamaModel {
    pub fn new(base_url: &str, model_name: &str, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: http_client(&retry)?,
            chat_url: endpoint(base_url, "api/chat")?,
            model_name: model_name.to_string(),
            retry,
        })
    }

    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = self.client.post(self.chat_url.clone()).json(request).send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response("ollama", response).await);
        }
        let body: ChatResponse = response.json().await?;
        Ok(body.message.content)
    }
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("client", &"<reqwest::Client>")
            .field("chat_url", &self.chat_url.as_str())
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OllamaModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model_name,
            messages,
            stream: false,
        };
        with_retry(&self.retry, "ollama chat", || self.send_chat(&request)).await
    }
}

/// Embedding model served by a local Ollama instance.
pub struct OllamaEmbedder {
    client: Client,
    embed_url: Url,
    model_name: String,
    retry: RetryPolicy,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model_name: &str, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: http_client(&retry)?,
            embed_url: endpoint(base_url, "api/embed")?,
            model_name: model_name.to_string(),
            retry,
        })
    }

    async fn send_embed(&self, request: &EmbedRequest<'_>) -> Result<Vec<f32>> {
        let response = self.client.post(self.embed_url.clone()).json(request).send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response("ollama", response).await);
        }
        let body: EmbedResponse = response.json().await?;
        body.embeddings
            .into_iter()
            .next()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Inference("ollama returned no embedding".to_string()))
    }
}

impl fmt::Debug for OllamaEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaEmbedder")
            .field("client", &"<reqwest::Client>")
            .field("embed_url", &self.embed_url.as_str())
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model_name,
            input: text,
        };
        with_retry(&self.retry, "ollama embed", || self.send_embed(&request)).await
    }
}
