use std::fmt;

use async_trait::async_trait;
use nr_core::{with_retry, ChatMessage, EmbeddingModel, Error, InferenceModel, Result, RetryPolicy};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{endpoint, http_client};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

fn authorize(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) if !key.is_empty() => request.bearer_auth(key),
        _ => request,
    }
}

/// Chat model behind an OpenAI-compatible `/chat/completions` endpoint
/// (DeepSeek, vLLM, llama.cpp server, ...).
pub struct OpenAiModel {
    client: Client,
    chat_url: Url,
    model_name: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl OpenAiModel {
    pub fn new(base_url: &str, model_name: &str, api_key: Option<String>, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: http_client(&retry)?,
            chat_url: endpoint(base_url, "chat/completions")?,
            model_name: model_name.to_string(),
            api_key,
            retry,
        })
    }

    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = authorize(self.client.post(self.chat_url.clone()), self.api_key.as_deref())
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::from_response("chat completions", response).await);
        }
        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference("chat completion returned no choices".to_string()))
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("chat_url", &self.chat_url.as_str())
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model_name,
            messages,
        };
        with_retry(&self.retry, "chat completion", || self.send_chat(&request)).await
    }
}

/// Embedding model behind an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    embed_url: Url,
    model_name: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl OpenAiEmbedder {
    pub fn new(base_url: &str, model_name: &str, api_key: Option<String>, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: http_client(&retry)?,
            embed_url: endpoint(base_url, "embeddings")?,
            model_name: model_name.to_string(),
            api_key,
            retry,
        })
    }

    async fn send_embed(&self, request: &EmbeddingRequest<'_>) -> Result<Vec<f32>> {
        let response = authorize(self.client.post(self.embed_url.clone()), self.api_key.as_deref())
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::from_response("embeddings", response).await);
        }
        let body: EmbeddingResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Inference("embeddings endpoint returned no vector".to_string()))
    }
}

impl fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("client", &"<reqwest::Client>")
            .field("embed_url", &self.embed_url.as_str())
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: text,
            model: &self.model_name,
        };
        with_retry(&self.retry, "embedding", || self.send_embed(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Prices rose."}, "finish_reason": "stop"}]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Prices rose.");
    }

    #[test]
    fn test_parse_embedding_response() {
        let body = r#"{"object": "list", "data": [{"object": "embedding", "index": 0, "embedding": [0.5, 0.25]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.5, 0.25]);
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = OpenAiModel::new(
            "https://api.deepseek.com/v1",
            "deepseek-chat",
            Some("sk-secret".to_string()),
            RetryPolicy::default(),
        )
        .unwrap();
        let rendered = format!("{:?}", model);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("https://api.deepseek.com/v1/chat/completions"));
    }
}
