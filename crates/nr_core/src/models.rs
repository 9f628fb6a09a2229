use async_trait::async_trait;
use std::fmt;
use crate::types::ChatMessage;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Send an ordered conversation and return the reply text
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync + fmt::Debug {
    /// Model identifier; indexes record it so queries use the same model
    fn name(&self) -> &str;

    /// Generate a fixed-dimension embedding for a piece of text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
