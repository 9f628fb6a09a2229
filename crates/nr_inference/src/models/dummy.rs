use std::fmt;

use nr_core::{ChatMessage, InferenceModel, Result, Role};

/// Offline model for dry runs: replies with the first words of the last user
/// message, wrapped the way reasoning models format their output.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let words: Vec<&str> = prompt.split_whitespace().take(20).collect();
        Ok(format!("<think>Dummy reasoning.</think>\n{}", words.join(" ")))
    }
}
