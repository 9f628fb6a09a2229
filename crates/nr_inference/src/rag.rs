use std::sync::Arc;

use async_trait::async_trait;
use nr_core::{ChatMessage, DocumentStore, EmbeddingModel, InferenceModel, Result, ScoredDocument};
use tracing::{debug, info, instrument};

/// Anything that can answer a free-form question.
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String>;
}

/// Retrieval-augmented question answering over a document store.
///
/// Every retrieved document is inlined into a single prompt ("stuff" chain).
pub struct RetrievalQa {
    model: Arc<dyn InferenceModel>,
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<dyn DocumentStore>,
    top_k: usize,
}

impl RetrievalQa {
    pub fn new(
        model: Arc<dyn InferenceModel>,
        embedder: Arc<dyn EmbeddingModel>,
        store: Arc<dyn DocumentStore>,
        top_k: usize,
    ) -> Self {
        Self {
            model,
            embedder,
            store,
            top_k: top_k.max(1),
        }
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredDocument>> {
        let embedding = self.embedder.embed(question).await?;
        self.store.find_similar(&embedding, self.top_k).await
    }
}

impl std::fmt::Debug for RetrievalQa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalQa")
            .field("model", &self.model.name())
            .field("embedder", &self.embedder.name())
            .field("documents", &self.store.len())
            .field("top_k", &self.top_k)
            .finish()
    }
}

pub fn stuff_prompt(context: &[ScoredDocument], question: &str) -> String {
    let context = context
        .iter()
        .map(|hit| hit.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
{}\n\nQuestion: {}\nHelpful Answer:",
        context, question
    )
}

#[async_trait]
impl QuestionAnswerer for RetrievalQa {
    #[instrument(level = "info", skip(self))]
    async fn answer(&self, question: &str) -> Result<String> {
        let hits = self.retrieve(question).await?;
        info!(hits = hits.len(), "🔍 Retrieved context");
        for hit in &hits {
            debug!(score = hit.score, title = %hit.document.metadata.title, "context document");
        }

        let messages = [ChatMessage::user(stuff_prompt(&hits, question))];
        self.model.chat(&messages).await
    }
}
