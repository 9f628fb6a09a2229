use std::path::Path;
use std::sync::Arc;

use nr_core::{Document, EmbeddingModel, Result};
use tracing::{debug, info, instrument};

use crate::VectorIndex;

/// Embeds documents and builds, persists or reloads a [`VectorIndex`].
pub struct Indexer {
    embedder: Arc<dyn EmbeddingModel>,
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer").field("embedder", &self.embedder.name()).finish()
    }
}

impl Indexer {
    pub fn new(embedder: Arc<dyn EmbeddingModel>) -> Self {
        Self { embedder }
    }

    #[instrument(level = "info", skip_all, fields(documents = documents.len(), model = self.embedder.name()))]
    pub async fn build_index(&self, documents: Vec<Document>) -> Result<VectorIndex> {
        let total = documents.len();
        let mut index = VectorIndex::new(self.embedder.name());
        for (i, document) in documents.into_iter().enumerate() {
            debug!("🔢 Embedding document {}/{}", i + 1, total);
            let embedding = self.embedder.embed(&document.content).await?;
            index.add(document, embedding)?;
        }
        info!(dimension = ?index.dimension(), "✨ Index built");
        Ok(index)
    }

    pub fn persist(&self, index: &VectorIndex, dir: impl AsRef<Path>) -> Result<()> {
        index.persist(dir).map(|_| ())
    }

    /// Reloads an index, requiring it to match this indexer's embedding model.
    pub fn load(&self, dir: impl AsRef<Path>) -> Result<VectorIndex> {
        VectorIndex::load(dir, self.embedder.name())
    }
}
