use async_trait::async_trait;
use crate::types::ScoredDocument;
use crate::Result;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find the documents closest to an embedding, best match first
    async fn find_similar(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredDocument>>;

    /// Number of stored documents
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
