use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nr_core::{cosine_similarity, Document, DocumentStore, Error, Result, ScoredDocument};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Flat vector index: exact cosine similarity over every stored embedding.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    embedding_model: String,
    dimension: Option<usize>,
    created_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            dimension: None,
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        embedding_model: String,
        dimension: Option<usize>,
        created_at: DateTime<Utc>,
        entries: Vec<IndexEntry>,
    ) -> Self {
        Self {
            embedding_model,
            dimension,
            created_at,
            entries,
        }
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Vector length, fixed by the first stored embedding.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().map(|entry| &entry.document)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, document: Document, embedding: Vec<f32>) -> Result<()> {
        if embedding.is_empty() {
            return Err(Error::Storage("refusing to index an empty embedding".to_string()));
        }
        match self.dimension {
            Some(dimension) if dimension != embedding.len() => {
                return Err(Error::Storage(format!(
                    "embedding has {} dimensions, index expects {}",
                    embedding.len(),
                    dimension
                )));
            }
            Some(_) => {}
            None => self.dimension = Some(embedding.len()),
        }
        self.entries.push(IndexEntry { document, embedding });
        Ok(())
    }

    /// Top `limit` documents by cosine similarity, best first; equal scores
    /// keep insertion order.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredDocument>> {
        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(Error::Storage(format!(
                "query embedding has {} dimensions, index expects {}",
                query.len(),
                dimension
            )));
        }

        let mut hits: Vec<ScoredDocument> = self
            .entries
            .iter()
            .map(|entry| ScoredDocument {
                document: entry.document.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }
}

#[async_trait]
impl DocumentStore for VectorIndex {
    async fn find_similar(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredDocument>> {
        self.search(embedding, limit)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
