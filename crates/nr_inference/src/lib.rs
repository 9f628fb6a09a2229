pub mod embeddings;
pub mod models;
pub mod rag;
pub mod reasoning;
pub mod summarizer;

pub use embeddings::create_embedder;
pub use models::create_model;
pub use rag::{QuestionAnswerer, RetrievalQa};
pub use reasoning::{extract_summary, parse_response, ModelAnswer};
pub use summarizer::{summarize_all, Summarizer};

pub mod prelude {
    pub use super::models::create_model;
    pub use super::embeddings::create_embedder;
    pub use super::{QuestionAnswerer, RetrievalQa, Summarizer};
    pub use nr_core::{EmbeddingModel, Error, InferenceModel, Result};
}
