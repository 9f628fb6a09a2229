use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single hit returned by the search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "displayLink", default)]
    pub display_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Any other provider metadata, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, link: impl Into<String>, display_link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            display_link: display_link.into(),
            snippet: None,
            extra: Map::new(),
        }
    }
}

/// Readable text pulled out of an article page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub text: String,
    pub authors: Vec<String>,
}

/// A search result whose page was downloaded and parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedArticle {
    pub result: SearchResult,
    pub text: String,
    pub authors: Vec<String>,
}

impl FetchedArticle {
    pub fn new(result: SearchResult, extracted: ExtractedArticle) -> Self {
        Self {
            result,
            text: extracted.text,
            authors: extracted.authors,
        }
    }

    pub fn title(&self) -> &str {
        &self.result.title
    }

    pub fn source(&self) -> &str {
        &self.result.display_link
    }

    pub fn url(&self) -> &str {
        &self.result.link
    }
}

/// A fetched article together with the model's summary of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizedArticle {
    pub article: FetchedArticle,
    /// Model output exactly as received.
    pub raw_response: String,
    /// Answer text with any reasoning segment removed.
    pub summary: String,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub source: String,
    pub url: String,
}

/// The unit stored in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata::default(),
        }
    }
}

impl From<&SummarizedArticle> for Document {
    fn from(item: &SummarizedArticle) -> Self {
        let article = &item.article;
        Self {
            content: format!(
                "Title: {}, Source: {} Summary: {}",
                article.title(),
                article.source(),
                item.summary
            ),
            metadata: DocumentMetadata {
                title: article.title().to_string(),
                source: article.source().to_string(),
                url: article.url().to_string(),
            },
        }
    }
}

/// A retrieval hit with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
