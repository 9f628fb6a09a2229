use std::sync::Arc;

use futures::stream::{self, StreamExt};
use nr_core::{ChatMessage, Error, FetchedArticle, InferenceModel, Result, SummarizedArticle};
use tracing::{error, info, instrument};

use crate::reasoning::extract_summary;

pub const SYSTEM_PROMPT: &str = "You will receive a news article scraped from the internet related to a search topic. \
Please provide a summary, including as much factual detail from the article as possible. \
Try to note who wrote the article if you can determine it from the source url or content. \
If parts of it seem biased point it out.";

pub struct Summarizer {
    model: Arc<dyn InferenceModel>,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer").field("model", &self.model.name()).finish()
    }
}

impl Summarizer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self { model }
    }

    /// Asks the model for a summary and returns its raw response.
    pub async fn summarize(&self, topic: &str, title: &str, source: &str, text: &str) -> Result<String> {
        self.summarize_with_byline(topic, title, source, &[], text).await
    }

    pub async fn summarize_with_byline(
        &self,
        topic: &str,
        title: &str,
        source: &str,
        authors: &[String],
        text: &str,
    ) -> Result<String> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt(topic, title, source, authors, text)),
        ];
        self.model.chat(&messages).await
    }

    #[instrument(level = "info", skip_all, fields(title = %article.title()))]
    pub async fn summarize_article(&self, topic: &str, article: FetchedArticle) -> Result<SummarizedArticle> {
        info!("🤖 Summarizing article");
        let raw_response = self
            .summarize_with_byline(topic, article.title(), article.source(), &article.authors, &article.text)
            .await?;
        let (summary, reasoning) = extract_summary(&raw_response);
        if summary.is_empty() {
            return Err(Error::Inference("model returned an empty summary".to_string()));
        }
        info!(chars = summary.len(), "✨ Summary generated");
        tracing::debug!(%summary, "summary text");

        Ok(SummarizedArticle {
            article,
            raw_response,
            summary,
            reasoning,
        })
    }
}

fn user_prompt(topic: &str, title: &str, source: &str, authors: &[String], text: &str) -> String {
    let mut prompt = format!("Search Topic: {}\nArticle Title: {}\nSource: {}\n", topic, title, source);
    if !authors.is_empty() {
        prompt.push_str(&format!("Byline: {}\n", authors.join(", ")));
    }
    prompt.push_str(&format!("Text Scraped from Source:\n\n{}", text));
    prompt
}

/// Summarizes every article, at most `concurrency` at a time.
///
/// Articles whose summarization fails are logged and left out; the others
/// keep their input order.
pub async fn summarize_all(
    summarizer: &Summarizer,
    topic: &str,
    articles: Vec<FetchedArticle>,
    concurrency: usize,
) -> Vec<SummarizedArticle> {
    let total = articles.len();
    let summarized: Vec<SummarizedArticle> = stream::iter(articles)
        .map(|article| async move {
            let title = article.title().to_string();
            let url = article.url().to_string();
            match summarizer.summarize_article(topic, article).await {
                Ok(summarized) => Some(summarized),
                Err(e) => {
                    error!(%title, %url, error = %e, "failed to summarize article");
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .filter_map(|item| async move { item })
        .collect()
        .await;

    info!(summarized = summarized.len(), total, "📝 Summarization finished");
    summarized
}
