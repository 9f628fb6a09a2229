use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with status {status}: {body}")]
    Upstream {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Whether another attempt at the same call could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Upstream { status, .. } => *status == 429 || *status >= 500,
            Error::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map_or(false, |s| s.as_u16() == 429 || s.is_server_error())
            }
            _ => false,
        }
    }

    /// Builds an [`Error::Upstream`] from a non-success response, keeping a
    /// bounded prefix of the body for the log.
    pub async fn from_response(service: &str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let body = body.chars().take(512).collect();
        Error::Upstream {
            service: service.to_string(),
            status,
            body,
        }
    }
}

/// Failure to split a model response into its reasoning and answer parts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("response does not start with the {0} marker")]
    MissingOpenMarker(&'static str),

    #[error("reasoning segment is never closed by the {0} marker")]
    MissingCloseMarker(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
