//! Splitting reasoning-model output into its hidden reasoning and the answer.
//!
//! Reasoning models such as DeepSeek-R1 reply with
//! `<think>reasoning</think>answer`. Only the answer belongs in the index.

use nr_core::ExtractionError;

pub const OPEN_MARKER: &str = "<think>";
pub const CLOSE_MARKER: &str = "</think>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAnswer {
    pub reasoning: String,
    pub answer: String,
}

/// Parses `<think>reasoning</think>answer`.
///
/// Whitespace before the open marker is allowed. The reasoning ends at the
/// first close marker; the answer is everything after it, trimmed.
pub fn parse_response(raw: &str) -> Result<ModelAnswer, ExtractionError> {
    let body = raw
        .trim_start()
        .strip_prefix(OPEN_MARKER)
        .ok_or(ExtractionError::MissingOpenMarker(OPEN_MARKER))?;
    let (reasoning, answer) = body
        .split_once(CLOSE_MARKER)
        .ok_or(ExtractionError::MissingCloseMarker(CLOSE_MARKER))?;

    Ok(ModelAnswer {
        reasoning: reasoning.trim().to_string(),
        answer: answer.trim().to_string(),
    })
}

/// Returns the answer text of a model response.
///
/// When the response has no well-formed reasoning segment, the whole
/// response, trimmed, is the answer.
pub fn extract_summary(raw: &str) -> (String, Option<String>) {
    match parse_response(raw) {
        Ok(parsed) => (parsed.answer, Some(parsed.reasoning)),
        Err(e) => {
            tracing::debug!(error = %e, "no reasoning segment; using full response");
            (raw.trim().to_string(), None)
        }
    }
}
