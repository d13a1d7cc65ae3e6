//! Diff chunking and summarization.
//!
//! A saved-object diff can run to thousands of lines of JSON; the
//! summarization endpoint takes bounded requests. The diff is cut into
//! fixed-size line chunks (ignoring hunk boundaries — a logical change may
//! straddle two chunks) and each chunk is summarized in order with the
//! same fixed instruction. Chunks are independent requests processed
//! sequentially; their summaries are concatenated in chunk order.

use serde::{Deserialize, Serialize};

use crate::config::SummarizerConfig;
use crate::error::{Error, Result};

/// Lines per chunk sent to the summarizer.
pub const CHUNK_LINES: usize = 300;

/// Result printed when the diff is empty.
pub const NO_CHANGES: &str = "No changes.";

const SYSTEM_PROMPT: &str = "You summarize changes to Kibana saved objects \
for a non-technical audience. Given a unified diff of saved-object JSON \
files, describe what changed in user-facing terms: dashboards, panels, \
visualizations, queries, field formats. Do not mention object ids, file \
paths, or version hashes. Be concise.";

/// Cut text into chunks of at most `chunk_lines` lines each.
///
/// Concatenating the chunks reproduces the input exactly, including the
/// presence or absence of a trailing newline. Chunk count is
/// `ceil(line_count / chunk_lines)`.
#[must_use]
pub fn chunk_lines(text: &str, chunk_lines: usize) -> Vec<String> {
    assert!(chunk_lines > 0);
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut lines_in_current = 0;

    for line in text.split_inclusive('\n') {
        current.push_str(line);
        lines_in_current += 1;
        if lines_in_current == chunk_lines {
            chunks.push(std::mem::take(&mut current));
            lines_in_current = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the external summarization collaborator.
pub struct Summarizer {
    client: reqwest::Client,
    config: SummarizerConfig,
}

impl Summarizer {
    #[must_use]
    pub fn new(config: SummarizerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Summarize a full diff.
    ///
    /// An empty diff short-circuits to [`NO_CHANGES`] without issuing any
    /// request. Otherwise each chunk is summarized in order and the
    /// non-empty summaries are joined with line breaks.
    ///
    /// # Errors
    ///
    /// Returns `Summarizer` if a request fails or the response is not the
    /// expected shape.
    pub async fn summarize(&self, diff: &str) -> Result<String> {
        if diff.trim().is_empty() {
            return Ok(NO_CHANGES.to_string());
        }

        let chunks = chunk_lines(diff, CHUNK_LINES);
        tracing::debug!(chunks = chunks.len(), "summarizing diff");

        let mut summaries = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let summary = self.summarize_chunk(chunk).await.map_err(|e| {
                Error::Summarizer(format!("chunk {}/{}: {e}", index + 1, chunks.len()))
            })?;
            if !summary.trim().is_empty() {
                summaries.push(summary);
            }
        }

        Ok(summaries.join("\n"))
    }

    async fn summarize_chunk(&self, chunk: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: chunk,
                },
            ],
            temperature: self.config.temperature,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Summarizer(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Summarizer(format!("summarization failed: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Summarizer(format!("unexpected response: {e}")))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}
