//! Wire types shared by the collaborator clients.

use serde::{Deserialize, Serialize};

/// A GitLab project as returned by the projects API.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    pub web_url: String,
}

/// One code chunk from the context search index, in relevance order.
/// Immutable once received.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRecord {
    pub file_path: String,
    pub repository_name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub chunk_content: String,
}

/// A single chat message sent to the completion backend.
#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
    pub role: &'static str,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Fixed generation parameters for one completion request.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionParams {
    /// Deterministic per-call defaults; only the model name varies by
    /// configuration.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 4000,
            temperature: 0.5,
        }
    }
}
