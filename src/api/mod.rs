//! Collaborator boundary - HTTP clients for the three external services:
//! GitLab repository listing, code-context search, and the completion
//! backend. The pipeline core never talks to a third-party API directly;
//! it goes through the trait seams defined here so tests can substitute
//! mocks.

pub mod completion;
pub mod context;
pub mod gitlab;
pub mod models;

pub use completion::CompletionClient;
pub use context::ContextClient;
pub use gitlab::GitLabClient;
pub use models::{CompletionParams, ContextRecord, PromptMessage, Repository};

use crate::error::ApiError;

/// Code-context search collaborator.
pub trait ContextProvider {
    fn fetch_code_context(
        &self,
        query: &str,
        repository: &str,
    ) -> Result<Vec<ContextRecord>, ApiError>;
}

/// Completion-model collaborator.
pub trait CompletionProvider {
    fn request_completion(
        &self,
        messages: &[PromptMessage],
        params: &CompletionParams,
    ) -> Result<String, ApiError>;
}
