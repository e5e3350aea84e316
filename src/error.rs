//! Error taxonomy for the query-to-diagram pipeline.
//!
//! Every failure a user can see flows through one of these enums and ends
//! up in the single current-error slot of the app shell. Collaborator
//! failures are never retried; they terminate the current submission and
//! leave the previously rendered diagram untouched.

use thiserror::Error;

/// Errors from the collaborator HTTP boundary (GitLab, code-context
/// search, completion backend).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("access token is not configured")]
    AuthMissing,

    #[error("upstream responded with status {status}")]
    Upstream { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    /// Upstream HTTP status, when this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Upstream { status } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from one end-to-end analyzer submission.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("please provide a query")]
    EmptyQuery,

    #[error("access token is not configured")]
    AuthMissing,

    #[error("failed to fetch code context: {0}")]
    ContextFetch(String),

    #[error("failed to generate diagram (status {status})")]
    CompletionRequest { status: u16 },

    #[error("no Mermaid diagram found in response")]
    NoDiagramFound,
}

impl From<ApiError> for AnalyzeError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthMissing => AnalyzeError::AuthMissing,
            ApiError::Upstream { status } => AnalyzeError::CompletionRequest { status },
            other => AnalyzeError::CompletionRequest {
                status: status_of(&other),
            },
        }
    }
}

fn status_of(err: &ApiError) -> u16 {
    err.status().unwrap_or(0)
}

/// Renderer initialization failure.
#[derive(Debug, Error)]
#[error("failed to initialize diagram renderer: {reason}")]
pub struct InitError {
    pub reason: String,
}

impl InitError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A single render attempt failed. Recoverable: the renderer returns to
/// Ready and a later attempt may succeed.
#[derive(Debug, Clone, Error)]
#[error("failed to render diagram: {reason}")]
pub struct RenderError {
    pub reason: String,
}

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Voice capture failure.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("speech recognition is not supported on this system")]
    Unavailable,

    #[error("failed to access microphone: {0}")]
    Device(String),
}
