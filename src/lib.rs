//! CodeFlow Studio - Query-to-Diagram Explorer
//!
//! Turns natural-language questions about a repository into rendered
//! flowcharts: context retrieval, LLM completion, Mermaid extraction,
//! and an interactive native viewer.

pub mod api;
pub mod config;
pub mod diagram;
pub mod error;
pub mod pipeline;
pub mod voice;

// Re-export commonly used types
pub use api::{
    CompletionClient, CompletionParams, CompletionProvider, ContextClient, ContextProvider,
    ContextRecord, GitLabClient, PromptMessage, Repository,
};
pub use config::AppConfig;
pub use diagram::{DiagramViewer, RenderConfig, RenderState};
pub use error::{AnalyzeError, ApiError, CaptureError, InitError, RenderError};
pub use pipeline::{compose_context, extract_mermaid, AnalysisMode, Analyzer};
