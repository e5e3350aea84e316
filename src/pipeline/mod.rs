//! Query-to-diagram pipeline.
//!
//! Takes a user query (plus an optional repository), enriches it with code
//! context, asks the completion backend for a Mermaid flowchart, and
//! extracts the fenced diagram from the free-form response.

pub mod analyzer;
pub mod compose;
pub mod extract;
pub mod prompt;

pub use analyzer::{AnalysisMode, Analyzer};
pub use compose::compose_context;
pub use extract::extract_mermaid;
