//! End-to-end query orchestration.
//!
//! One `run` call is one submission: validate the query, optionally fetch
//! and compose code context, build the prompt, request a completion, and
//! extract the Mermaid payload. No step is retried; the first failure
//! terminates the submission. Loading/error bookkeeping and the
//! one-in-flight rule live in the app shell, which executes `run` on a
//! worker thread.

use super::{compose, extract, prompt};
use crate::api::{CompletionParams, CompletionProvider, ContextProvider};
use crate::error::{AnalyzeError, ApiError};

/// How the query should be grounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisMode {
    /// The query is itself a code snippet to diagram.
    Snippet,
    /// Enrich the query with code context from the given repository
    /// (`path_with_namespace`).
    Repository { repository: String },
}

pub struct Analyzer<C, M> {
    context: C,
    completion: M,
    params: CompletionParams,
}

impl<C: ContextProvider, M: CompletionProvider> Analyzer<C, M> {
    pub fn new(context: C, completion: M, params: CompletionParams) -> Self {
        Self {
            context,
            completion,
            params,
        }
    }

    /// Run one submission and return the extracted Mermaid markup.
    pub fn run(&self, query: &str, mode: &AnalysisMode) -> Result<String, AnalyzeError> {
        if query.trim().is_empty() {
            return Err(AnalyzeError::EmptyQuery);
        }

        let message = match mode {
            AnalysisMode::Snippet => prompt::snippet_prompt(query),
            AnalysisMode::Repository { repository } => {
                let records = self
                    .context
                    .fetch_code_context(query, repository)
                    .map_err(context_error)?;
                // Zero hits means there is nothing to ground the diagram
                // on; prompting with an empty context block would only
                // produce hallucinated structure.
                if records.is_empty() {
                    return Err(AnalyzeError::ContextFetch(format!(
                        "no code context found in {}",
                        repository
                    )));
                }
                let composed = compose::compose_context(&records);
                log::debug!(
                    "composed {} context records ({} bytes)",
                    records.len(),
                    composed.len()
                );
                prompt::repository_prompt(&composed)
            }
        };

        let content = self
            .completion
            .request_completion(&[message], &self.params)
            .map_err(completion_error)?;

        match extract::extract_mermaid(&content) {
            Some(markup) => Ok(markup.to_string()),
            None => Err(AnalyzeError::NoDiagramFound),
        }
    }
}

fn context_error(err: ApiError) -> AnalyzeError {
    match err {
        ApiError::AuthMissing => AnalyzeError::AuthMissing,
        other => AnalyzeError::ContextFetch(other.to_string()),
    }
}

fn completion_error(err: ApiError) -> AnalyzeError {
    match err {
        ApiError::AuthMissing => AnalyzeError::AuthMissing,
        ApiError::Upstream { status } => AnalyzeError::CompletionRequest { status },
        other => AnalyzeError::CompletionRequest {
            status: other.status().unwrap_or(0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ContextRecord, PromptMessage};
    use std::cell::Cell;

    /// Counting mock that returns a fixed completion.
    struct MockCompletion {
        calls: Cell<usize>,
        response: Result<String, u16>,
    }

    impl MockCompletion {
        fn ok(text: &str) -> Self {
            Self {
                calls: Cell::new(0),
                response: Ok(text.to_string()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                calls: Cell::new(0),
                response: Err(status),
            }
        }
    }

    impl CompletionProvider for MockCompletion {
        fn request_completion(
            &self,
            messages: &[PromptMessage],
            _params: &CompletionParams,
        ) -> Result<String, ApiError> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role, "user");
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ApiError::Upstream { status: *status }),
            }
        }
    }

    struct MockContext {
        calls: Cell<usize>,
        records: Result<Vec<ContextRecord>, u16>,
    }

    impl MockContext {
        fn with_records(records: Vec<ContextRecord>) -> Self {
            Self {
                calls: Cell::new(0),
                records: Ok(records),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                calls: Cell::new(0),
                records: Err(status),
            }
        }
    }

    impl ContextProvider for MockContext {
        fn fetch_code_context(
            &self,
            _query: &str,
            _repository: &str,
        ) -> Result<Vec<ContextRecord>, ApiError> {
            self.calls.set(self.calls.get() + 1);
            match &self.records {
                Ok(records) => Ok(records.clone()),
                Err(status) => Err(ApiError::Upstream { status: *status }),
            }
        }
    }

    fn record() -> ContextRecord {
        ContextRecord {
            file_path: "src/main.rs".to_string(),
            repository_name: "example.com/team/app".to_string(),
            start_line: 1,
            end_line: 20,
            chunk_content: "fn main() {}".to_string(),
        }
    }

    fn analyzer(
        context: MockContext,
        completion: MockCompletion,
    ) -> Analyzer<MockContext, MockCompletion> {
        Analyzer::new(context, completion, CompletionParams::for_model("test-model"))
    }

    #[test]
    fn test_snippet_mode_one_completion_call_exact_markup() {
        let a = analyzer(
            MockContext::with_records(vec![]),
            MockCompletion::ok("here:\n```mermaid\nflowchart TD\n  A --> B\n```\ndone"),
        );
        let markup = a.run("fn main() {}", &AnalysisMode::Snippet).unwrap();
        assert_eq!(markup, "flowchart TD\n  A --> B");
        assert_eq!(a.completion.calls.get(), 1);
        // Snippet mode never touches the context collaborator.
        assert_eq!(a.context.calls.get(), 0);
    }

    #[test]
    fn test_empty_query_makes_zero_collaborator_calls() {
        for query in ["", "   ", "\n\t "] {
            let a = analyzer(
                MockContext::with_records(vec![record()]),
                MockCompletion::ok("unused"),
            );
            let err = a.run(query, &AnalysisMode::Snippet).unwrap_err();
            assert!(matches!(err, AnalyzeError::EmptyQuery));
            assert_eq!(a.completion.calls.get(), 0);
            assert_eq!(a.context.calls.get(), 0);
        }
    }

    #[test]
    fn test_repository_mode_fetches_then_completes() {
        let a = analyzer(
            MockContext::with_records(vec![record()]),
            MockCompletion::ok("```mermaid\nA-->B\n```"),
        );
        let mode = AnalysisMode::Repository {
            repository: "team/app".to_string(),
        };
        let markup = a.run("show the call graph", &mode).unwrap();
        assert_eq!(markup, "A-->B");
        assert_eq!(a.context.calls.get(), 1);
        assert_eq!(a.completion.calls.get(), 1);
    }

    #[test]
    fn test_context_failure_stops_before_completion() {
        let a = analyzer(MockContext::failing(502), MockCompletion::ok("unused"));
        let mode = AnalysisMode::Repository {
            repository: "team/app".to_string(),
        };
        let err = a.run("query", &mode).unwrap_err();
        assert!(matches!(err, AnalyzeError::ContextFetch(_)));
        assert_eq!(a.completion.calls.get(), 0);
    }

    #[test]
    fn test_zero_context_records_is_context_failure() {
        let a = analyzer(MockContext::with_records(vec![]), MockCompletion::ok("unused"));
        let mode = AnalysisMode::Repository {
            repository: "team/app".to_string(),
        };
        let err = a.run("query", &mode).unwrap_err();
        assert!(matches!(err, AnalyzeError::ContextFetch(_)));
        assert_eq!(a.completion.calls.get(), 0);
    }

    #[test]
    fn test_completion_status_surfaces() {
        let a = analyzer(MockContext::with_records(vec![]), MockCompletion::failing(503));
        let err = a.run("query", &AnalysisMode::Snippet).unwrap_err();
        assert!(matches!(
            err,
            AnalyzeError::CompletionRequest { status: 503 }
        ));
    }

    #[test]
    fn test_response_without_fence_is_no_diagram_found() {
        let a = analyzer(
            MockContext::with_records(vec![]),
            MockCompletion::ok("Sorry, I can only answer in prose."),
        );
        let err = a.run("query", &AnalysisMode::Snippet).unwrap_err();
        assert!(matches!(err, AnalyzeError::NoDiagramFound));
    }
}
