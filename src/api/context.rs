//! Code-context search client.
//!
//! Wraps the Sourcegraph/Cody context endpoint: given a natural-language
//! query and a repository, it returns ranked code chunks. The response
//! order is relevance order and is preserved as-is.

use super::models::ContextRecord;
use super::ContextProvider;
use crate::error::ApiError;
use serde::Deserialize;
use serde_json::json;

/// Client configuration for the context search endpoint.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub endpoint: String,
    pub token: Option<String>,
    /// Prefix prepended to `path_with_namespace` to form the upstream
    /// repository name (e.g. "gitlab.example.com/").
    pub repo_url_prefix: String,
}

pub struct ContextClient {
    config: ContextConfig,
    http_client: reqwest::blocking::Client,
}

/// Upstream response shape: { "results": [ { "blob": {..}, .. } ] }
#[derive(Debug, Deserialize)]
struct ContextResponse {
    #[serde(default)]
    results: Vec<ContextResult>,
}

#[derive(Debug, Deserialize)]
struct ContextResult {
    blob: ContextBlob,
    #[serde(rename = "startLine")]
    start_line: u32,
    #[serde(rename = "endLine")]
    end_line: u32,
    #[serde(rename = "chunkContent")]
    chunk_content: String,
}

#[derive(Debug, Deserialize)]
struct ContextBlob {
    path: String,
    repository: ContextRepository,
}

#[derive(Debug, Deserialize)]
struct ContextRepository {
    name: String,
}

impl ContextClient {
    pub fn new(config: ContextConfig) -> Self {
        Self {
            config,
            http_client: reqwest::blocking::Client::new(),
        }
    }
}

impl ContextProvider for ContextClient {
    fn fetch_code_context(
        &self,
        query: &str,
        repository: &str,
    ) -> Result<Vec<ContextRecord>, ApiError> {
        let token = match self.config.token.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(ApiError::AuthMissing),
        };

        let body = json!({
            "codeResultsCount": 10,
            "query": query,
            "repos": [{ "name": format!("{}{}", self.config.repo_url_prefix, repository) }],
            "textResultsCount": 5,
        });

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .header("Accept", "application/json")
            .header("Authorization", format!("token {}", token))
            .header("X-Requested-With", "ai_automation 1.0")
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Context API error: status {}", status);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
            });
        }

        let parsed: ContextResponse = response.json()?;
        let records = parsed
            .results
            .into_iter()
            .map(|r| ContextRecord {
                file_path: r.blob.path,
                repository_name: r.blob.repository.name,
                start_line: r.start_line,
                end_line: r.end_line,
                chunk_content: r.chunk_content,
            })
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decodes_to_records() {
        let json = r#"{
            "results": [
                {
                    "blob": {
                        "path": "src/auth.rs",
                        "repository": { "name": "gitlab.example.com/platform/billing" }
                    },
                    "startLine": 10,
                    "endLine": 42,
                    "chunkContent": "fn authenticate() {}"
                }
            ]
        }"#;
        let parsed: ContextResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        let r = &parsed.results[0];
        assert_eq!(r.blob.path, "src/auth.rs");
        assert_eq!(r.start_line, 10);
        assert_eq!(r.end_line, 42);
    }

    #[test]
    fn test_missing_results_field_is_empty() {
        let parsed: ContextResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
