//! Application configuration.
//!
//! Tokens and backend URLs come from ~/.config/codeflow-studio/config.json
//! when present, with environment variables as fallback. Nothing in the
//! core reads the environment directly; the resolved config is passed into
//! component constructors.

use serde::Deserialize;
use std::path::PathBuf;

/// External config file shape (config.json).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gitlab_base_url: Option<String>,
    #[serde(default)]
    pub gitlab_token: Option<String>,
    #[serde(default)]
    pub sourcegraph_token: Option<String>,
    #[serde(default)]
    pub context_url: Option<String>,
    #[serde(default)]
    pub completion_url: Option<String>,
    #[serde(default)]
    pub repo_url_prefix: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl AppConfig {
    /// Load config.json if it exists, then fill gaps from the environment.
    pub fn load() -> Self {
        let mut config = Self::from_file().unwrap_or_default();
        config.merge_env();
        config
    }

    fn config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("codeflow-studio").join("config.json"))
    }

    fn from_file() -> Option<Self> {
        Self::from_path(&Self::config_path()?)
    }

    /// Load a config file from an explicit path.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No external config at {:?}", path);
            return None;
        }
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to parse config.json: {}", e);
                None
            }
        }
    }

    fn merge_env(&mut self) {
        merge(&mut self.gitlab_base_url, "GITLAB_BASE_URL");
        merge(&mut self.gitlab_token, "GITLAB_TOKEN");
        merge(&mut self.sourcegraph_token, "SOURCEGRAPH_TOKEN");
        merge(&mut self.context_url, "CODY_CONTEXT_URL");
        merge(&mut self.completion_url, "CODY_AI_URL");
        merge(&mut self.repo_url_prefix, "REPO_URL");
        merge(&mut self.model, "CODEFLOW_MODEL");
    }

    /// Parse a config from JSON text. Used by the file loader and tests.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn gitlab_base_url(&self) -> &str {
        self.gitlab_base_url
            .as_deref()
            .unwrap_or("https://gitlab.com")
    }

    pub fn context_url(&self) -> &str {
        self.context_url
            .as_deref()
            .unwrap_or("https://sourcegraph.com/.api/cody/context")
    }

    pub fn completion_url(&self) -> &str {
        self.completion_url
            .as_deref()
            .unwrap_or("https://sourcegraph.com/.api/llm/chat/completions")
    }

    /// Prefix joined with `path_with_namespace` to form the upstream
    /// repository name.
    pub fn repo_url_prefix(&self) -> &str {
        self.repo_url_prefix.as_deref().unwrap_or("gitlab.com/")
    }

    /// Model identifier sent to the completion backend.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or("anthropic::2024-10-22::claude-3-7-sonnet-latest")
    }

    pub fn has_gitlab_token(&self) -> bool {
        self.gitlab_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_sourcegraph_token(&self) -> bool {
        self.sourcegraph_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

fn merge(slot: &mut Option<String>, var: &str) {
    if slot.as_deref().map_or(true, str::is_empty) {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                *slot = Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "gitlab_base_url": "https://gitlab.example.com",
            "gitlab_token": "glpat-abc",
            "sourcegraph_token": "sgp_def",
            "model": "anthropic::custom"
        }"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(
            config.gitlab_base_url.as_deref(),
            Some("https://gitlab.example.com")
        );
        assert!(config.has_gitlab_token());
        assert!(config.has_sourcegraph_token());
        assert_eq!(config.model(), "anthropic::custom");
    }

    #[test]
    fn test_missing_fields_default() {
        let config = AppConfig::from_json("{}").unwrap();
        assert!(!config.has_gitlab_token());
        assert!(!config.has_sourcegraph_token());
        assert_eq!(
            config.model(),
            "anthropic::2024-10-22::claude-3-7-sonnet-latest"
        );
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let config = AppConfig::from_json(r#"{"gitlab_token": ""}"#).unwrap();
        assert!(!config.has_gitlab_token());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"gitlab_token": "glpat-xyz"}"#).unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert!(config.has_gitlab_token());
    }

    #[test]
    fn test_missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::from_path(&dir.path().join("config.json")).is_none());
    }

    #[test]
    fn test_malformed_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(AppConfig::from_path(&path).is_none());
    }
}
