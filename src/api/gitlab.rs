//! GitLab repository listing client.
//!
//! Thin wrapper over `GET /api/v4/projects` scoped to the user's
//! memberships. Results are capped at 20 per search to keep the selector
//! responsive.

use super::models::Repository;
use crate::error::ApiError;

/// Client configuration for the GitLab API.
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    pub base_url: String,
    pub token: Option<String>,
}

pub struct GitLabClient {
    config: GitLabConfig,
    http_client: reqwest::blocking::Client,
}

impl GitLabClient {
    pub fn new(config: GitLabConfig) -> Self {
        Self {
            config,
            http_client: reqwest::blocking::Client::new(),
        }
    }

    /// Search repositories the token holder is a member of, ordered by
    /// name ascending.
    pub fn list_repositories(&self, search: &str) -> Result<Vec<Repository>, ApiError> {
        let token = match self.config.token.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(ApiError::AuthMissing),
        };

        let url = format!("{}/api/v4/projects", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .header("PRIVATE-TOKEN", token)
            .query(&[
                ("membership", "true"),
                ("per_page", "20"),
                ("search", search),
                ("order_by", "name"),
                ("sort", "asc"),
            ])
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthMissing);
        }
        if !status.is_success() {
            log::error!("GitLab API error: status {}", status);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
            });
        }

        let repos: Vec<Repository> = response.json()?;
        log::debug!("GitLab search '{}' returned {} repos", search, repos.len());
        Ok(repos)
    }
}

#[cfg(test)]
mod tests {
    use super::super::models::Repository;

    #[test]
    fn test_repository_decodes_gitlab_shape() {
        let json = r#"{
            "id": 42,
            "name": "billing",
            "path_with_namespace": "platform/billing",
            "web_url": "https://gitlab.example.com/platform/billing",
            "description": "ignored extra field"
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.id, 42);
        assert_eq!(repo.path_with_namespace, "platform/billing");
    }
}
