//! Completion backend client.
//!
//! Sends the prompt messages to an OpenAI-compatible chat endpoint and
//! returns the first choice's message content as free-form text. Whether
//! that text contains a usable diagram is the extractor's problem, not
//! this client's.

use super::models::{CompletionParams, PromptMessage};
use super::CompletionProvider;
use crate::error::ApiError;
use serde::Deserialize;
use serde_json::json;

/// Client configuration for the completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

pub struct CompletionClient {
    config: CompletionConfig,
    http_client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            http_client: reqwest::blocking::Client::new(),
        }
    }
}

impl CompletionProvider for CompletionClient {
    fn request_completion(
        &self,
        messages: &[PromptMessage],
        params: &CompletionParams,
    ) -> Result<String, ApiError> {
        let token = match self.config.token.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(ApiError::AuthMissing),
        };

        let body = json!({
            "model": params.model,
            "max_tokens": params.max_tokens,
            "messages": messages,
            "temperature": params.temperature,
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
            log::error!("Completion API error: status {}", status);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
            });
        }

        let parsed: CompletionResponse = response.json()?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::Decode("response contained no choices".to_string()))?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_takes_first_choice() {
        let json = r#"{
            "choices": [
                { "message": { "role": "assistant", "content": "first" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "first");
    }

    #[test]
    fn test_empty_choices_is_decode_error() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
