use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::anthropic::AnthropicClient;
use crate::error::{ArchitectError, ArchitectResult};
use crate::gemini::GeminiClient;
use crate::generator::GeminiCodeGenerator;
use crate::orchestrator::Orchestrator;
use crate::retry::DEFAULT_MAX_RETRIES;
use crate::reviewer::{ClaudeReviewer, GeminiFallbackReviewer};

/// Provider configuration for the architect pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectConfig {
    /// Gemini API key (generation and fallback review)
    pub google_api_key: String,

    /// Anthropic API key. `None` disables the primary reviewer.
    pub anthropic_api_key: Option<String>,

    /// Gemini model: gemini-2.5-flash-lite
    pub gemini_model: String,

    /// Claude model: claude-sonnet-4-5
    pub claude_model: String,

    /// Max tokens for a primary review
    pub claude_max_tokens: u32,

    pub gemini_base_url: String,

    pub anthropic_base_url: String,

    /// Retries for rate-limited or 5xx provider calls
    pub max_retries: u32,
}

impl Default for ArchitectConfig {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            anthropic_api_key: None,
            gemini_model: "gemini-2.5-flash-lite".to_string(),
            claude_model: "claude-sonnet-4-5".to_string(),
            claude_max_tokens: 500,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            anthropic_base_url: "https://api.anthropic.com/v1".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ArchitectConfig {
    /// Build the orchestrator with live provider clients.
    ///
    /// A missing Anthropic key is not an error; the primary reviewer is
    /// created unavailable and every review falls back to Gemini.
    pub fn build_orchestrator(&self) -> ArchitectResult<Orchestrator> {
        if self.google_api_key.trim().is_empty() {
            return Err(ArchitectError::InvalidConfig(
                "Google API key is required".to_string(),
            ));
        }

        let gemini = Arc::new(
            GeminiClient::new(
                self.google_api_key.clone(),
                self.gemini_base_url.clone(),
                self.gemini_model.clone(),
            )
            .with_max_retries(self.max_retries),
        );

        let anthropic = self
            .anthropic_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| {
                Arc::new(
                    AnthropicClient::new(
                        key.to_string(),
                        self.anthropic_base_url.clone(),
                        self.claude_model.clone(),
                        self.claude_max_tokens,
                    )
                    .with_max_retries(self.max_retries),
                )
            });

        Ok(Orchestrator::new(
            Arc::new(GeminiCodeGenerator::new(gemini.clone())),
            Arc::new(ClaudeReviewer::new(anthropic)),
            Arc::new(GeminiFallbackReviewer::new(gemini)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::ReviewerIdentity;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_architect_config_default() {
        let config = ArchitectConfig::default();
        assert_eq!(config.gemini_model, "gemini-2.5-flash-lite");
        assert_eq!(config.claude_model, "claude-sonnet-4-5");
        assert_eq!(config.claude_max_tokens, 500);
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_missing_google_key_is_invalid() {
        let result = ArchitectConfig::default().build_orchestrator();
        assert!(matches!(result, Err(ArchitectError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_missing_anthropic_key_falls_back_end_to_end() {
        let gemini = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-lite:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "def add(a, b):\n    return a + b"}]}}]
            })))
            .up_to_n_times(1)
            .mount(&gemini)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-lite:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "LGTM"}]}}]
            })))
            .mount(&gemini)
            .await;

        let config = ArchitectConfig {
            google_api_key: "google-key".to_string(),
            anthropic_api_key: Some("  ".to_string()),
            gemini_base_url: gemini.uri(),
            max_retries: 0,
            ..Default::default()
        };

        let result = config
            .build_orchestrator()
            .unwrap()
            .run("Write a function to add 2 numbers.")
            .await;

        assert_eq!(result.generated_code, "def add(a, b):\n    return a + b");
        assert_eq!(result.security_review, "LGTM");
        assert_eq!(result.reviewer_used, ReviewerIdentity::Fallback);
    }

    #[tokio::test]
    async fn test_live_clients_primary_review() {
        let gemini = MockServer::start().await;
        let anthropic = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "```python\nprint('hi')\n```"}]}}]
            })))
            .expect(1)
            .mount(&gemini)
            .await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "LGTM"}]
            })))
            .expect(1)
            .mount(&anthropic)
            .await;

        let config = ArchitectConfig {
            google_api_key: "google-key".to_string(),
            anthropic_api_key: Some("anthropic-key".to_string()),
            gemini_base_url: gemini.uri(),
            anthropic_base_url: anthropic.uri(),
            max_retries: 0,
            ..Default::default()
        };

        let result = config.build_orchestrator().unwrap().run("say hi").await;

        assert_eq!(result.generated_code, "print('hi')");
        assert_eq!(result.reviewer_used, ReviewerIdentity::Primary);
    }
}
