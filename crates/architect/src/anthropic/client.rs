use reqwest::Client;
use tracing::{debug, error, warn};

use super::types::*;
use crate::error::{ArchitectError, ArchitectResult};
use crate::retry::{with_retry, DEFAULT_MAX_RETRIES};

const PROVIDER: &str = "Anthropic";

/// Client for the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    max_retries: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_tokens,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single-turn message. Returns the first text block of the reply.
    pub async fn create_message(&self, system: &str, user_text: &str) -> ArchitectResult<String> {
        with_retry(self.max_retries, "anthropic_create_message", || async {
            self.create_message_inner(system, user_text).await
        })
        .await
    }

    async fn create_message_inner(&self, system: &str, user_text: &str) -> ArchitectResult<String> {
        debug!(
            model = %self.model,
            input_len = user_text.len(),
            "Calling Anthropic messages"
        );

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system.to_string(),
            messages: vec![Message::user(user_text)],
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                warn!("Rate limited by Anthropic");
                return Err(ArchitectError::RateLimited {
                    provider: PROVIDER,
                    retry_after,
                });
            }

            if let Ok(error_resp) = serde_json::from_str::<AnthropicError>(&error_text) {
                error!(
                    "Anthropic API error: {} (type: {:?})",
                    error_resp.error.message, error_resp.error.error_type
                );
                return Err(ArchitectError::ProviderApi {
                    provider: PROVIDER,
                    message: error_resp.error.message,
                    status_code: Some(status.as_u16()),
                });
            }

            return Err(ArchitectError::ProviderApi {
                provider: PROVIDER,
                message: error_text,
                status_code: Some(status.as_u16()),
            });
        }

        let body: MessagesResponse = response.json().await?;
        Ok(body.first_text())
    }
}
