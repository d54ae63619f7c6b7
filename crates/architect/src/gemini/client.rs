use reqwest::Client;
use tracing::{debug, error, warn};

use super::types::*;
use crate::error::{ArchitectError, ArchitectResult};
use crate::retry::{with_retry, DEFAULT_MAX_RETRIES};

const PROVIDER: &str = "Gemini";

/// Client for the Gemini `generateContent` API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override how many times rate limits and server errors are retried
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single-turn generation: one system instruction, one user message.
    ///
    /// Returns the raw (untrimmed) text of the first candidate, which may be
    /// empty. Callers decide whether empty output is an error.
    pub async fn generate_content(
        &self,
        system_instruction: &str,
        user_text: &str,
    ) -> ArchitectResult<String> {
        with_retry(self.max_retries, "gemini_generate_content", || async {
            self.generate_content_inner(system_instruction, user_text)
                .await
        })
        .await
    }

    async fn generate_content_inner(
        &self,
        system_instruction: &str,
        user_text: &str,
    ) -> ArchitectResult<String> {
        debug!(
            model = %self.model,
            input_len = user_text.len(),
            "Calling Gemini generateContent"
        );

        let request = GenerateContentRequest {
            system_instruction: Content::system(system_instruction),
            contents: vec![Content::user(user_text)],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
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
                warn!("Rate limited by Gemini");
                return Err(ArchitectError::RateLimited {
                    provider: PROVIDER,
                    retry_after,
                });
            }

            if let Ok(error_resp) = serde_json::from_str::<GeminiError>(&error_text) {
                error!(
                    "Gemini API error: {} (status: {:?})",
                    error_resp.error.message, error_resp.error.status
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

        let body: GenerateContentResponse = response.json().await?;
        Ok(body.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            "test-key".to_string(),
            server.uri(),
            "gemini-2.5-flash-lite".to_string(),
        )
        .with_max_retries(0)
    }

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new(
            "test-key".to_string(),
            "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            "gemini-2.5-flash-lite".to_string(),
        );
        assert_eq!(client.api_key, "test-key");
        assert_eq!(
            client.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(client.model(), "gemini-2.5-flash-lite");
        assert_eq!(client.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_generate_content_sends_system_and_user_turns() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-lite:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "system rules"}]},
                "contents": [{"role": "user", "parts": [{"text": "write add"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "def add(a, b):\n    return a + b"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate_content("system rules", "write add")
            .await
            .unwrap();
        assert_eq!(text, "def add(a, b):\n    return a + b");
    }

    #[tokio::test]
    async fn test_generate_content_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_content("sys", "task")
            .await
            .unwrap_err();

        match err {
            ArchitectError::ProviderApi {
                message,
                status_code,
                ..
            } => {
                assert_eq!(message, "API key not valid");
                assert_eq!(status_code, Some(400));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_content_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_content("sys", "task")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ArchitectError::RateLimited {
                retry_after: Some(7),
                ..
            }
        ));
    }
}
