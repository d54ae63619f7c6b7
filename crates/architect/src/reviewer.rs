//! Code reviewers.
//!
//! Both reviewers share one contract: return `LGTM` or a `- ` bullet list.
//! The orchestrator picks between them with a try-then-substitute policy:
//!
//! - [`ClaudeReviewer`] is the primary reviewer (Anthropic). It is unavailable
//!   when no API key was configured.
//! - [`GeminiFallbackReviewer`] reuses the generation provider with an
//!   auditor prompt and has no availability precondition.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::anthropic::AnthropicClient;
use crate::domain::review::ReviewResult;
use crate::error::{ArchitectError, ArchitectResult};
use crate::gemini::GeminiClient;
use crate::prompts::{FALLBACK_REVIEW_PROMPT, SECURITY_REVIEW_PROMPT};

/// Reviews source code and returns a normalized [`ReviewResult`].
#[async_trait]
pub trait CodeReviewer: Send + Sync {
    /// Reviewer name for logs.
    fn name(&self) -> &str;

    async fn review(&self, code: &str) -> ArchitectResult<ReviewResult>;
}

/// Primary reviewer backed by Anthropic.
pub struct ClaudeReviewer {
    client: Option<Arc<AnthropicClient>>,
}

impl ClaudeReviewer {
    /// `None` marks the reviewer unavailable; every review call then fails
    /// with [`ArchitectError::ReviewerUnavailable`].
    pub fn new(client: Option<Arc<AnthropicClient>>) -> Self {
        if client.is_none() {
            info!("Anthropic API key not configured, primary reviewer disabled");
        }
        Self { client }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl CodeReviewer for ClaudeReviewer {
    fn name(&self) -> &str {
        "claude"
    }

    async fn review(&self, code: &str) -> ArchitectResult<ReviewResult> {
        let client = self.client.as_ref().ok_or_else(|| {
            ArchitectError::ReviewerUnavailable("Anthropic API key not configured".to_string())
        })?;

        let raw = client
            .create_message(SECURITY_REVIEW_PROMPT, code)
            .await
            .map_err(|e| ArchitectError::Reviewer(e.to_string()))?;

        debug!(raw_len = raw.len(), "Primary review received");
        Ok(ReviewResult::normalize(&raw))
    }
}

/// Fallback reviewer backed by the Gemini generation provider.
pub struct GeminiFallbackReviewer {
    client: Arc<GeminiClient>,
}

impl GeminiFallbackReviewer {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CodeReviewer for GeminiFallbackReviewer {
    fn name(&self) -> &str {
        "gemini_fallback"
    }

    async fn review(&self, code: &str) -> ArchitectResult<ReviewResult> {
        let raw = self
            .client
            .generate_content(FALLBACK_REVIEW_PROMPT, code)
            .await
            .map_err(|e| ArchitectError::FallbackReview(e.to_string()))?;

        debug!(raw_len = raw.len(), "Fallback review received");
        Ok(ReviewResult::normalize(&raw))
    }
}
