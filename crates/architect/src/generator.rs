//! Code generation against the Gemini provider.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::code::GeneratedCode;
use crate::error::{ArchitectError, ArchitectResult};
use crate::gemini::GeminiClient;
use crate::prompts::CODE_GENERATOR_PROMPT;

/// Turns a task (or refactor prompt) into source code.
///
/// The refactor pass reuses this unchanged with a different prompt.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> ArchitectResult<GeneratedCode>;
}

/// [`CodeGenerator`] backed by Gemini under the fixed generator contract.
pub struct GeminiCodeGenerator {
    client: Arc<GeminiClient>,
}

impl GeminiCodeGenerator {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CodeGenerator for GeminiCodeGenerator {
    async fn generate(&self, prompt: &str) -> ArchitectResult<GeneratedCode> {
        let raw = self
            .client
            .generate_content(CODE_GENERATOR_PROMPT, prompt)
            .await
            .map_err(|e| ArchitectError::Generation(e.to_string()))?;

        let code = GeneratedCode::from_raw(&raw)?;
        debug!(raw_len = raw.len(), code_len = code.as_str().len(), "Cleaned generator output");
        info!(model = %self.client.model(), "Code generated");
        Ok(code)
    }
}
