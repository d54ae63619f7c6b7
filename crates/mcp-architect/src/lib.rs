//! MCP Server for the Hybrid Code Architect
//!
//! This crate exposes the generate → review → self-correct pipeline as a
//! single MCP (Model Context Protocol) tool:
//! - `generate_and_review` - Generate Python code for a task, review it and
//!   fix reported issues once

use architect::{ArchitectConfig, Orchestrator};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler,
};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Request to generate and review code
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateAndReviewRequest {
    /// The coding task to generate code for
    #[schemars(description = "The coding task or requirement to generate Python code for.")]
    pub prompt: String,
}

/// Architect MCP Service
#[derive(Clone)]
pub struct ArchitectService {
    orchestrator: Arc<Orchestrator>,
    tool_router: ToolRouter<ArchitectService>,
}

impl ArchitectService {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ArchitectService {
    #[tool(
        description = "Generates Python code using Gemini and reviews it using Claude. Includes fallback and self-correction loop."
    )]
    async fn generate_and_review(
        &self,
        Parameters(request): Parameters<GenerateAndReviewRequest>,
    ) -> Result<CallToolResult, McpError> {
        info!(prompt_len = request.prompt.len(), "generate_and_review called");

        let result = self.orchestrator.run(&request.prompt).await;

        let output = serde_json::to_string_pretty(&result).map_err(|e| McpError {
            code: ErrorCode(-32603),
            message: Cow::from(format!("Failed to serialize result: {}", e)),
            data: None,
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}

#[tool_handler]
impl ServerHandler for ArchitectService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hybrid-ai-code-architect".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Use generate_and_review with a coding task prompt. The result is a JSON \
                 object with generated_code, security_review (LGTM or '- ' bullet findings) \
                 and reviewer_used."
                    .to_string(),
            ),
        }
    }
}

/// Configuration from environment variables
pub struct ServiceConfig {
    pub architect: ArchitectConfig,
    pub log_file: PathBuf,
}

impl ServiceConfig {
    /// Load configuration from environment variables, falling back to the
    /// nearest `.env` file for variables the environment does not set.
    pub fn from_env() -> anyhow::Result<Self> {
        let file_vars = collect_env_file(dotenvy::dotenv_iter())?;
        Self::from_lookup(layered_lookup(|key| std::env::var(key).ok(), file_vars))
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let defaults = ArchitectConfig::default();

        let google_api_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("GOOGLE_API_KEY environment variable not set")?;

        // Optional: without it every review goes to the fallback reviewer.
        let anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|v| !v.trim().is_empty());

        let claude_max_tokens = match lookup("ARCHITECT_CLAUDE_MAX_TOKENS") {
            Some(v) => v
                .parse::<u32>()
                .context("ARCHITECT_CLAUDE_MAX_TOKENS is not a valid number")?,
            None => defaults.claude_max_tokens,
        };

        let max_retries = match lookup("ARCHITECT_MAX_RETRIES") {
            Some(v) => v
                .parse::<u32>()
                .context("ARCHITECT_MAX_RETRIES is not a valid number")?,
            None => defaults.max_retries,
        };

        let log_file = lookup("ARCHITECT_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(architect::logging::DEFAULT_LOG_FILE));

        Ok(Self {
            architect: ArchitectConfig {
                google_api_key,
                anthropic_api_key,
                gemini_model: lookup("ARCHITECT_GEMINI_MODEL").unwrap_or(defaults.gemini_model),
                claude_model: lookup("ARCHITECT_CLAUDE_MODEL").unwrap_or(defaults.claude_model),
                claude_max_tokens,
                gemini_base_url: lookup("GEMINI_API_BASE_URL").unwrap_or(defaults.gemini_base_url),
                anthropic_base_url: lookup("ANTHROPIC_API_BASE_URL")
                    .unwrap_or(defaults.anthropic_base_url),
                max_retries,
            },
            log_file,
        })
    }
}

/// Read the `KEY=value` pairs of a `.env` file. A missing file yields nothing.
pub fn read_env_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    collect_env_file(dotenvy::from_path_iter(path))
}

fn collect_env_file<R: std::io::Read>(
    iter: dotenvy::Result<dotenvy::Iter<R>>,
) -> anyhow::Result<HashMap<String, String>> {
    use anyhow::Context;

    match iter {
        Ok(iter) => iter
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to parse .env file"),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(e).context("Failed to read .env file"),
    }
}

/// Values from `lookup` win; `file_vars` only fill in what it leaves unset.
fn layered_lookup(
    lookup: impl Fn(&str) -> Option<String>,
    file_vars: HashMap<String, String>,
) -> impl Fn(&str) -> Option<String> {
    move |key| lookup(key).or_else(|| file_vars.get(key).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect::{
        ArchitectError, ArchitectResult, CodeGenerator, CodeReviewer, GeneratedCode, ReviewResult,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGenerator {
        code: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CodeGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> ArchitectResult<GeneratedCode> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            GeneratedCode::from_raw(self.code)
        }
    }

    struct FixedReviewer(Option<&'static str>);

    #[async_trait]
    impl CodeReviewer for FixedReviewer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn review(&self, _code: &str) -> ArchitectResult<ReviewResult> {
            match self.0 {
                Some(raw) => Ok(ReviewResult::normalize(raw)),
                None => Err(ArchitectError::FallbackReview("provider down".to_string())),
            }
        }
    }

    async fn call_tool(service: &ArchitectService, prompt: &str) -> serde_json::Value {
        let result = service
            .generate_and_review(Parameters(GenerateAndReviewRequest {
                prompt: prompt.to_string(),
            }))
            .await
            .unwrap();

        let raw = serde_json::to_value(&result).unwrap();
        let text = raw["content"][0]["text"].as_str().unwrap().to_string();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_generate_and_review_end_to_end() {
        let generator = Arc::new(FixedGenerator {
            code: "def add(a, b):\n    return a + b",
            calls: AtomicUsize::new(0),
        });
        let service = ArchitectService::new(Orchestrator::new(
            generator.clone(),
            Arc::new(FixedReviewer(Some("LGTM"))),
            Arc::new(FixedReviewer(None)),
        ));

        let parsed = call_tool(&service, "Write a function to add 2 numbers.").await;

        assert_eq!(
            parsed,
            serde_json::json!({
                "generated_code": "def add(a, b):\n    return a + b",
                "security_review": "LGTM",
                "reviewer_used": "claude"
            })
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_total_failure_is_still_a_tool_success() {
        let service = ArchitectService::new(Orchestrator::new(
            Arc::new(FixedGenerator {
                code: "x = 1",
                calls: AtomicUsize::new(0),
            }),
            Arc::new(FixedReviewer(None)),
            Arc::new(FixedReviewer(None)),
        ));

        let parsed = call_tool(&service, "anything").await;

        assert_eq!(parsed["generated_code"], "");
        assert_eq!(parsed["reviewer_used"], "none");
        assert!(parsed["security_review"]
            .as_str()
            .unwrap()
            .starts_with("Critical failure: "));
    }

    #[test]
    fn test_server_info() {
        let service = ArchitectService::new(Orchestrator::new(
            Arc::new(FixedGenerator {
                code: "x = 1",
                calls: AtomicUsize::new(0),
            }),
            Arc::new(FixedReviewer(Some("LGTM"))),
            Arc::new(FixedReviewer(Some("LGTM"))),
        ));

        let info = service.get_info();
        assert_eq!(info.server_info.name, "hybrid-ai-code-architect");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_lists_single_tool_requiring_prompt() {
        let service = ArchitectService::new(Orchestrator::new(
            Arc::new(FixedGenerator {
                code: "x = 1",
                calls: AtomicUsize::new(0),
            }),
            Arc::new(FixedReviewer(Some("LGTM"))),
            Arc::new(FixedReviewer(Some("LGTM"))),
        ));

        let tools = service.tool_router.list_all();
        assert_eq!(tools.len(), 1);

        let tool = &tools[0];
        assert_eq!(tool.name, "generate_and_review");
        assert_eq!(
            tool.input_schema.get("required"),
            Some(&serde_json::json!(["prompt"]))
        );
        assert!(tool.input_schema["properties"].get("prompt").is_some());
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "g-key")])).unwrap();

        assert_eq!(config.architect.google_api_key, "g-key");
        assert!(config.architect.anthropic_api_key.is_none());
        assert_eq!(config.architect.gemini_model, "gemini-2.5-flash-lite");
        assert_eq!(config.architect.claude_max_tokens, 500);
        assert_eq!(config.log_file, PathBuf::from("logs/server_debug.log"));
    }

    #[test]
    fn test_service_config_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("ANTHROPIC_API_KEY", "a-key"),
            ("ARCHITECT_CLAUDE_MODEL", "claude-opus"),
            ("ARCHITECT_CLAUDE_MAX_TOKENS", "1024"),
            ("ARCHITECT_MAX_RETRIES", "0"),
            ("ARCHITECT_LOG_FILE", "/tmp/architect.log"),
        ]))
        .unwrap();

        assert_eq!(config.architect.anthropic_api_key.as_deref(), Some("a-key"));
        assert_eq!(config.architect.claude_model, "claude-opus");
        assert_eq!(config.architect.claude_max_tokens, 1024);
        assert_eq!(config.architect.max_retries, 0);
        assert_eq!(config.log_file, PathBuf::from("/tmp/architect.log"));
    }

    #[test]
    fn test_service_config_requires_google_key() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "a-key")]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_service_config_blank_anthropic_key_disables_primary() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("ANTHROPIC_API_KEY", "   "),
        ]))
        .unwrap();
        assert!(config.architect.anthropic_api_key.is_none());
    }

    #[test]
    fn test_service_config_rejects_bad_numbers() {
        let result = ServiceConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("ARCHITECT_CLAUDE_MAX_TOKENS", "lots"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "GOOGLE_API_KEY=file-key\n# comment\nANTHROPIC_API_KEY=\"a-key\"\n")
            .unwrap();

        let vars = read_env_file(&path).unwrap();
        assert_eq!(vars.get("GOOGLE_API_KEY").map(String::as_str), Some("file-key"));
        assert_eq!(vars.get("ANTHROPIC_API_KEY").map(String::as_str), Some("a-key"));
    }

    #[test]
    fn test_missing_env_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vars = read_env_file(&dir.path().join(".env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_env_file_fills_unset_variables_only() {
        let file_vars = HashMap::from([
            ("GOOGLE_API_KEY".to_string(), "file-key".to_string()),
            ("ANTHROPIC_API_KEY".to_string(), "file-anthropic".to_string()),
        ]);
        let lookup = layered_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "env-anthropic")]), file_vars);

        let config = ServiceConfig::from_lookup(lookup).unwrap();
        assert_eq!(config.architect.google_api_key, "file-key");
        assert_eq!(
            config.architect.anthropic_api_key.as_deref(),
            Some("env-anthropic")
        );
    }
}
