//! Hybrid code architect
//!
//! Generates code for a natural-language task with one LLM provider, has it
//! reviewed by a second provider, and performs at most one self-correction
//! pass when the review reports issues.
//!
//! # Architecture
//!
//! - **Gemini Client**: code generation and fallback review
//! - **Anthropic Client**: primary security/quality review
//! - **Generator / Reviewers**: provider-agnostic traits with prompt contracts
//! - **Orchestrator**: generate → review → refactor → re-review state machine

pub mod anthropic;
pub mod config;
pub mod domain;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod logging;
pub mod orchestrator;
pub mod prompts;
mod retry;
pub mod reviewer;
pub mod state_machine;

pub use anthropic::AnthropicClient;
pub use config::ArchitectConfig;
pub use domain::{
    code::GeneratedCode,
    review::{ReviewResult, ReviewerIdentity, LGTM},
    run_result::{RunResult, CRITICAL_FAILURE_PREFIX},
};
pub use error::{ArchitectError, ArchitectResult};
pub use gemini::GeminiClient;
pub use generator::{CodeGenerator, GeminiCodeGenerator};
pub use orchestrator::{Orchestrator, MAX_REFACTOR_PASSES};
pub use reviewer::{ClaudeReviewer, CodeReviewer, GeminiFallbackReviewer};
pub use state_machine::{PipelineState, PipelineStateMachine};
