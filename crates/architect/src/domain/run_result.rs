use serde::Serialize;

use super::code::GeneratedCode;
use super::review::{ReviewResult, ReviewerIdentity};

/// Prefix of the review field when a run fails.
pub const CRITICAL_FAILURE_PREFIX: &str = "Critical failure: ";

/// Terminal record of one orchestration run, returned to the caller as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub generated_code: String,
    pub security_review: String,
    pub reviewer_used: ReviewerIdentity,
}

impl RunResult {
    pub fn completed(code: GeneratedCode, review: ReviewResult, reviewer: ReviewerIdentity) -> Self {
        Self {
            generated_code: code.into_string(),
            security_review: review.into_string(),
            reviewer_used: reviewer,
        }
    }

    /// Failure record: empty code, `Critical failure: <message>`, no reviewer.
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            generated_code: String::new(),
            security_review: format!("{CRITICAL_FAILURE_PREFIX}{message}"),
            reviewer_used: ReviewerIdentity::None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.reviewer_used == ReviewerIdentity::None
    }
}
