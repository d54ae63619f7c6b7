use thiserror::Error;

/// Architect error types
#[derive(Debug, Error)]
pub enum ArchitectError {
    /// Code generation failed or produced no usable code. Fatal to a run.
    #[error("Code generation failed: {0}")]
    Generation(String),

    /// The primary reviewer was never configured (e.g. no API key).
    #[error("Primary reviewer unavailable: {0}")]
    ReviewerUnavailable(String),

    /// The primary reviewer call itself failed.
    #[error("Primary reviewer failed: {0}")]
    Reviewer(String),

    /// The fallback reviewer failed. Not recovered from.
    #[error("Fallback reviewer failed: {0}")]
    FallbackReview(String),

    #[error("{provider} API error: {message}")]
    ProviderApi {
        provider: &'static str,
        message: String,
        status_code: Option<u16>,
    },

    #[error("{provider} rate limited, retry after {retry_after:?}s")]
    RateLimited {
        provider: &'static str,
        retry_after: Option<u64>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pipeline transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl ArchitectError {
    /// Whether the provider call is worth retrying (rate limit or server error).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ProviderApi {
                status_code: Some(code),
                ..
            } => *code >= 500,
            _ => false,
        }
    }
}

/// Result type alias for architect operations
pub type ArchitectResult<T> = Result<T, ArchitectError>;
