//! Gemini API client used for code generation and fallback review

pub mod client;
pub mod types;

pub use client::GeminiClient;
