//! Anthropic Messages API client used for primary review

pub mod client;
pub mod types;

pub use client::AnthropicClient;
