//! Token usage reported by a model response.
//!
//! Usage is carried as a whole value in [`ResponseMeta`](crate::messages::ResponseMeta).
//! When a response is streamed, providers usually report usage once near the
//! end, and some report it repeatedly with growing counters. Reduction therefore
//! replaces the value wholesale instead of summing sub-counters.

use serde::{Deserialize, Serialize};

/// Breakdown of prompt tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTokenDetails {
    /// Tokens served from the provider's prompt cache.
    #[serde(default)]
    pub cached_tokens: u64,
}

/// Breakdown of completion tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTokenDetails {
    /// Tokens spent on reasoning.
    #[serde(default)]
    pub reasoning_tokens: u64,
}

/// Token usage for a single model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Prompt token breakdown.
    #[serde(default)]
    pub prompt_token_details: PromptTokenDetails,
    /// Number of tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Completion token breakdown.
    #[serde(default)]
    pub completion_token_details: CompletionTokenDetails,
    /// Total tokens (prompt + completion).
    #[serde(default)]
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a new empty usage record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create usage with prompt and completion tokens.
    #[must_use]
    pub fn with_tokens(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            ..Self::default()
        }
    }

    /// Set cached prompt tokens.
    #[must_use]
    pub fn cached_tokens(mut self, tokens: u64) -> Self {
        self.prompt_token_details.cached_tokens = tokens;
        self
    }

    /// Set reasoning tokens.
    #[must_use]
    pub fn reasoning_tokens(mut self, tokens: u64) -> Self {
        self.completion_token_details.reasoning_tokens = tokens;
        self
    }

    /// Set total tokens explicitly.
    #[must_use]
    pub fn total_tokens(mut self, tokens: u64) -> Self {
        self.total_tokens = tokens;
        self
    }

    /// Get total tokens, calculating if not set.
    #[must_use]
    pub fn total(&self) -> u64 {
        if self.total_tokens > 0 {
            self.total_tokens
        } else {
            self.prompt_tokens + self.completion_tokens
        }
    }

    /// Check if this usage record has any data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_new() {
        let usage = TokenUsage::new();
        assert!(usage.is_empty());
    }

    #[test]
    fn test_token_usage_with_tokens() {
        let usage = TokenUsage::with_tokens(100, 50).cached_tokens(20);
        assert_eq!(usage.prompt_tokens, 100);
        assert_eq!(usage.completion_tokens, 50);
        assert_eq!(usage.total_tokens, 150);
        assert_eq!(usage.prompt_token_details.cached_tokens, 20);
        assert!(!usage.is_empty());
    }

    #[test]
    fn test_total_falls_back_to_sum() {
        let usage = TokenUsage {
            prompt_tokens: 7,
            completion_tokens: 3,
            ..Default::default()
        };
        assert_eq!(usage.total(), 10);
    }

    #[test]
    fn test_serde_defaults() {
        let usage: TokenUsage = serde_json::from_str(r#"{"prompt_tokens": 4}"#).unwrap();
        assert_eq!(usage.prompt_tokens, 4);
        assert_eq!(usage.completion_tokens, 0);
    }
}
