pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::Content;

/// Token usage from a single generation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Accumulate another usage into this one.
    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    /// Total tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// What a generation call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    /// First candidate's first text part, or empty.
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API key is not configured")]
    MissingApiKey,
    #[error("failed to read credentials: {0}")]
    Credentials(anyhow::Error),
    #[error("generation API error: {status} {reason}")]
    Api { status: u16, reason: String },
    #[error("generation API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// The borrowed brain: anything that turns a conversation into text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier, for display.
    fn model(&self) -> &str;

    /// Fails when the generator cannot be called at all (e.g. no API key).
    async fn check_ready(&self) -> Result<(), GenerateError>;

    async fn generate(&self, contents: &[Content]) -> Result<Generation, GenerateError>;
}
