pub mod analyzer;
pub mod dto;
pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use analyzer::{Analyzer, AnalysisResult, MAX_PROMPT_CHARS};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum AiError {
    /// Missing or rejected API credential. The one failure class the
    /// summary stage converts into a user-visible placeholder.
    #[error("API key missing or rejected: {0}")]
    Auth(String),

    #[error("Prompt is too long ({len} characters, limit {max})")]
    TooLong { len: usize, max: usize },

    #[error("Request failed: {0}")]
    Http(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    Malformed(String),
}

/// A text-completion provider. Implementations must never panic on bad
/// responses; everything surfaces as a typed `AiError`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a prompt, get the raw completion text back.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    /// JSON-guided completion for providers with a structured-output mode.
    /// Falls back to a plain completion elsewhere; callers still parse.
    async fn complete_structured(&self, prompt: &str) -> Result<String, AiError> {
        self.complete(prompt).await
    }
}
