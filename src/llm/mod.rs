pub mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClient;

/// Failure reported by a text-generation backend.
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    /// The provider refused the call because the account ran out of quota
    /// or hit a rate limit. Callers may substitute canned output.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    Upstream(String),
}

/// A remote model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
