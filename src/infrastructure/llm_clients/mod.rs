pub mod openai;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;

pub use openai::OpenAiClient;

/// Seam over the completion endpoint. `generate` returns the raw completion
/// text; a completion with no content fails with `AppError::EmptyCompletion`
/// so the orchestrator can tell retryable emptiness from hard failures.
#[async_trait]
pub trait LLMClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;
}
