use serde::{Deserialize, Serialize};

/// Settings for one call to the completion endpoint. The retry orchestrator
/// clones this and lowers `temperature` on corrective attempts.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.25),
        }
    }
}
