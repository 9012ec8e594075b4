use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let defaults = LLMConfig::default();
        Self {
            base_url: defaults.base_url,
            model: defaults.model,
            api_key: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraConfig {
    pub base_url: Option<String>,
    pub project_key: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmSettings,
    pub jira: JiraConfig,
}

impl AppConfig {
    /// Defaults, overridden by an optional `qaforge.toml`, overridden by the
    /// environment. The env names (`OPENAI_*`, `JIRA_*`, `PORT`) are the ones
    /// existing deployments already set.
    pub fn load() -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("qaforge.toml"))
            .merge(
                Env::raw()
                    .only(&["PORT", "HOST"])
                    .map(|key| format!("server.{}", key.as_str().to_lowercase()).into())
                    .split("."),
            )
            .merge(
                Env::prefixed("OPENAI_")
                    .map(|key| format!("llm.{}", key.as_str().to_lowercase()).into())
                    .split("."),
            )
            .merge(
                Env::prefixed("JIRA_")
                    .map(|key| format!("jira.{}", key.as_str().to_lowercase()).into())
                    .split("."),
            );

        let config: AppConfig = figment
            .extract()
            .map_err(|err| AppError::Internal(format!("Invalid configuration: {}", err)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.jira.base_url {
            url::Url::parse(base_url).map_err(|err| {
                AppError::ValidationError(format!("JIRA_BASE_URL is not a valid URL: {}", err))
            })?;
        }
        url::Url::parse(&self.llm.base_url).map_err(|err| {
            AppError::ValidationError(format!("OPENAI_BASE_URL is not a valid URL: {}", err))
        })?;
        Ok(())
    }

    /// Completion settings used by the generation routines; temperature is
    /// chosen per call by the orchestrator.
    pub fn llm_config(&self) -> LLMConfig {
        LLMConfig {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            api_key: self.llm.api_key.clone(),
            max_tokens: self.llm.max_tokens,
            ..LLMConfig::default()
        }
    }
}
