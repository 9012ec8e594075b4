mod llm_output;
mod prompts;
mod types;

pub use types::StepsOutput;

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::test_case::{
    AiStatus, CaseType, QaInsight, ScenarioMeta, ScenarioResponse,
};
use crate::infrastructure::llm_clients::LLMClient;
use llm_output::parse_json;
use std::sync::Arc;
use tracing::warn;
use types::ScenarioOutput;

/// One corrective attempt after the first.
const MAX_SCENARIO_ATTEMPTS: u32 = 2;
/// An acceptance test below this step count is considered incomplete.
const MIN_ACCEPTANCE_STEPS: usize = 5;
const SCENARIO_TEMPERATURE: f32 = 0.25;
const RETRY_TEMPERATURE: f32 = 0.1;
const STEPS_TEMPERATURE: f32 = 0.2;
const INSIGHT_TEMPERATURE: f32 = 0.25;
/// Extra attempts for empty completions in the follow-up routines.
const TRANSIENT_RETRIES: u32 = 2;

pub struct ScenarioUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl ScenarioUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    fn config_with_temperature(&self, temperature: f32) -> LLMConfig {
        LLMConfig {
            temperature: Some(temperature),
            ..self.config.clone()
        }
    }

    /// Generates the full scenario tree, tolerating an unreliable generator:
    /// up to two attempts, the second with a corrective instruction and lower
    /// temperature. Empty completions advance the attempt counter; malformed
    /// JSON is not retried and propagates as a parse failure. When no attempt
    /// reaches five acceptance steps, the last parsed tree is returned tagged
    /// `partial`.
    pub async fn generate_scenario_with_retry(&self, intent: &str) -> Result<ScenarioResponse> {
        let mut attempt = 0;
        let mut last_case = None;

        while attempt < MAX_SCENARIO_ATTEMPTS {
            let is_retry = attempt > 0;
            let config = self.config_with_temperature(if is_retry {
                RETRY_TEMPERATURE
            } else {
                SCENARIO_TEMPERATURE
            });
            let user_prompt = prompts::build_scenario_prompt(intent, is_retry);

            let raw = match self
                .llm_client
                .generate(&config, prompts::JSON_SYSTEM_PROMPT, &user_prompt)
                .await
            {
                Ok(raw) => raw,
                Err(AppError::EmptyCompletion(msg)) => {
                    warn!(attempt, "Scenario completion was empty: {}", msg);
                    attempt += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let output: ScenarioOutput =
                parse_json(&raw, "Failed to parse scenario completion")?;
            let case = output.into_acceptance_case()?;

            if case.steps.len() >= MIN_ACCEPTANCE_STEPS {
                let ai_status = if attempt == 0 {
                    AiStatus::Ok
                } else {
                    AiStatus::Retried
                };
                return Ok(ScenarioResponse {
                    test_case: case,
                    meta: ScenarioMeta { ai_status },
                });
            }

            warn!(
                attempt,
                steps = case.steps.len(),
                "Acceptance test came back with too few steps"
            );
            last_case = Some(case);
            attempt += 1;
        }

        match last_case {
            Some(test_case) => Ok(ScenarioResponse {
                test_case,
                meta: ScenarioMeta {
                    ai_status: AiStatus::Partial,
                },
            }),
            None => Err(AppError::LLMError(
                "Completion service returned no content for the scenario".to_string(),
            )),
        }
    }

    /// Fills in steps for a case that was generated without them.
    pub async fn generate_steps(
        &self,
        case_type: CaseType,
        title: &str,
        description: &str,
    ) -> Result<StepsOutput> {
        let user_prompt = prompts::build_steps_prompt(case_type, title, description);
        let raw = self
            .generate_with_transient_retry(
                &self.config_with_temperature(STEPS_TEMPERATURE),
                &user_prompt,
            )
            .await?;
        parse_json(&raw, "Failed to parse generated steps")
    }

    /// Fills in the expert insight for a case that was generated without one.
    pub async fn generate_insight(
        &self,
        case_type: CaseType,
        title: &str,
        description: &str,
    ) -> Result<QaInsight> {
        let user_prompt = prompts::build_insight_prompt(case_type, title, description);
        let raw = self
            .generate_with_transient_retry(
                &self.config_with_temperature(INSIGHT_TEMPERATURE),
                &user_prompt,
            )
            .await?;
        parse_json(&raw, "Failed to parse generated insight")
    }

    /// Immediate re-invocation on empty completions only; every other error
    /// (transport, API, malformed JSON downstream) surfaces to the caller.
    async fn generate_with_transient_retry(
        &self,
        config: &LLMConfig,
        user_prompt: &str,
    ) -> Result<String> {
        let mut attempts = 0;
        loop {
            match self
                .llm_client
                .generate(config, prompts::JSON_SYSTEM_PROMPT, user_prompt)
                .await
            {
                Err(AppError::EmptyCompletion(msg)) if attempts < TRANSIENT_RETRIES => {
                    attempts += 1;
                    warn!(attempts, "Empty completion, retrying: {}", msg);
                }
                other => return other,
            }
        }
    }
}
