pub mod adf;

use crate::domain::error::{AppError, Result};
use crate::domain::export_job::IssueRef;
use crate::infrastructure::config::JiraConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    pub id: String,
    pub name: String,
    #[serde(rename = "hierarchyLevel", default)]
    pub hierarchy_level: i32,
}

#[derive(Debug, Clone)]
pub struct IssueTypePair {
    pub epic: IssueType,
    pub task: IssueType,
}

/// Seam over the issue tracker so the export workflow is testable without a
/// live Jira instance.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn resolve_issue_types(&self) -> Result<IssueTypePair>;

    async fn create_issue(
        &self,
        summary: &str,
        issue_type_id: &str,
        parent_key: Option<&str>,
        description: Value,
    ) -> Result<IssueRef>;
}

pub struct JiraClient {
    client: reqwest::Client,
    config: JiraConfig,
}

struct JiraCredentials<'a> {
    base_url: &'a str,
    project_key: &'a str,
    email: &'a str,
    api_token: &'a str,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn credentials(&self) -> Result<JiraCredentials<'_>> {
        match (
            self.config.base_url.as_deref(),
            self.config.project_key.as_deref(),
            self.config.email.as_deref(),
            self.config.api_token.as_deref(),
        ) {
            (Some(base_url), Some(project_key), Some(email), Some(api_token)) => {
                Ok(JiraCredentials {
                    base_url: base_url.trim_end_matches('/'),
                    project_key,
                    email,
                    api_token,
                })
            }
            _ => Err(AppError::IntegrationError(
                "Jira is not configured (JIRA_BASE_URL, JIRA_PROJECT_KEY, JIRA_EMAIL, JIRA_API_TOKEN)"
                    .to_string(),
            )),
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            AppError::IntegrationError(format!("Failed to parse Jira response: {}", e))
        })?;
        if !status.is_success() {
            // The raw tracker body is the error payload callers see.
            return Err(AppError::IntegrationError(format!(
                "Jira error ({}): {}",
                status, body
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    /// Reads the project's issue types and picks the epic (hierarchy level 1)
    /// and task (level 0) types, falling back to the first type listed.
    async fn resolve_issue_types(&self) -> Result<IssueTypePair> {
        let creds = self.credentials()?;
        let url = format!(
            "{}/rest/api/3/project/{}",
            creds.base_url, creds.project_key
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(creds.email, Some(creds.api_token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::IntegrationError(format!("Jira request failed: {}", e)))?;

        let body = Self::read_body(response).await?;
        let types: Vec<IssueType> = serde_json::from_value(body["issueTypes"].clone())
            .map_err(|e| {
                AppError::IntegrationError(format!("Unexpected Jira project payload: {}", e))
            })?;
        if types.is_empty() {
            return Err(AppError::IntegrationError(
                "Jira project has no issue types".to_string(),
            ));
        }

        let epic = types
            .iter()
            .find(|t| t.hierarchy_level == 1)
            .unwrap_or(&types[0])
            .clone();
        let task = types
            .iter()
            .find(|t| t.hierarchy_level == 0)
            .unwrap_or(&types[0])
            .clone();

        tracing::debug!(epic = %epic.name, task = %task.name, "Resolved Jira issue types");
        Ok(IssueTypePair { epic, task })
    }

    async fn create_issue(
        &self,
        summary: &str,
        issue_type_id: &str,
        parent_key: Option<&str>,
        description: Value,
    ) -> Result<IssueRef> {
        let creds = self.credentials()?;
        let url = format!("{}/rest/api/3/issue", creds.base_url);

        let mut fields = json!({
            "project": { "key": creds.project_key },
            "summary": summary,
            "issuetype": { "id": issue_type_id },
            "description": description,
        });
        if let Some(parent) = parent_key {
            fields["parent"] = json!({ "key": parent });
        }

        let response = self
            .client
            .post(&url)
            .basic_auth(creds.email, Some(creds.api_token))
            .header("Accept", "application/json")
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| AppError::IntegrationError(format!("Jira request failed: {}", e)))?;

        let body = Self::read_body(response).await?;
        let key = body["key"]
            .as_str()
            .ok_or_else(|| {
                AppError::IntegrationError("Jira response is missing the issue key".to_string())
            })?
            .to_string();
        let url = format!("{}/browse/{}", creds.base_url, key);

        Ok(IssueRef { key, url })
    }
}
