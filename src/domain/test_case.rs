use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator shared by every case shape. Only one acceptance case exists
/// per scenario; the other five arrive without steps and are filled lazily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseType {
    Acceptance,
    Negative,
    Edge,
    Security,
    Ux,
    Data,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Acceptance => "ACCEPTANCE",
            CaseType::Negative => "NEGATIVE",
            CaseType::Edge => "EDGE",
            CaseType::Security => "SECURITY",
            CaseType::Ux => "UX",
            CaseType::Data => "DATA",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseType {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACCEPTANCE" => Ok(CaseType::Acceptance),
            "NEGATIVE" => Ok(CaseType::Negative),
            "EDGE" => Ok(CaseType::Edge),
            "SECURITY" => Ok(CaseType::Security),
            "UX" => Ok(CaseType::Ux),
            "DATA" => Ok(CaseType::Data),
            _ => Err(()),
        }
    }
}

/// Serializes as the constant `"ACCEPTANCE"`; exists so the acceptance case
/// carries an explicit `type` field on the wire without repeating the full
/// enum where only one variant is legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptanceTag {
    #[default]
    #[serde(rename = "ACCEPTANCE")]
    Acceptance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaInsight {
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub coverage: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub automation_tips: Vec<String>,
}

/// The happy-path test. Preconditions and steps are mandatory here and only
/// here; the sibling cases never carry them at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceCase {
    pub id: String,
    #[serde(rename = "type", default)]
    pub case_type: AcceptanceTag,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub preconditions: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_insight: Option<QaInsight>,
    #[serde(default)]
    pub additional_test_cases: Vec<AdditionalCase>,
}

/// A non-acceptance case. Steps, expected result and insight start out empty
/// and are filled by a follow-up generation call or by export enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCase {
    pub id: String,
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_insight: Option<QaInsight>,
}

/// Flattened per-case view consumed by the pure formatters (ADF document,
/// Playwright skeleton) and by the Jira export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_insight: Option<QaInsight>,
}

impl AcceptanceCase {
    pub fn snapshot(&self) -> CaseSnapshot {
        CaseSnapshot {
            id: self.id.clone(),
            case_type: CaseType::Acceptance,
            title: self.title.clone(),
            description: self.description.clone(),
            steps: self.steps.clone(),
            expected_result: self.expected_result.clone(),
            qa_insight: self.qa_insight.clone(),
        }
    }
}

impl AdditionalCase {
    pub fn snapshot(&self) -> CaseSnapshot {
        CaseSnapshot {
            id: self.id.clone(),
            case_type: self.case_type,
            title: self.title.clone(),
            description: self.description.clone(),
            steps: self.steps.clone().unwrap_or_default(),
            expected_result: self.expected_result.clone().unwrap_or_default(),
            qa_insight: self.qa_insight.clone(),
        }
    }
}

/// Outcome of the retry orchestrator: `Ok` only when the first attempt
/// produced a complete acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiStatus {
    Ok,
    Retried,
    Partial,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMeta {
    pub ai_status: AiStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResponse {
    pub test_case: AcceptanceCase,
    pub meta: ScenarioMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptance_case_serializes_with_constant_type_tag() {
        let case = AcceptanceCase {
            id: "TC-ACC-001".to_string(),
            case_type: AcceptanceTag::Acceptance,
            title: "Login works".to_string(),
            description: "Valid credentials".to_string(),
            preconditions: vec!["User exists".to_string()],
            steps: vec!["Open login page".to_string()],
            expected_result: "Dashboard is shown".to_string(),
            qa_insight: None,
            additional_test_cases: Vec::new(),
        };

        let value = serde_json::to_value(&case).unwrap();
        assert_eq!(value["type"], "ACCEPTANCE");
        assert_eq!(value["expectedResult"], "Dashboard is shown");
        assert!(value.get("qaInsight").is_none());
    }

    #[test]
    fn additional_case_round_trips_without_steps() {
        let json = r#"{
            "id": "NEG-1",
            "type": "NEGATIVE",
            "title": "Wrong password",
            "description": "Login must fail"
        }"#;

        let case: AdditionalCase = serde_json::from_str(json).unwrap();
        assert_eq!(case.case_type, CaseType::Negative);
        assert!(case.steps.is_none());
        assert!(case.qa_insight.is_none());

        let back = serde_json::to_value(&case).unwrap();
        assert!(back.get("steps").is_none());
    }

    #[test]
    fn acceptance_tag_rejects_other_types() {
        let json = r#"{"id": "X-1", "type": "NEGATIVE", "title": "t"}"#;
        assert!(serde_json::from_str::<AcceptanceCase>(json).is_err());
    }

    #[test]
    fn case_type_parses_loosely() {
        assert_eq!("security".parse::<CaseType>(), Ok(CaseType::Security));
        assert_eq!(" UX ".parse::<CaseType>(), Ok(CaseType::Ux));
        assert!("HAPPY".parse::<CaseType>().is_err());
    }

    #[test]
    fn ai_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(AiStatus::Retried).unwrap(), "retried");
    }
}
