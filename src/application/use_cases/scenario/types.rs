//! Loose shapes for what the completion service actually returns. Everything
//! is defaulted; the mapper decides what is usable and drops the rest.

use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{
    AcceptanceCase, AcceptanceTag, AdditionalCase, CaseType, QaInsight,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScenarioOutput {
    pub(crate) test_case: Option<ScenarioCaseOutput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ScenarioCaseOutput {
    pub(crate) id: Option<String>,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) preconditions: Vec<String>,
    pub(crate) steps: Vec<String>,
    pub(crate) expected_result: String,
    pub(crate) qa_insight: Option<QaInsight>,
    pub(crate) additional_test_cases: Vec<AdditionalCaseOutput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AdditionalCaseOutput {
    pub(crate) id: Option<String>,
    #[serde(rename = "type")]
    pub(crate) case_type: Option<String>,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) steps: Option<Vec<String>>,
    pub(crate) expected_result: Option<String>,
    pub(crate) qa_insight: Option<QaInsight>,
}

/// Steps payload for one case; also the wire response of the follow-up
/// steps endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsOutput {
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
}

impl ScenarioOutput {
    /// Maps the loose payload onto the typed tree. Additional entries with no
    /// usable title or type are dropped rather than failing the whole
    /// scenario; missing ids are backfilled as `NEGATIVE-1`, `EDGE-2`, ...
    pub(crate) fn into_acceptance_case(self) -> Result<AcceptanceCase> {
        let case = self.test_case.ok_or_else(|| {
            AppError::ParseError("completion is missing the testCase object".to_string())
        })?;

        let additional_test_cases = case
            .additional_test_cases
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let title = item.title.trim().to_string();
                if title.is_empty() {
                    return None;
                }
                let case_type = item.case_type.as_deref()?.parse::<CaseType>().ok()?;
                if case_type == CaseType::Acceptance {
                    return None;
                }
                Some(AdditionalCase {
                    id: item
                        .id
                        .filter(|id| !id.trim().is_empty())
                        .unwrap_or_else(|| format!("{}-{}", case_type, index + 1)),
                    case_type,
                    title,
                    description: item.description,
                    steps: item.steps.filter(|steps| !steps.is_empty()),
                    expected_result: item
                        .expected_result
                        .filter(|value| !value.trim().is_empty()),
                    qa_insight: item.qa_insight,
                })
            })
            .collect();

        Ok(AcceptanceCase {
            id: case
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| "TC-ACC-001".to_string()),
            case_type: AcceptanceTag::Acceptance,
            title: case.title,
            description: case.description,
            preconditions: case.preconditions,
            steps: case.steps,
            expected_result: case.expected_result,
            qa_insight: case.qa_insight,
            additional_test_cases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_full_payload() {
        let output: ScenarioOutput = serde_json::from_str(
            r#"{
                "testCase": {
                    "id": "TC-ACC-001",
                    "type": "ACCEPTANCE",
                    "title": "Login",
                    "description": "Happy path",
                    "preconditions": ["User exists"],
                    "steps": ["a", "b", "c", "d", "e"],
                    "expectedResult": "Dashboard",
                    "additionalTestCases": [
                        {"id": "NEG-1", "type": "NEGATIVE", "title": "Bad password", "description": "fails"},
                        {"type": "edge", "title": "Long input", "description": ""},
                        {"type": "WHATEVER", "title": "dropped", "description": ""},
                        {"type": "UX", "title": "   ", "description": "dropped too"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let case = output.into_acceptance_case().unwrap();
        assert_eq!(case.id, "TC-ACC-001");
        assert_eq!(case.steps.len(), 5);
        assert_eq!(case.additional_test_cases.len(), 2);
        assert_eq!(case.additional_test_cases[0].id, "NEG-1");
        assert_eq!(case.additional_test_cases[1].case_type, CaseType::Edge);
        assert_eq!(case.additional_test_cases[1].id, "EDGE-2");
    }

    #[test]
    fn missing_test_case_is_a_parse_error() {
        let output: ScenarioOutput = serde_json::from_str(r#"{"something": 1}"#).unwrap();
        assert!(matches!(
            output.into_acceptance_case(),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn steps_output_tolerates_missing_expected_result() {
        let fill: StepsOutput = serde_json::from_str(r#"{"steps": ["x"]}"#).unwrap();
        assert_eq!(fill.steps, vec!["x".to_string()]);
        assert!(fill.expected_result.is_empty());
    }
}
