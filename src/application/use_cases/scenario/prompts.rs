use crate::domain::test_case::CaseType;

/// System prompt shared by every generation call; the completion must be a
/// bare JSON object.
pub(crate) const JSON_SYSTEM_PROMPT: &str =
    "Odpověz výhradně jako validní JSON objekt. Nepřidávej žádný text mimo JSON.";

/// Marker appended on the corrective attempt; tests key off it.
pub(crate) const RETRY_NOTE: &str =
    "POZOR: PŘEDCHOZÍ ODPOVĚĎ BYLA NEÚPLNÁ. ACCEPTANCE TEST MUSÍ MÍT KROKY.";

pub(crate) fn build_scenario_prompt(intent: &str, is_retry: bool) -> String {
    let retry_note = if is_retry { RETRY_NOTE } else { "" };
    format!(
        r#"VRAŤ POUZE VALIDNÍ JSON.

Jsi senior QA automation architekt (enterprise úroveň).
Používáš výhradně Playwright.

{retry_note}

Vytvoř:
- 1 hlavní ACCEPTANCE test
- 5 dalších testů: NEGATIVE, EDGE, SECURITY, UX, DATA

KAŽDÝ TEST MUSÍ OBSAHOVAT:
- id
- type
- title
- description
- expectedResult
- qaInsight:
  - reasoning
  - coverage (array)
  - risks (array)
  - automationTips (array)

POVINNÉ:
- ACCEPTANCE test MUSÍ mít:
  - preconditions (array)
  - steps (array, min. 5 kroků)

DALŠÍ TESTY:
- NESMÍ obsahovat kroky

STRUKTURA:
{{
  "testCase": {{
    "id": "TC-ACC-001",
    "type": "ACCEPTANCE",
    "title": "",
    "description": "",
    "preconditions": [],
    "steps": [],
    "expectedResult": "",
    "qaInsight": {{
      "reasoning": "",
      "coverage": [],
      "risks": [],
      "automationTips": []
    }},
    "additionalTestCases": []
  }}
}}

TESTOVACÍ ZÁMĚR:
"{intent}"
"#
    )
}

pub(crate) fn build_steps_prompt(case_type: CaseType, title: &str, description: &str) -> String {
    format!(
        r#"VRAŤ POUZE VALIDNÍ JSON.

Jsi senior QA automation expert.
Používáš Playwright.

Vygeneruj kroky pro test:

TYP: {case_type}
NÁZEV: {title}
POPIS: {description}

STRUKTURA:
{{
  "steps": ["string"],
  "expectedResult": "string"
}}
"#
    )
}

pub(crate) fn build_insight_prompt(case_type: CaseType, title: &str, description: &str) -> String {
    format!(
        r#"VRAŤ POUZE VALIDNÍ JSON.

Jsi senior QA expert.

Dopočítej Expert QA Insight pro test:

TYP: {case_type}
NÁZEV: {title}
POPIS: {description}

STRUKTURA:
{{
  "reasoning": "",
  "coverage": [],
  "risks": [],
  "automationTips": []
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_prompt_carries_corrective_note() {
        let first = build_scenario_prompt("login", false);
        let second = build_scenario_prompt("login", true);
        assert!(!first.contains(RETRY_NOTE));
        assert!(second.contains(RETRY_NOTE));
        assert!(second.contains("\"login\""));
    }

    #[test]
    fn steps_prompt_names_the_case() {
        let prompt = build_steps_prompt(CaseType::Negative, "Wrong password", "Must fail");
        assert!(prompt.contains("TYP: NEGATIVE"));
        assert!(prompt.contains("NÁZEV: Wrong password"));
    }
}
