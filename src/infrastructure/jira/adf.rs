//! Atlassian Document Format builders. Pure functions from a case snapshot
//! to the `doc` tree Jira accepts as a rich-text description.

use crate::domain::test_case::CaseSnapshot;
use serde_json::{json, Value};

pub fn text(content: &str) -> Value {
    json!({ "type": "text", "text": content })
}

pub fn paragraph(content: &str) -> Value {
    json!({ "type": "paragraph", "content": [text(content)] })
}

pub fn heading(content: &str) -> Value {
    json!({
        "type": "heading",
        "attrs": { "level": 3 },
        "content": [text(content)],
    })
}

pub fn bullet_list(items: &[String]) -> Value {
    json!({
        "type": "bulletList",
        "content": items.iter().map(|item| list_item(item)).collect::<Vec<_>>(),
    })
}

pub fn ordered_list(items: &[String]) -> Value {
    json!({
        "type": "orderedList",
        "content": items.iter().map(|item| list_item(item)).collect::<Vec<_>>(),
    })
}

fn list_item(item: &str) -> Value {
    json!({ "type": "listItem", "content": [paragraph(item)] })
}

pub fn doc(content: Vec<Value>) -> Value {
    json!({ "type": "doc", "version": 1, "content": content })
}

/// Description for the parent scenario issue: title + business description.
pub fn scenario_description(title: &str, description: &str) -> Value {
    doc(vec![heading(title), paragraph(description)])
}

/// Full description for one exported test case. Sections backed by an empty
/// list are omitted entirely.
pub fn case_description(case: &CaseSnapshot) -> Value {
    let mut content = vec![
        heading(&case.title),
        paragraph(&format!("Typ: {}", case.case_type)),
        paragraph(&case.description),
    ];

    if !case.steps.is_empty() {
        content.push(heading("Testovací kroky"));
        content.push(ordered_list(&case.steps));
    }

    content.push(heading("Očekávaný výsledek"));
    content.push(paragraph(&case.expected_result));

    if let Some(insight) = &case.qa_insight {
        content.push(heading("Expert QA Insight"));

        content.push(heading("Proč je test klíčový"));
        content.push(paragraph(&insight.reasoning));

        if !insight.coverage.is_empty() {
            content.push(heading("Pokrytí"));
            content.push(bullet_list(&insight.coverage));
        }
        if !insight.risks.is_empty() {
            content.push(heading("Rizika"));
            content.push(bullet_list(&insight.risks));
        }
        if !insight.automation_tips.is_empty() {
            content.push(heading("Doporučení pro Playwright"));
            content.push(bullet_list(&insight.automation_tips));
        }
    }

    doc(content)
}
