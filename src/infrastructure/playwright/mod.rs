//! Playwright integration: spec-file naming, skeleton source generation and
//! the fire-and-forget test-runner subprocess.

use crate::domain::test_case::CaseSnapshot;
use crate::interfaces::http::{add_log, LogEntry};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

pub const DEFAULT_BROWSER: &str = "chromium";

/// `"Wrong Password Blocks Login!"` → `"wrong-password-blocks-login.spec.ts"`.
pub fn spec_file_name(title: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("test");
    }
    format!("{}.spec.ts", slug)
}

/// Renders the test-runner source skeleton: QA-insight header comment (when
/// present), test block with the generated steps as numbered comments, and a
/// placeholder body. Pure.
pub fn generate_spec_source(case: &CaseSnapshot) -> String {
    let mut source = String::new();
    source.push_str("import { test, expect } from \"@playwright/test\";\n\n");

    if let Some(insight) = &case.qa_insight {
        source.push_str("/**\n");
        source.push_str(" * ============================\n");
        source.push_str(" * QA INSIGHT\n");
        source.push_str(" * ============================\n");
        source.push_str(" *\n");
        source.push_str(" * Reasoning:\n");
        source.push_str(&format!(" * {}\n", insight.reasoning));
        push_insight_list(&mut source, "Coverage", &insight.coverage);
        push_insight_list(&mut source, "Risks", &insight.risks);
        push_insight_list(&mut source, "Automation tips", &insight.automation_tips);
        source.push_str(" */\n\n");
    }

    source.push_str(&format!(
        "test(\"{}\", async ({{ page }}) => {{\n",
        case.title.replace('"', "\\\"")
    ));
    for (index, step) in case.steps.iter().enumerate() {
        source.push_str(&format!("  // {}. {}\n", index + 1, step));
    }
    source.push('\n');
    source.push_str("  // TODO: Implement Playwright steps\n");
    source.push_str("});\n");

    source
}

fn push_insight_list(source: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    source.push_str(" *\n");
    source.push_str(&format!(" * {}:\n", label));
    for item in items {
        source.push_str(&format!(" * - {}\n", item));
    }
}

/// Launches `npx playwright test` without waiting for the result. Output and
/// exit status go to the dashboard log buffer and tracing only; callers are
/// told "started" regardless of the eventual outcome.
pub struct PlaywrightRunner {
    logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl PlaywrightRunner {
    pub fn new(logs: Arc<Mutex<Vec<LogEntry>>>) -> Self {
        Self { logs }
    }

    pub fn start(&self, test_file: &str, browser: &str) {
        let logs = self.logs.clone();
        let test_file = test_file.to_string();
        let project = browser.to_string();

        tokio::spawn(async move {
            let output = tokio::process::Command::new("npx")
                .args([
                    "playwright",
                    "test",
                    &test_file,
                    &format!("--project={}", project),
                ])
                .output()
                .await;

            match output {
                Ok(output) => {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    if !stdout.trim().is_empty() {
                        info!(test_file = %test_file, "playwright stdout: {}", stdout.trim());
                    }
                    if !stderr.trim().is_empty() {
                        info!(test_file = %test_file, "playwright stderr: {}", stderr.trim());
                    }
                    add_log(
                        &logs,
                        if output.status.success() { "INFO" } else { "ERROR" },
                        "Playwright",
                        &format!("Run finished for {} ({})", test_file, output.status),
                    );
                }
                Err(err) => {
                    error!(test_file = %test_file, error = %err, "Failed to launch playwright");
                    add_log(
                        &logs,
                        "ERROR",
                        "Playwright",
                        &format!("Failed to launch run for {}: {}", test_file, err),
                    );
                }
            }
        });
    }
}
