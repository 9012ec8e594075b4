use super::{add_log, HttpState};
use crate::domain::test_case::CaseSnapshot;
use crate::infrastructure::playwright::{generate_spec_source, spec_file_name, DEFAULT_BROWSER};
use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecRequest {
    pub test_case: CaseSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecResponse {
    pub spec_name: String,
    pub content: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RunTestsRequest {
    #[validate(length(min = 1))]
    pub test_file: String,
    pub browser: Option<String>,
}

#[post("/tests/playwright")]
pub async fn generate_spec(
    data: web::Data<HttpState>,
    req: web::Json<SpecRequest>,
) -> impl Responder {
    let case = &req.test_case;
    if case.steps.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "Test case has no steps" }));
    }

    let spec_name = spec_file_name(&case.title);
    add_log(
        &data.logs,
        "INFO",
        "Playwright",
        &format!("Generated spec {} for {}", spec_name, case.title),
    );

    HttpResponse::Ok().json(SpecResponse {
        spec_name,
        content: generate_spec_source(case),
    })
}

/// Launches the runner and answers immediately; the run's outcome is only
/// visible in the logs.
#[post("/tests/run")]
pub async fn run_tests(
    data: web::Data<HttpState>,
    req: web::Json<RunTestsRequest>,
) -> impl Responder {
    if req.validate().is_err() {
        return HttpResponse::BadRequest().json(json!({ "error": "Missing testFile" }));
    }

    let browser = req
        .browser
        .clone()
        .unwrap_or_else(|| DEFAULT_BROWSER.to_string());
    add_log(
        &data.logs,
        "INFO",
        "Playwright",
        &format!("Starting run for {} on {}", req.test_file, browser),
    );
    data.runner.start(&req.test_file, &browser);

    HttpResponse::Ok().json(json!({
        "status": "started",
        "browser": browser,
        "testFile": req.test_file,
    }))
}
