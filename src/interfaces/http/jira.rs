use super::{add_log, error_response, HttpState};
use crate::domain::test_case::{AcceptanceCase, CaseSnapshot};
use crate::infrastructure::jira::adf;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub test_case: CaseSnapshot,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportScenarioRequest {
    pub test_case: AcceptanceCase,
}

/// Synchronous single-issue export: one task issue, no parent.
#[post("/integrations/jira/export")]
pub async fn export_test_case(
    data: web::Data<HttpState>,
    req: web::Json<ExportRequest>,
) -> impl Responder {
    let case = &req.test_case;
    add_log(
        &data.logs,
        "INFO",
        "Jira",
        &format!("Exporting test case {} ({})", case.title, case.case_type),
    );

    let issue_types = match data.tracker.resolve_issue_types().await {
        Ok(types) => types,
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Jira",
                &format!("Issue type resolution failed: {}", e),
            );
            return error_response("Failed to export test case to Jira", &e);
        }
    };

    match data
        .tracker
        .create_issue(
            &format!("[{}] {}", case.case_type, case.title),
            &issue_types.task.id,
            None,
            adf::case_description(case),
        )
        .await
    {
        Ok(issue) => HttpResponse::Ok().json(json!({
            "issueKey": issue.key,
            "issueUrl": issue.url,
        })),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Jira",
                &format!("Issue creation failed: {}", e),
            );
            error_response("Failed to export test case to Jira", &e)
        }
    }
}

/// Kicks off the background enrichment-and-export workflow and returns the
/// job id for polling.
#[post("/integrations/jira/export-scenario")]
pub async fn export_scenario(
    data: web::Data<HttpState>,
    req: web::Json<ExportScenarioRequest>,
) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "Jira",
        &format!("Starting scenario export for {}", req.test_case.title),
    );

    match data.export_use_case.start(req.into_inner().test_case).await {
        Ok(job_id) => HttpResponse::Ok().json(json!({ "jobId": job_id })),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Jira",
                &format!("Failed to start scenario export: {}", e),
            );
            error_response("Failed to start scenario export", &e)
        }
    }
}

#[get("/integrations/jira/export-status/{id}")]
pub async fn export_status(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> impl Responder {
    match data.export_use_case.status(&path).await {
        Ok(job) => HttpResponse::Ok().json(job),
        Err(e) => error_response("Failed to read export status", &e),
    }
}
